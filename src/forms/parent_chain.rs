//! Walking from a widget to its root field.
//!
//! Widgets of non-root fields point at their field through `/Parent`, and
//! fields point at their own parents the same way. Parent links in damaged
//! files may dangle, point at non-dictionaries or loop, so the walk is an
//! explicit bounded loop with a tagged result.

use crate::annotations::Widget;
use crate::document::PdfDocument;
use crate::object::{Dictionary, Object, ObjectRef};
use std::collections::HashSet;
use std::fmt;

/// The root ancestor a parent chain ends at.
#[derive(Debug, Clone)]
pub struct RootField {
    /// The root as it was linked: a reference, or an inline dictionary
    pub object: Object,
    /// Root field dictionary
    pub dict: Dictionary,
    /// Number of `/Parent` links followed
    pub depth: usize,
}

/// Why a parent chain could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokenChain {
    /// A link points at an object that does not exist
    Dangling(ObjectRef),
    /// A link resolves to something other than a dictionary
    NotADictionary(&'static str),
    /// A link revisits an object already on the chain
    Cycle(ObjectRef),
    /// The chain is longer than the configured limit
    TooDeep(usize),
}

impl fmt::Display for BrokenChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokenChain::Dangling(r) => write!(f, "parent {} does not exist", r),
            BrokenChain::NotADictionary(found) => write!(f, "parent is a {}, not a dictionary", found),
            BrokenChain::Cycle(r) => write!(f, "parent chain loops back to {}", r),
            BrokenChain::TooDeep(max) => write!(f, "parent chain exceeds {} levels", max),
        }
    }
}

/// Outcome of a parent-chain walk.
#[derive(Debug, Clone)]
pub enum ChainResolution {
    /// The chain ends at a record without `/Parent`
    Resolved(RootField),
    /// The chain cannot be followed to its end
    Broken(BrokenChain),
}

/// Follow `/Parent` links from a widget to its root field.
///
/// A widget without `/Parent` resolves to itself at depth 0. At most
/// `max_depth` links are followed.
pub fn resolve_root(doc: &PdfDocument, widget: &Widget, max_depth: usize) -> ChainResolution {
    let Some(parent) = widget.parent() else {
        return ChainResolution::Resolved(RootField {
            object: widget.as_field_object(),
            dict: widget.dict.clone(),
            depth: 0,
        });
    };

    let mut visited: HashSet<ObjectRef> = widget.object_ref.into_iter().collect();
    let mut current = parent.clone();
    let mut depth = 1;

    loop {
        if depth > max_depth {
            return ChainResolution::Broken(BrokenChain::TooDeep(max_depth));
        }
        let dict = match &current {
            Object::Reference(r) => {
                if !visited.insert(*r) {
                    return ChainResolution::Broken(BrokenChain::Cycle(*r));
                }
                match doc.get_object(*r) {
                    Some(obj) => match obj.as_dict() {
                        Some(dict) => dict.clone(),
                        None => return ChainResolution::Broken(BrokenChain::NotADictionary(obj.type_name())),
                    },
                    None => return ChainResolution::Broken(BrokenChain::Dangling(*r)),
                }
            },
            other => match other.as_dict() {
                Some(dict) => dict.clone(),
                None => return ChainResolution::Broken(BrokenChain::NotADictionary(other.type_name())),
            },
        };

        match dict.get("Parent").filter(|p| !p.is_null()) {
            Some(next) => {
                current = next.clone();
                depth += 1;
            },
            None => {
                return ChainResolution::Resolved(RootField {
                    object: current,
                    dict,
                    depth,
                })
            },
        }
    }
}
