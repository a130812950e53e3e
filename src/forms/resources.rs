//! Font resource pools.
//!
//! A pool is the `/Font` subdictionary of a `/Resources` dictionary: the
//! form-wide one under `/AcroForm /DR`, or the local one of a widget's
//! appearance stream. Entries keep their original form, so an indirect font
//! stays an indirect reference when copied between pools.

use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object};
use indexmap::IndexMap;

/// Named font resources.
///
/// Tracks whether it was modified since it was loaded so callers only write
/// back pools that actually changed.
#[derive(Debug, Clone, Default)]
pub struct ResourcePool {
    /// Font registry: resource name → font entry (reference or inline dictionary)
    fonts: IndexMap<String, Object>,
    /// Set once an entry has been added
    modified: bool,
}

impl ResourcePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from a `/Font` dictionary.
    pub fn from_font_dict(fonts: &Dictionary) -> Self {
        Self {
            fonts: fonts
                .iter()
                .filter(|(_, entry)| !entry.is_null())
                .map(|(name, entry)| (name.clone(), entry.clone()))
                .collect(),
            modified: false,
        }
    }

    /// Build a pool from a `/Resources` object (direct or indirect).
    ///
    /// A resources dictionary without `/Font` yields an empty pool.
    pub fn from_resources(doc: &PdfDocument, resources: &Object) -> Result<Self> {
        let resources = doc.resolve_dict(resources)?;
        match resources.get("Font") {
            Some(fonts) => Ok(Self::from_font_dict(&doc.resolve_dict(fonts)?)),
            None => Ok(Self::new()),
        }
    }

    /// Check whether a font of this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    /// The entry registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Object> {
        self.fonts.get(name)
    }

    /// Register `entry` under `name` unless the name is already taken.
    ///
    /// Returns `true` if the entry was added.
    pub fn insert_if_absent(&mut self, name: &str, entry: Object) -> bool {
        if self.contains(name) {
            return false;
        }
        self.fonts.insert(name.to_string(), entry);
        self.modified = true;
        true
    }

    /// Load the font dictionary registered under `name`.
    ///
    /// Fails when the name is unknown or its entry does not dereference to a
    /// dictionary.
    pub fn fetch_font(&self, doc: &PdfDocument, name: &str) -> Result<Dictionary> {
        let entry = self
            .fonts
            .get(name)
            .ok_or_else(|| Error::Font(format!("no font resource named {}", name)))?;
        doc.resolve_dict(entry)
    }

    /// Font resource names in registration order.
    pub fn font_names(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    /// Number of fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Check whether the pool holds no fonts.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Whether entries were added since the pool was loaded.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// The pool as a `/Font` dictionary.
    pub fn to_font_dict(&self) -> Dictionary {
        self.fonts
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }
}
