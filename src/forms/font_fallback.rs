//! Substitute fonts for default appearances naming a missing resource.
//!
//! The substitute may not be the face the form was designed with. It is
//! registered under the name the default appearance uses, so the field
//! renders with it without rewriting `/DA`.

use super::default_appearance::parse_default_appearance;
use super::field::Field;
use super::resources::ResourcePool;
use crate::document::PdfDocument;
use crate::fonts::{FontEmbedder, FontMapper, FontStyleHint};
use serde::Serialize;
use std::collections::HashSet;

/// What the resolver did for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FallbackOutcome {
    /// No default appearance, or one without a recognizable font name
    NoFontReference,
    /// The pool already has the font
    Present(String),
    /// The name already failed earlier in this pass
    AlreadyTried(String),
    /// A substitute was embedded under the name
    Embedded(String),
    /// The mapping service had nothing for the name
    Unresolved(String),
    /// A substitute was found but could not be embedded
    EmbedFailed(String),
}

/// Resolves missing default-appearance fonts for one pass.
pub struct FontFallbackResolver<'a, M: ?Sized, E: ?Sized> {
    mapper: &'a M,
    embedder: &'a E,
    tried: HashSet<String>,
}

impl<'a, M: FontMapper + ?Sized, E: FontEmbedder + ?Sized> FontFallbackResolver<'a, M, E> {
    /// Create a resolver with an empty set of tried names.
    pub fn new(mapper: &'a M, embedder: &'a E) -> Self {
        Self {
            mapper,
            embedder,
            tried: HashSet::new(),
        }
    }

    /// Make sure the font named by the field's default appearance is in `pool`.
    ///
    /// Never replaces an existing pool entry and never fails; problems are
    /// logged and reported in the outcome.
    pub fn ensure_font(&mut self, doc: &mut PdfDocument, pool: &mut ResourcePool, field: &Field) -> FallbackOutcome {
        let Some(font) = field
            .default_appearance
            .as_deref()
            .and_then(parse_default_appearance)
        else {
            return FallbackOutcome::NoFontReference;
        };
        let name = font.name;

        if pool.contains(&name) {
            return FallbackOutcome::Present(name);
        }
        if !self.tried.insert(name.clone()) {
            return FallbackOutcome::AlreadyTried(name);
        }

        log::debug!("trying to add missing font resource {} for field {}", name, field.qualified_name);
        let Some(program) = self.mapper.lookup(&name, FontStyleHint::from_font_name(&name)) else {
            log::debug!(
                "no suitable font found for field {} for font name {}",
                field.qualified_name,
                name
            );
            return FallbackOutcome::Unresolved(name);
        };

        match self.embedder.embed(doc, &program) {
            Ok(entry) => {
                log::debug!("looked up font for {} - found {}", name, program.name);
                if pool.insert_if_absent(&name, entry) {
                    FallbackOutcome::Embedded(name)
                } else {
                    FallbackOutcome::Present(name)
                }
            },
            Err(e) => {
                log::warn!("unable to embed {} for font name {}: {}", program.name, name, e);
                FallbackOutcome::EmbedFailed(name)
            },
        }
    }
}
