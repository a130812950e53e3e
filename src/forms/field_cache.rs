//! Root fields already emitted during one rebuild pass.

use std::collections::HashMap;

/// Maps the qualified name of each emitted ancestor field to its position in
/// the output forest.
///
/// Several widgets usually share one ancestor; only the first widget that
/// reaches it causes a field to be built. The cache is created per pass and
/// handed to the builder explicitly.
#[derive(Debug, Clone, Default)]
pub struct NonTerminalFieldCache {
    by_name: HashMap<String, usize>,
}

impl NonTerminalFieldCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forest index of the field registered under `qualified_name`.
    pub fn get(&self, qualified_name: &str) -> Option<usize> {
        self.by_name.get(qualified_name).copied()
    }

    /// Whether a field of this name was already emitted.
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.by_name.contains_key(qualified_name)
    }

    /// Register a field. Returns `false` and keeps the first index if the
    /// name is taken.
    pub fn register(&mut self, qualified_name: impl Into<String>, index: usize) -> bool {
        match self.by_name.entry(qualified_name.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(index);
                true
            },
        }
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
