//! Error types for the form repair library.
//!
//! This module defines all error types that can occur while reading the
//! document model, walking field hierarchies and embedding fallback fonts.

/// Result type alias for form repair operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during form repair.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)] // "Invalid" prefix is intentional for clarity
pub enum Error {
    /// Referenced object not found in the document store
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Font error
    #[error("Font error: {0}")]
    Font(String),

    /// Circular reference detected in object graph
    #[error("Circular reference detected: object {0}")]
    CircularReference(crate::object::ObjectRef),

    /// Recursion depth limit exceeded
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document model error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
