//! Error types for tfplug
//!
//! Raised by the typed accessors on [`crate::types::DynamicValue`].

/// Error type for tfplug operations
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Type mismatch at {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Value at {path} is not a whole number: {value}")]
    NotAnInteger { path: String, value: f64 },
}

/// Result type alias for tfplug operations
pub type Result<T> = std::result::Result<T, TfplugError>;
