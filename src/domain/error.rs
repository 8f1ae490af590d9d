//! Error types for the schema domain.
//!
//! Tree mutations never fail: a lookup miss is a no-op. The only fallible
//! operations are moving the document in and out of JSON and handing the
//! export to a clipboard sink.

use thiserror::Error;

/// Errors raised while (de)serializing a schema document
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for schema document operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors reported by a clipboard sink
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Underlying write failed
    #[error("Clipboard write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Sink cannot accept text right now
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}
