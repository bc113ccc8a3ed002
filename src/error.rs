//! Error types for liftload
//!
//! The intensity engine itself cannot fail; these cover the boundary layers
//! that parse, validate and encode records.

use thiserror::Error;

/// Errors that can occur while ingesting records or encoding results
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse workout records: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid workout record: {0}")]
    InvalidRecord(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
