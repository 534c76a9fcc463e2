//! Errors raised at the content load boundary.

use thiserror::Error;

/// Content loading and validation errors
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Malformed content JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{kind} has an empty `{field}` field")]
    MissingField { kind: &'static str, field: &'static str },

    #[error("Invalid slug `{0}`: expected lowercase letters, digits and hyphens")]
    InvalidSlug(String),

    #[error("Duplicate {kind} identifier `{id}`")]
    Duplicate { kind: &'static str, id: String },

    #[error("Unknown {kind} tag `{tag}`")]
    UnknownTag { kind: &'static str, tag: String },
}

/// Result type for content operations
pub type ContentResult<T> = Result<T, ContentError>;
