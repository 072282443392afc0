//! Model-level error types.

use docmodel_path::PathSyntaxError;
use docmodel_schema::{SchemaError, ValidationError};
use thiserror::Error;

/// A path was syntactically valid but could not be walked to its end.
///
/// `last_valid` is the longest prefix that resolved to an existing value,
/// which is what parent scaffolding retries from.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("`{first_invalid}` does not exist under `{last_valid}` while resolving `{full_path}`")]
pub struct PathResolutionError {
    /// The path as requested.
    pub full_path: String,
    /// Longest resolvable prefix (may be empty for a missing root field).
    pub last_valid: String,
    /// The step that failed to resolve, rendered as a path segment.
    pub first_invalid: String,
    /// The requesting model's own path, for diagnostics on sub-views.
    pub current_path: String,
}

/// Anything a model operation can fail with.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Syntax(#[from] PathSyntaxError),
    #[error(transparent)]
    Resolution(PathResolutionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("cannot write `{path}`: parent is not a container")]
    NotWritable { path: String },
    #[error("no registered schema adapter accepts this schema")]
    NoSchemaAdapter,
    #[error("no persistence backend configured")]
    NoPersistence,
    #[error("persistence backend failed: {0}")]
    Persistence(Box<dyn std::error::Error>),
}

impl From<PathResolutionError> for ModelError {
    fn from(error: PathResolutionError) -> Self {
        ModelError::Resolution(error)
    }
}
