//! Validation error types.

use std::fmt;

use docmodel_path::is_identifier;
use serde_json::Value;
use thiserror::Error;

/// Key under which a nested validation failure is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKey {
    /// A schema path (possibly dotted) within the validated level.
    Field(String),
    /// A document-array element index.
    Index(usize),
}

impl ErrorKey {
    /// Render the key as a path segment: `.name` for identifier-like
    /// fields, `[0]` for indexes, `["json string"]` otherwise.
    fn render(&self) -> String {
        match self {
            ErrorKey::Field(path) if is_dotted_identifier(path) => format!(".{path}"),
            ErrorKey::Field(path) => format!("[{}]", Value::String(path.clone())),
            ErrorKey::Index(index) => format!("[{index}]"),
        }
    }
}

fn is_dotted_identifier(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(is_identifier)
}

/// One schema node's value failed its constraint, or a structural schema
/// problem surfaced during validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("`{path}` is required")]
    Required { path: String },
    #[error("`{path}` expected a {expected}")]
    WrongType { path: String, expected: String },
    #[error("`{path}` out of range: {constraint}")]
    OutOfRange { path: String, constraint: String },
    #[error("`{path}` has wrong length: {constraint}")]
    WrongLength { path: String, constraint: String },
    #[error("`{path}` is not one of the allowed values")]
    NotInEnum { path: String },
    #[error("path `{path}` not found in schema")]
    SchemaPathNotFound { path: String },
    #[error(transparent)]
    Compound(#[from] CompoundValidationError),
}

/// Aggregation of `(key, error)` pairs collected at one validation level.
///
/// Errors may themselves be compound (nested documents, array elements);
/// [`CompoundValidationError::flatten`] joins the keys into fully-qualified
/// paths in pre-order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundValidationError {
    pub errors: Vec<(ErrorKey, ValidationError)>,
}

impl CompoundValidationError {
    pub fn new(errors: Vec<(ErrorKey, ValidationError)>) -> Self {
        Self { errors }
    }

    /// Flatten into `(fully-qualified path, leaf error)` pairs.
    ///
    /// Keys concatenate with `.` for identifier fields and `[...]` for
    /// indexes and computed keys, preserving pre-order traversal.
    ///
    /// # Example
    ///
    /// ```
    /// use docmodel_schema::{CompoundValidationError, ErrorKey, ValidationError};
    ///
    /// let inner = CompoundValidationError::new(vec![(
    ///     ErrorKey::Field("level".to_string()),
    ///     ValidationError::OutOfRange {
    ///         path: "level".to_string(),
    ///         constraint: "max 10".to_string(),
    ///     },
    /// )]);
    /// let outer = CompoundValidationError::new(vec![(
    ///     ErrorKey::Field("likes".to_string()),
    ///     ValidationError::Compound(CompoundValidationError::new(vec![(
    ///         ErrorKey::Index(0),
    ///         ValidationError::Compound(inner),
    ///     )])),
    /// )]);
    /// let flat = outer.flatten();
    /// assert_eq!(flat.len(), 1);
    /// assert_eq!(flat[0].0, ".likes[0].level");
    /// ```
    pub fn flatten(&self) -> Vec<(String, &ValidationError)> {
        let mut out = Vec::new();
        self.collect("", &mut out);
        out
    }

    fn collect<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a ValidationError)>) {
        for (key, error) in &self.errors {
            let path = format!("{prefix}{}", key.render());
            match error {
                ValidationError::Compound(inner) => inner.collect(&path, out),
                leaf => out.push((path, leaf)),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for CompoundValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation errors", self.flatten().len())
    }
}

impl std::error::Error for CompoundValidationError {}

/// A structural problem with a schema description itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("path `{path}` not found in schema")]
    PathNotFound { path: String },
    #[error("malformed schema node at `{path}`: {reason}")]
    BadNode { path: String, reason: String },
}
