//! Storage backend boundary.
//!
//! The model core never talks to storage directly; a backend implements
//! [`Persistence`] and the model delegates to it verbatim. Backends are
//! consumed only, so anything from an in-memory map to a remote store
//! fits behind the trait.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct PersistenceError {
    pub message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A document storage backend keyed by id.
pub trait Persistence {
    /// Fetch one document by id.
    fn get(&self, id: &str) -> Result<Option<Value>, PersistenceError>;

    /// Fetch every document matching a backend-interpreted query.
    fn query(&self, query: &Value) -> Result<Vec<Value>, PersistenceError>;

    /// Store a document under an id, replacing any existing one.
    fn save(&self, id: &str, data: &Value) -> Result<(), PersistenceError>;

    /// Delete a document. Deleting an absent id is not an error.
    fn remove(&self, id: &str) -> Result<(), PersistenceError>;

    /// Whether the stored document differs from `data`.
    fn is_changed(&self, id: &str, data: &Value) -> Result<bool, PersistenceError> {
        Ok(self.get(id)?.as_ref() != Some(data))
    }
}
