//! Schema descriptions, the adapter boundary, and validation errors.
//!
//! A schema is a plain `serde_json::Value` description of a document's
//! shape. A [`SchemaAdapter`] interprets one dialect of description:
//! enumerating declared paths, classifying nodes, checking node-local
//! constraints, and instantiating default-valued documents. The builtin
//! [`BasicSchema`] engine covers the common dialect; alternative engines
//! plug in through a [`SchemaRegistry`].
//!
//! Validation failures aggregate into a [`CompoundValidationError`] tree
//! that flattens to fully-qualified paths:
//!
//! ```
//! use docmodel_schema::{BasicSchema, SchemaAdapter};
//! use serde_json::json;
//!
//! let engine = BasicSchema::new();
//! let schema = json!({"name": {"type": "String", "required": true}});
//! let paths: Vec<_> = engine.get_paths(&schema).into_iter().map(|b| b.path).collect();
//! assert_eq!(paths, vec!["name"]);
//! ```

mod adapter;
mod basic;
mod errors;

pub use adapter::{PathBinding, PathKind, SchemaAdapter, SchemaRegistry};
pub use basic::BasicSchema;
pub use errors::{CompoundValidationError, ErrorKey, SchemaError, ValidationError};
