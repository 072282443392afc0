//! Path-addressable document model with change tracking.
//!
//! A [`Model`] wraps a JSON document behind a schema: values are read and
//! written through path expressions (`likes[0].level`), writes commit
//! through update listeners and an append-only [`ChangeLog`], sub-views
//! share the store under a path prefix, and the schema drives both field
//! accessors and validation.
//!
//! # Example
//!
//! ```
//! use docmodel_core::{Model, ModelOptions};
//! use docmodel_schema::SchemaRegistry;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "name": {"type": "String", "required": true},
//!     "likes": [{"thing": "String", "level": {"type": "Number", "default": 5}}]
//! });
//! let registry = SchemaRegistry::with_defaults();
//! let kitty = Model::create(
//!     schema,
//!     &registry,
//!     ModelOptions::default(),
//!     &json!({"name": "Tartar Sauce", "likes": [{"thing": "grumping"}]}),
//! ).unwrap();
//!
//! assert_eq!(kitty.get("likes[0].thing").unwrap(), Some(json!("grumping")));
//! kitty.set("likes[0].level", json!(10)).unwrap();
//! assert_eq!(kitty.get("likes[0].level").unwrap(), Some(json!(10)));
//! ```

mod accessors;
mod changelog;
mod errors;
mod events;
mod model;
mod persistence;
mod resolve;
mod validate;

pub use accessors::{AccessorKind, AccessorNode, AccessorTree, ArrayField, Field};
pub use changelog::{Change, ChangeLog, ChangeRecord, PathChanged};
pub use errors::{ModelError, PathResolutionError};
pub use events::{ListenerId, ListenerSet};
pub use model::{Delta, Model, ModelOptions};
pub use persistence::{Persistence, PersistenceError};
pub use resolve::{get, get_index, get_maybe, get_path_mut, resolve, Resolved};
pub use validate::{validate_document, ValidationMode};
