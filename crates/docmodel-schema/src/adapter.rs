//! The boundary between the model core and a concrete schema engine.

use std::rc::Rc;

use serde_json::Value;

use crate::basic::BasicSchema;
use crate::errors::{SchemaError, ValidationError};

/// Structural role of one schema path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A plain value with node-local constraints.
    Scalar,
    /// A single nested document with its own sub-schema.
    Document,
    /// An array whose elements are documents of a sub-schema.
    DocumentArray,
    /// An array of scalar elements.
    Array,
}

/// One declared schema path with its node description.
#[derive(Debug, Clone)]
pub struct PathBinding<'s> {
    pub path: String,
    pub node: &'s Value,
    pub kind: PathKind,
}

/// Pluggable translator between a concrete schema engine and the core's
/// path/validation contract.
///
/// Schemas are raw `serde_json::Value` descriptions; an adapter interprets
/// them. Path enumeration order must be deterministic (declaration order),
/// since validation traversal and accessor generation iterate it.
///
/// Adapters are node-local on purpose: recursion into nested documents and
/// array elements is driven by the model core, so an adapter never needs a
/// handle to the model it is validating.
pub trait SchemaAdapter {
    /// Check whether this adapter understands the given schema description.
    /// Used by [`SchemaRegistry::select`].
    fn test(&self, schema: &Value) -> bool;

    /// Every path declared by the schema, in declaration order.
    fn get_paths<'s>(&self, schema: &'s Value) -> Vec<PathBinding<'s>>;

    /// Visit every declared path in declaration order.
    fn each_path(&self, schema: &Value, visit: &mut dyn FnMut(&str, &Value)) {
        for binding in self.get_paths(schema) {
            visit(&binding.path, binding.node);
        }
    }

    /// The schema node addressed by `path`, if any. `base_path` is the
    /// prefix of a sub-model view; bracketed index segments in `path` are
    /// stripped, since schemas address elements through the array node.
    fn get_path_schema<'s>(
        &self,
        path: &str,
        schema: &'s Value,
        base_path: Option<&str>,
    ) -> Option<&'s Value>;

    /// Structural role of a schema node.
    fn kind(&self, node: &Value) -> PathKind;

    /// The sub-schema of a `Document` or `DocumentArray` node.
    fn sub_schema<'s>(&self, node: &'s Value) -> Option<&'s Value>;

    /// Validate one value against a node's own constraints. Absent values
    /// arrive as `None`; required-ness is this node's concern.
    fn validate_scalar(
        &self,
        node: &Value,
        path: &str,
        value: Option<&Value>,
    ) -> Option<ValidationError>;

    /// Validate array-level constraints only (required, item counts); the
    /// elements themselves are validated by the traversal.
    fn validate_array(
        &self,
        node: &Value,
        path: &str,
        items: Option<&[Value]>,
    ) -> Option<ValidationError>;

    /// Build a default-valued instance of a schema node. With a `subpath`
    /// the node is looked up first; otherwise the whole schema (scoped by
    /// `base_path` when given) is instantiated.
    fn create(
        &self,
        subpath: Option<&str>,
        schema: &Value,
        base_path: Option<&str>,
    ) -> Result<Value, SchemaError>;
}

/// Ordered adapter registry; the first adapter whose `test` passes wins.
///
/// # Example
///
/// ```
/// use docmodel_schema::SchemaRegistry;
/// use serde_json::json;
///
/// let registry = SchemaRegistry::with_defaults();
/// let schema = json!({"name": {"type": "String"}});
/// assert!(registry.select(&schema).is_some());
/// ```
pub struct SchemaRegistry {
    adapters: Vec<Rc<dyn SchemaAdapter>>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// A registry with the builtin [`BasicSchema`] engine registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Rc::new(BasicSchema::new()));
        registry
    }

    pub fn register(&mut self, adapter: Rc<dyn SchemaAdapter>) {
        self.adapters.push(adapter);
    }

    /// The first registered adapter whose `test` accepts the schema.
    pub fn select(&self, schema: &Value) -> Option<Rc<dyn SchemaAdapter>> {
        self.adapters
            .iter()
            .find(|adapter| adapter.test(schema))
            .cloned()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
