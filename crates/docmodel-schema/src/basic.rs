//! Builtin declarative schema engine.
//!
//! Schemas are plain JSON descriptions:
//!
//! ```json
//! {
//!   "name": {"type": "String", "required": true},
//!   "likes": [{
//!     "thing": {"type": "String", "required": true},
//!     "level": {"type": "Number", "default": 5, "min": 0, "max": 10}
//!   }],
//!   "online": {"type": "Document", "schema": {"website": "String"}},
//!   "features": {"breed": {"type": "String", "required": true}, "eyes": "String"}
//! }
//! ```
//!
//! A field maps to a descriptor (`{"type": "String", ...}` or the bare
//! `"String"` shorthand), a one-element array (array of documents, or of
//! scalars when the element is a descriptor), a `Document` descriptor
//! (single nested document), or a plain object without `"type"` — a
//! grouping that contributes dotted paths like `features.breed`.

use serde_json::{json, Map, Value};

use crate::adapter::{PathBinding, PathKind, SchemaAdapter};
use crate::errors::{SchemaError, ValidationError};

/// The builtin schema engine.
#[derive(Debug, Default)]
pub struct BasicSchema;

impl BasicSchema {
    pub fn new() -> Self {
        Self
    }

    /// A descriptor is anything that terminates path enumeration: a type
    /// shorthand, an array node, or an object carrying a string `"type"`.
    fn is_descriptor(node: &Value) -> bool {
        match node {
            Value::String(_) | Value::Array(_) => true,
            Value::Object(map) => matches!(map.get("type"), Some(Value::String(_))),
            _ => false,
        }
    }

    fn type_name(node: &Value) -> &str {
        match node {
            Value::String(name) => name,
            Value::Array(_) => "Array",
            Value::Object(map) => match map.get("type") {
                Some(Value::String(name)) => name,
                _ => "Mixed",
            },
            _ => "Mixed",
        }
    }

    fn constraints(node: &Value) -> Option<&Map<String, Value>> {
        node.as_object()
    }

    fn is_required(node: &Value) -> bool {
        Self::constraints(node)
            .and_then(|map| map.get("required"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The element node of an array schema: the single element of the
    /// shorthand form, or `"of"` in the longhand form.
    fn element_node(node: &Value) -> Option<&Value> {
        match node {
            Value::Array(elements) => elements.first(),
            Value::Object(map) if Self::type_name(node) == "Array" => map.get("of"),
            _ => None,
        }
    }

    fn collect_paths<'s>(&self, schema: &'s Value, prefix: &str, out: &mut Vec<PathBinding<'s>>) {
        let Some(map) = schema.as_object() else {
            return;
        };
        for (key, node) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            if Self::is_descriptor(node) {
                let kind = self.kind(node);
                out.push(PathBinding { path, node, kind });
            } else if node.is_object() {
                self.collect_paths(node, &path, out);
            } else {
                // malformed node: enumerate as an unconstrained scalar
                out.push(PathBinding {
                    path,
                    node,
                    kind: PathKind::Scalar,
                });
            }
        }
    }

    /// Walk a (possibly dotted) path through the schema, descending into
    /// sub-schemas at descriptors. Index segments were already stripped.
    fn lookup<'s>(&self, path: &str, schema: &'s Value) -> Option<&'s Value> {
        let steps = docmodel_path::parse_path(path).ok()?;
        let mut parts: Vec<String> = Vec::new();
        for parsed in steps {
            match parsed.step {
                docmodel_path::Step::Key(key) => parts.push(key),
                // schemas address array elements through the array node
                docmodel_path::Step::Index(_) => {}
            }
        }
        let mut current = schema;
        let mut iter = parts.iter().peekable();
        while let Some(part) = iter.next() {
            let map = current.as_object()?;
            let node = map.get(part)?;
            if iter.peek().is_none() {
                return Some(node);
            }
            current = if Self::is_descriptor(node) {
                self.sub_schema(node)?
            } else {
                node
            };
        }
        Some(current)
    }

    fn create_from_schema(&self, schema: &Value) -> Value {
        let mut root = Map::new();
        for binding in self.get_paths(schema) {
            let mut parts: Vec<&str> = binding.path.split('.').collect();
            let Some(tail) = parts.pop() else {
                continue;
            };
            let Some(target) = Self::descend(&mut root, &parts) else {
                continue;
            };
            if let Some(default) = self.default_value(binding.node, binding.kind) {
                target.insert(tail.to_string(), default);
            }
        }
        Value::Object(root)
    }

    /// Walk (creating objects as needed) down the chain named by `parts`.
    /// `None` when an earlier default already put a non-object there.
    fn descend<'a>(
        root: &'a mut Map<String, Value>,
        parts: &[&str],
    ) -> Option<&'a mut Map<String, Value>> {
        let mut current = root;
        for part in parts {
            current = current
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()))
                .as_object_mut()?;
        }
        Some(current)
    }

    fn default_value(&self, node: &Value, kind: PathKind) -> Option<Value> {
        let explicit = Self::constraints(node).and_then(|map| map.get("default")).cloned();
        match kind {
            PathKind::Scalar => explicit,
            PathKind::Array | PathKind::DocumentArray => Some(explicit.unwrap_or_else(|| json!([]))),
            // nested documents stay absent until assigned
            PathKind::Document => None,
        }
    }

    fn check_number_range(
        constraints: &Map<String, Value>,
        path: &str,
        value: f64,
    ) -> Option<ValidationError> {
        if let Some(min) = constraints.get("min").and_then(Value::as_f64) {
            if value < min {
                return Some(ValidationError::OutOfRange {
                    path: path.to_string(),
                    constraint: format!("min {min}, got {value}"),
                });
            }
        }
        if let Some(max) = constraints.get("max").and_then(Value::as_f64) {
            if value > max {
                return Some(ValidationError::OutOfRange {
                    path: path.to_string(),
                    constraint: format!("max {max}, got {value}"),
                });
            }
        }
        None
    }

    fn check_string_length(
        constraints: &Map<String, Value>,
        path: &str,
        value: &str,
    ) -> Option<ValidationError> {
        let length = value.chars().count() as u64;
        if let Some(min) = constraints.get("minLength").and_then(Value::as_u64) {
            if length < min {
                return Some(ValidationError::WrongLength {
                    path: path.to_string(),
                    constraint: format!("minLength {min}, got {length}"),
                });
            }
        }
        if let Some(max) = constraints.get("maxLength").and_then(Value::as_u64) {
            if length > max {
                return Some(ValidationError::WrongLength {
                    path: path.to_string(),
                    constraint: format!("maxLength {max}, got {length}"),
                });
            }
        }
        None
    }
}

impl SchemaAdapter for BasicSchema {
    fn test(&self, schema: &Value) -> bool {
        match schema.as_object() {
            Some(map) => map
                .values()
                .all(|node| matches!(node, Value::Object(_) | Value::Array(_) | Value::String(_))),
            None => false,
        }
    }

    fn get_paths<'s>(&self, schema: &'s Value) -> Vec<PathBinding<'s>> {
        let mut out = Vec::new();
        self.collect_paths(schema, "", &mut out);
        out
    }

    fn get_path_schema<'s>(
        &self,
        path: &str,
        schema: &'s Value,
        base_path: Option<&str>,
    ) -> Option<&'s Value> {
        if let Some(node) = self.lookup(path, schema) {
            return Some(node);
        }
        let base = base_path.filter(|base| !base.is_empty())?;
        let full = docmodel_path::join_path(base, path);
        self.lookup(&full, schema)
    }

    fn kind(&self, node: &Value) -> PathKind {
        match node {
            Value::Array(_) => match Self::element_node(node) {
                Some(element) if element.is_object() && !Self::is_descriptor(element) => {
                    PathKind::DocumentArray
                }
                Some(element) if Self::type_name(element) == "Document" => PathKind::DocumentArray,
                _ => PathKind::Array,
            },
            Value::Object(map) => match Self::type_name(node) {
                "Array" => match Self::element_node(node) {
                    Some(element) if element.is_object() && !Self::is_descriptor(element) => {
                        PathKind::DocumentArray
                    }
                    Some(element) if Self::type_name(element) == "Document" => {
                        PathKind::DocumentArray
                    }
                    _ => PathKind::Array,
                },
                "Document" => PathKind::Document,
                "Mixed" if !map.contains_key("type") => PathKind::Document,
                _ => PathKind::Scalar,
            },
            _ => PathKind::Scalar,
        }
    }

    fn sub_schema<'s>(&self, node: &'s Value) -> Option<&'s Value> {
        match node {
            Value::Array(_) => {
                let element = Self::element_node(node)?;
                if Self::type_name(element) == "Document" {
                    element.as_object()?.get("schema")
                } else {
                    Some(element)
                }
            }
            Value::Object(map) => match Self::type_name(node) {
                "Array" => {
                    let element = Self::element_node(node)?;
                    if Self::type_name(element) == "Document" {
                        element.as_object()?.get("schema")
                    } else {
                        Some(element)
                    }
                }
                "Document" => map.get("schema"),
                // a grouping is its own sub-schema
                "Mixed" if !map.contains_key("type") => Some(node),
                _ => None,
            },
            _ => None,
        }
    }

    fn validate_scalar(
        &self,
        node: &Value,
        path: &str,
        value: Option<&Value>,
    ) -> Option<ValidationError> {
        let value = match value {
            Some(value) if !value.is_null() => value,
            _ => {
                if Self::is_required(node) {
                    return Some(ValidationError::Required {
                        path: path.to_string(),
                    });
                }
                return None;
            }
        };

        let expected = match Self::type_name(node) {
            "String" if !value.is_string() => Some("string"),
            "Number" if !value.is_number() => Some("number"),
            "Boolean" if !value.is_boolean() => Some("boolean"),
            "Document" if !value.is_object() => Some("document"),
            "Array" if !value.is_array() => Some("array"),
            _ => None,
        };
        if let Some(expected) = expected {
            return Some(ValidationError::WrongType {
                path: path.to_string(),
                expected: expected.to_string(),
            });
        }

        let constraints = Self::constraints(node)?;
        if let Some(number) = value.as_f64() {
            if let Some(error) = Self::check_number_range(constraints, path, number) {
                return Some(error);
            }
        }
        if let Some(string) = value.as_str() {
            if let Some(error) = Self::check_string_length(constraints, path, string) {
                return Some(error);
            }
        }
        if let Some(allowed) = constraints.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                return Some(ValidationError::NotInEnum {
                    path: path.to_string(),
                });
            }
        }
        None
    }

    fn validate_array(
        &self,
        node: &Value,
        path: &str,
        items: Option<&[Value]>,
    ) -> Option<ValidationError> {
        let Some(items) = items else {
            if Self::is_required(node) {
                return Some(ValidationError::Required {
                    path: path.to_string(),
                });
            }
            return None;
        };
        let constraints = Self::constraints(node)?;
        let count = items.len() as u64;
        if let Some(min) = constraints.get("minItems").and_then(Value::as_u64) {
            if count < min {
                return Some(ValidationError::OutOfRange {
                    path: path.to_string(),
                    constraint: format!("minItems {min}, got {count}"),
                });
            }
        }
        if let Some(max) = constraints.get("maxItems").and_then(Value::as_u64) {
            if count > max {
                return Some(ValidationError::OutOfRange {
                    path: path.to_string(),
                    constraint: format!("maxItems {max}, got {count}"),
                });
            }
        }
        None
    }

    fn create(
        &self,
        subpath: Option<&str>,
        schema: &Value,
        base_path: Option<&str>,
    ) -> Result<Value, SchemaError> {
        let mut target = schema;
        if let Some(sub) = subpath {
            target = self
                .get_path_schema(sub, schema, base_path)
                .ok_or_else(|| SchemaError::PathNotFound {
                    path: sub.to_string(),
                })?;
        } else if let Some(base) = base_path.filter(|base| !base.is_empty()) {
            let trimmed = docmodel_path::trim_base(base);
            target = self
                .get_path_schema(trimmed, schema, None)
                .ok_or_else(|| SchemaError::PathNotFound {
                    path: trimmed.to_string(),
                })?;
        }
        match self.kind(target) {
            PathKind::Document => {
                let sub = self.sub_schema(target).ok_or_else(|| SchemaError::BadNode {
                    path: subpath.unwrap_or("").to_string(),
                    reason: "document node has no sub-schema".to_string(),
                })?;
                Ok(self.create_from_schema(sub))
            }
            PathKind::Array | PathKind::DocumentArray => Ok(self
                .default_value(target, PathKind::Array)
                .unwrap_or_else(|| json!([]))),
            PathKind::Scalar => Ok(self
                .default_value(target, PathKind::Scalar)
                .unwrap_or(Value::Null)),
        }
    }
}
