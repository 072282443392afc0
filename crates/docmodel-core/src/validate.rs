//! Schema validation traversal.

use serde_json::Value;

use docmodel_schema::{
    CompoundValidationError, ErrorKey, PathKind, SchemaAdapter, ValidationError,
};

use crate::resolve;

/// Whether validation stops at the first failure or collects them all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    FailFast,
    Collect,
}

/// Validate `data` against a schema scope.
///
/// Every declared path is checked in declaration order. Nested documents
/// and document-array elements recurse; in `Collect` mode their failures
/// nest as compound errors keyed by field and index, so the result
/// flattens to fully-qualified paths like `.likes[0].level`.
pub fn validate_document(
    adapter: &dyn SchemaAdapter,
    schema: &Value,
    data: Option<&Value>,
    mode: ValidationMode,
) -> Result<(), ValidationError> {
    let mut collected: Vec<(ErrorKey, ValidationError)> = Vec::new();
    for binding in adapter.get_paths(schema) {
        let value = match data {
            Some(data) => resolve::get_maybe(data, &binding.path, "")
                .ok()
                .flatten(),
            None => None,
        };
        let failure = match binding.kind {
            PathKind::Scalar => adapter.validate_scalar(binding.node, &binding.path, value.as_ref()),
            PathKind::Document => validate_nested(adapter, &binding, value.as_ref(), mode),
            PathKind::Array => validate_elements(adapter, &binding, value.as_ref(), mode, false),
            PathKind::DocumentArray => {
                validate_elements(adapter, &binding, value.as_ref(), mode, true)
            }
        };
        if let Some(error) = failure {
            match mode {
                ValidationMode::FailFast => return Err(error),
                ValidationMode::Collect => {
                    collected.push((ErrorKey::Field(binding.path.clone()), error));
                }
            }
        }
    }
    if collected.is_empty() {
        Ok(())
    } else {
        Err(CompoundValidationError::new(collected).into())
    }
}

fn validate_nested(
    adapter: &dyn SchemaAdapter,
    binding: &docmodel_schema::PathBinding<'_>,
    value: Option<&Value>,
    mode: ValidationMode,
) -> Option<ValidationError> {
    if let Some(error) = adapter.validate_scalar(binding.node, &binding.path, value) {
        return Some(error);
    }
    // an absent optional document has nothing to recurse into
    let value = value?;
    let sub = adapter.sub_schema(binding.node)?;
    match validate_document(adapter, sub, Some(value), mode) {
        Ok(()) => None,
        Err(error) => Some(error),
    }
}

fn validate_elements(
    adapter: &dyn SchemaAdapter,
    binding: &docmodel_schema::PathBinding<'_>,
    value: Option<&Value>,
    mode: ValidationMode,
    documents: bool,
) -> Option<ValidationError> {
    let items = match value {
        Some(value) if !value.is_array() => {
            return Some(ValidationError::WrongType {
                path: binding.path.clone(),
                expected: "array".to_string(),
            })
        }
        Some(value) => value.as_array(),
        None => None,
    };
    if let Some(error) =
        adapter.validate_array(binding.node, &binding.path, items.map(Vec::as_slice))
    {
        return Some(error);
    }
    let items = items?;
    let element_schema = adapter.sub_schema(binding.node)?;
    let mut failures: Vec<(ErrorKey, ValidationError)> = Vec::new();
    for (index, element) in items.iter().enumerate() {
        let failure = if documents {
            validate_document(adapter, element_schema, Some(element), mode).err()
        } else {
            adapter.validate_scalar(element_schema, &binding.path, Some(element))
        };
        if let Some(error) = failure {
            failures.push((ErrorKey::Index(index), error));
            if mode == ValidationMode::FailFast {
                break;
            }
        }
    }
    if failures.is_empty() {
        None
    } else {
        Some(CompoundValidationError::new(failures).into())
    }
}
