//! Walking path expressions through a JSON tree.

use docmodel_path::{parse_path, Step};
use serde_json::Value;

use crate::errors::{ModelError, PathResolutionError};

/// Outcome of resolving a path: the addressed value (if present), its
/// parent container, and the final step that selects it in the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub parent: Value,
    pub value: Option<Value>,
    pub key: Option<Step>,
}

fn step_into<'v>(container: &'v Value, step: &Step) -> Option<&'v Value> {
    match (container, step) {
        (Value::Object(map), Step::Key(key)) => map.get(key),
        (Value::Array(items), Step::Index(index)) => {
            let index = usize::try_from(*index).ok()?;
            items.get(index)
        }
        _ => None,
    }
}

/// Resolve `path` against `root`.
///
/// A missing value at the *final* step resolves successfully with
/// `value: None`; a missing value anywhere earlier is an error, and the
/// error's `last_valid` names the longest prefix at which a container
/// could be scaffolded to make the walk proceed.
pub fn resolve(root: &Value, path: &str, current_path: &str) -> Result<Resolved, ModelError> {
    let parsed = parse_path(path)?;
    let mut parent = root;
    let mut current = Some(root);
    let mut key = None;
    for step in &parsed {
        let container = match current {
            Some(container) => container,
            None => {
                return Err(PathResolutionError {
                    full_path: path.to_string(),
                    last_valid: path[..step.start].to_string(),
                    first_invalid: step.step.to_string(),
                    current_path: current_path.to_string(),
                }
                .into())
            }
        };
        parent = container;
        current = step_into(container, &step.step);
        key = Some(step.step.clone());
    }
    Ok(Resolved {
        parent: parent.clone(),
        value: current.cloned(),
        key,
    })
}

/// The value at `path`, or `None` when the final step is absent.
pub fn get(root: &Value, path: &str, current_path: &str) -> Result<Option<Value>, ModelError> {
    resolve(root, path, current_path).map(|resolved| resolved.value)
}

/// Like [`get`], but an unresolvable intermediate step also reads as
/// absent instead of an error. Syntax errors still propagate.
pub fn get_maybe(root: &Value, path: &str, current_path: &str) -> Result<Option<Value>, ModelError> {
    match resolve(root, path, current_path) {
        Ok(resolved) => Ok(resolved.value),
        Err(ModelError::Resolution(_)) => Ok(None),
        Err(other) => Err(other),
    }
}

/// Single-step indexed read. Negative and out-of-range indexes read as
/// absent.
pub fn get_index(container: &Value, index: i64) -> Option<Value> {
    step_into(container, &Step::Index(index)).cloned()
}

/// Mutable walk along already-parsed steps. Returns `None` as soon as any
/// step fails to resolve.
pub fn get_path_mut<'v>(root: &'v mut Value, steps: &[Step]) -> Option<&'v mut Value> {
    let mut current = root;
    for step in steps {
        current = match (current, step) {
            (Value::Object(map), Step::Key(key)) => map.get_mut(key)?,
            (Value::Array(items), Step::Index(index)) => {
                let index = usize::try_from(*index).ok()?;
                items.get_mut(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}
