//! The path-addressable document model.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Map, Value};
use tracing::debug;

use docmodel_path::{join_path, parse_path, trim_base, Step};
use docmodel_schema::{PathKind, SchemaAdapter, SchemaError, SchemaRegistry, ValidationError};

use crate::accessors::{AccessorTree, Field};
use crate::changelog::{Change, ChangeLog, PathChanged};
use crate::errors::ModelError;
use crate::events::{self, ListenerId, ListenerSet};
use crate::persistence::Persistence;
use crate::resolve;
use crate::validate::{self, ValidationMode};

/// Behavior switches for a model.
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Run a fail-fast validation pass at the end of [`Model::load`].
    pub validate_on_creation: bool,
    /// Let generated accessors scaffold missing parents on assignment.
    pub allow_setting_through: bool,
    /// Record committed changes in a [`ChangeLog`].
    pub change_log: bool,
    /// Schema field names that must not become accessors.
    pub reserved_fields: Vec<String>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            validate_on_creation: true,
            allow_setting_through: false,
            change_log: true,
            reserved_fields: Vec::new(),
        }
    }
}

/// One committed mutation: the absolute path, the value written, and the
/// value it replaced (`None` when the location was absent).
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    pub path: String,
    pub value: Value,
    pub previous: Option<Value>,
}

/// A schema-backed document addressed by path expressions.
///
/// A model owns (or, for sub-views, shares) a JSON store and reads and
/// writes it through paths like `likes[0].level`. Every committed write
/// notifies update listeners and lands in the shared change log.
///
/// # Example
///
/// ```
/// use docmodel_core::{Model, ModelOptions};
/// use docmodel_schema::SchemaRegistry;
/// use serde_json::json;
///
/// let schema = json!({"name": {"type": "String", "required": true}});
/// let registry = SchemaRegistry::with_defaults();
/// let model = Model::create(
///     schema,
///     &registry,
///     ModelOptions::default(),
///     &json!({"name": "Tartar Sauce"}),
/// ).unwrap();
/// assert_eq!(model.get("name").unwrap(), Some(json!("Tartar Sauce")));
/// ```
#[derive(Clone)]
pub struct Model {
    pub(crate) store: Rc<RefCell<Value>>,
    /// Empty for a root model; `"owner."`-style prefix for sub-views.
    pub(crate) base_path: String,
    /// The root schema description.
    pub(crate) schema: Rc<Value>,
    /// The schema scope of this model: the root schema, or the sub-schema
    /// a view was scoped to.
    pub(crate) scope: Rc<Value>,
    pub(crate) adapter: Rc<dyn SchemaAdapter>,
    pub(crate) accessors: Rc<AccessorTree>,
    pub(crate) options: ModelOptions,
    pub(crate) listeners: Rc<RefCell<ListenerSet>>,
    pub(crate) change_log: Option<Rc<RefCell<ChangeLog>>>,
    pub(crate) persistence: Option<Rc<dyn Persistence>>,
}

impl Model {
    /// An empty model for a schema. No defaults are applied and nothing is
    /// validated; see [`Model::load`] and [`Model::create`].
    pub fn new(
        schema: Value,
        registry: &SchemaRegistry,
        options: ModelOptions,
    ) -> Result<Self, ModelError> {
        let adapter = registry.select(&schema).ok_or(ModelError::NoSchemaAdapter)?;
        let schema = Rc::new(schema);
        let accessors = Rc::new(AccessorTree::build(
            adapter.as_ref(),
            &schema,
            &options.reserved_fields,
        ));
        let change_log = options
            .change_log
            .then(|| Rc::new(RefCell::new(ChangeLog::new())));
        Ok(Self {
            store: Rc::new(RefCell::new(Value::Object(Map::new()))),
            base_path: String::new(),
            scope: Rc::clone(&schema),
            schema,
            adapter,
            accessors,
            options,
            listeners: Rc::new(RefCell::new(ListenerSet::new())),
            change_log,
            persistence: None,
        })
    }

    /// Build a model and load it in one go: schema defaults first, then
    /// `data` on top, then the creation-time validation pass.
    pub fn create(
        schema: Value,
        registry: &SchemaRegistry,
        options: ModelOptions,
        data: &Value,
    ) -> Result<Self, ModelError> {
        let model = Self::new(schema, registry, options)?;
        model.load(data)?;
        Ok(model)
    }

    pub fn set_persistence(&mut self, persistence: Rc<dyn Persistence>) {
        self.persistence = Some(persistence);
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The shared change log, when the model was configured with one.
    pub fn change_log(&self) -> Option<&Rc<RefCell<ChangeLog>>> {
        self.change_log.as_ref()
    }

    /// Populate the model from a plain document, silently (no events, no
    /// log records). Schema defaults go in first, then every schema path
    /// present in `data`; fields `data` carries outside the schema are
    /// dropped. Ends with a fail-fast validation pass when
    /// `validate_on_creation` is set.
    pub fn load(&self, data: &Value) -> Result<(), ModelError> {
        let defaults = self.adapter.create(None, &self.scope, None)?;
        if self.base_path.is_empty() {
            *self.store.borrow_mut() = defaults;
        } else {
            self.set_absolute_with_parents(trim_base(&self.base_path), defaults)?;
        }
        self.apply_quiet(data)?;
        if self.options.validate_on_creation {
            self.validate(ValidationMode::FailFast)?;
        }
        Ok(())
    }

    fn apply_quiet(&self, data: &Value) -> Result<(), ModelError> {
        for binding in self.adapter.get_paths(&self.scope) {
            if let Some(value) = resolve::get_maybe(data, &binding.path, &self.base_path)? {
                let full = join_path(&self.base_path, &binding.path);
                self.set_absolute_with_parents(&full, value)?;
            }
        }
        Ok(())
    }

    /// The value at `path`, resolved relative to this model. An absent
    /// final step reads as `None`; an absent intermediate step is an error.
    pub fn get(&self, path: &str) -> Result<Option<Value>, ModelError> {
        let full = join_path(&self.base_path, path);
        resolve::get(&self.store.borrow(), &full, &self.base_path)
    }

    /// Like [`Model::get`], but an unresolvable intermediate step also
    /// reads as absent.
    pub fn get_maybe(&self, path: &str) -> Result<Option<Value>, ModelError> {
        let full = join_path(&self.base_path, path);
        resolve::get_maybe(&self.store.borrow(), &full, &self.base_path)
    }

    /// This model's whole subtree: the root document, or the sub-view's
    /// slice of it (`Null` when the slice is absent).
    pub fn get_data(&self) -> Value {
        if self.base_path.is_empty() {
            return self.store.borrow().clone();
        }
        let trimmed = trim_base(&self.base_path);
        resolve::get_maybe(&self.store.borrow(), trimmed, &self.base_path)
            .ok()
            .flatten()
            .unwrap_or(Value::Null)
    }

    /// Write `value` at `path`. Writing the value already there is a
    /// no-op: nothing is committed and `Ok(None)` is returned. Parents
    /// must already exist; see [`Model::set_with_parents`].
    pub fn set(&self, path: &str, value: Value) -> Result<Option<Delta>, ModelError> {
        let full = join_path(&self.base_path, path);
        let delta = self.set_absolute(&full, value)?;
        self.commit(delta.as_ref());
        Ok(delta)
    }

    /// Write `value` at `path`, scaffolding missing intermediate
    /// containers: an object for a key step, an array for an index step.
    pub fn set_with_parents(&self, path: &str, value: Value) -> Result<Option<Delta>, ModelError> {
        let full = join_path(&self.base_path, path);
        let delta = self.set_absolute_with_parents(&full, value)?;
        self.commit(delta.as_ref());
        Ok(delta)
    }

    /// Assign every schema path present in `data`, committing all the
    /// resulting deltas as a single change batch.
    pub fn update(&self, data: &Value) -> Result<Vec<Delta>, ModelError> {
        let mut change = Change::default();
        let mut deltas = Vec::new();
        for binding in self.adapter.get_paths(&self.scope) {
            if let Some(value) = resolve::get_maybe(data, &binding.path, &self.base_path)? {
                let full = join_path(&self.base_path, &binding.path);
                if let Some(delta) = self.set_absolute_with_parents(&full, value)? {
                    change.paths.push(delta.path.clone());
                    change.values.push(delta.value.clone());
                    change.previous.push(delta.previous.clone());
                    deltas.push(delta);
                }
            }
        }
        if !change.is_empty() {
            self.emit_update(change);
        }
        Ok(deltas)
    }

    fn commit(&self, delta: Option<&Delta>) {
        if let Some(delta) = delta {
            self.emit_update(Change::single(
                delta.path.clone(),
                delta.value.clone(),
                delta.previous.clone(),
            ));
        }
    }

    fn emit_update(&self, change: Change) {
        if let Some(log) = &self.change_log {
            log.borrow_mut().add(change.clone());
        }
        events::emit(&self.listeners, &change);
    }

    /// Silent absolute-path write; callers commit the returned delta.
    fn set_absolute(&self, full: &str, value: Value) -> Result<Option<Delta>, ModelError> {
        let resolved = resolve::resolve(&self.store.borrow(), full, &self.base_path)?;
        if resolved.value.as_ref() == Some(&value) {
            return Ok(None);
        }

        // Assigning an object over an existing nested document merges it
        // field by field instead of replacing the whole subtree.
        if value.is_object() && resolved.value.as_ref().is_some_and(Value::is_object) {
            if let Some(node) = self.adapter.get_path_schema(full, &self.schema, None) {
                if self.adapter.kind(node) == PathKind::Document {
                    if let Some(sub) = self.adapter.sub_schema(node) {
                        return self.merge_document(full, sub, &value, resolved.value);
                    }
                }
            }
        }

        let steps: Vec<Step> = parse_path(full)?.into_iter().map(|p| p.step).collect();
        let Some((last, parents)) = steps.split_last() else {
            return Err(ModelError::NotWritable {
                path: full.to_string(),
            });
        };
        {
            let mut store = self.store.borrow_mut();
            let parent =
                resolve::get_path_mut(&mut store, parents).ok_or_else(|| ModelError::NotWritable {
                    path: full.to_string(),
                })?;
            write_step(parent, last, value.clone(), full)?;
        }
        Ok(Some(Delta {
            path: full.to_string(),
            value,
            previous: resolved.value,
        }))
    }

    fn merge_document(
        &self,
        full: &str,
        sub_schema: &Value,
        incoming: &Value,
        previous: Option<Value>,
    ) -> Result<Option<Delta>, ModelError> {
        let base = format!("{full}.");
        let mut touched = false;
        for binding in self.adapter.get_paths(sub_schema) {
            if let Some(value) = resolve::get_maybe(incoming, &binding.path, &base)? {
                let subfull = join_path(&base, &binding.path);
                if self.set_absolute_with_parents(&subfull, value)?.is_some() {
                    touched = true;
                }
            }
        }
        if !touched {
            return Ok(None);
        }
        let merged = resolve::get_maybe(&self.store.borrow(), full, &self.base_path)?
            .unwrap_or(Value::Null);
        Ok(Some(Delta {
            path: full.to_string(),
            value: merged,
            previous,
        }))
    }

    fn set_absolute_with_parents(
        &self,
        full: &str,
        value: Value,
    ) -> Result<Option<Delta>, ModelError> {
        // each retry creates exactly one missing parent, so the step count
        // bounds the loop
        let steps = parse_path(full)?;
        let mut remaining = steps.len();
        loop {
            match self.set_absolute(full, value.clone()) {
                Err(ModelError::Resolution(missing)) if remaining > 0 => {
                    remaining -= 1;
                    // the failing step starts right after the valid prefix;
                    // an index step needs an array scaffolded, a key an object
                    let is_index = steps
                        .iter()
                        .find(|step| step.start == missing.last_valid.len())
                        .is_some_and(|step| step.step.is_index());
                    let container = if is_index {
                        json!([])
                    } else {
                        Value::Object(Map::new())
                    };
                    debug!(
                        at = %missing.last_valid,
                        next = %missing.first_invalid,
                        "scaffolding missing parent"
                    );
                    self.set_absolute(&missing.last_valid, container)?;
                }
                outcome => return outcome,
            }
        }
    }

    /// A sub-model sharing this model's store, listeners, and change log,
    /// anchored at `path` and scoped to that path's sub-schema.
    pub fn view(&self, path: &str) -> Result<Model, ModelError> {
        let node = self
            .adapter
            .get_path_schema(path, &self.scope, None)
            .ok_or_else(|| SchemaError::PathNotFound {
                path: path.to_string(),
            })?;
        let scope = self
            .adapter
            .sub_schema(node)
            .ok_or_else(|| SchemaError::BadNode {
                path: path.to_string(),
                reason: "path has no sub-schema to scope a view to".to_string(),
            })?
            .clone();
        let full = join_path(&self.base_path, path);
        let scope = Rc::new(scope);
        let accessors = Rc::new(AccessorTree::build(
            self.adapter.as_ref(),
            &scope,
            &self.options.reserved_fields,
        ));
        Ok(Model {
            store: Rc::clone(&self.store),
            base_path: format!("{full}."),
            schema: Rc::clone(&self.schema),
            scope,
            adapter: Rc::clone(&self.adapter),
            accessors,
            options: self.options.clone(),
            listeners: Rc::clone(&self.listeners),
            change_log: self.change_log.clone(),
            persistence: self.persistence.clone(),
        })
    }

    /// Register an update listener; it sees every committed change batch,
    /// from this model and from every view sharing its store.
    pub fn on_update(&self, callback: impl FnMut(&Change) + 'static) -> ListenerId {
        self.listeners.borrow_mut().add(callback)
    }

    pub fn off_update(&self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(id)
    }

    /// Whether `path` changed since log id `since`, answered from the
    /// change log. A recorded change whose pre-image equals the current
    /// value reads as unchanged (the write was reverted).
    pub fn changed_since(&self, since: u64, path: &str) -> Result<PathChanged, ModelError> {
        let Some(log) = &self.change_log else {
            return Ok(PathChanged::Unknown);
        };
        let full = join_path(&self.base_path, path);
        let answer = log.borrow().changed_since(since, &full);
        if let PathChanged::Changed { from, .. } = &answer {
            if &self.get_maybe(path)? == from {
                return Ok(PathChanged::Unchanged);
            }
        }
        Ok(answer)
    }

    /// Validate this model's data against its schema scope.
    pub fn validate(&self, mode: ValidationMode) -> Result<(), ModelError> {
        let data = self.get_data();
        let data = (!data.is_null()).then_some(&data);
        validate::validate_document(self.adapter.as_ref(), &self.scope, data, mode)?;
        Ok(())
    }

    /// Validate the value at one path against that path's own schema
    /// constraints, without descending into nested documents.
    pub fn validate_path(&self, path: &str) -> Result<(), ModelError> {
        let node = self
            .adapter
            .get_path_schema(path, &self.scope, None)
            .ok_or_else(|| ValidationError::SchemaPathNotFound {
                path: path.to_string(),
            })?;
        let value = self.get_maybe(path)?;
        let error = match self.adapter.kind(node) {
            PathKind::Array | PathKind::DocumentArray => {
                let items = value.as_ref().and_then(Value::as_array);
                self.adapter
                    .validate_array(node, path, items.map(Vec::as_slice))
            }
            _ => self.adapter.validate_scalar(node, path, value.as_ref()),
        };
        match error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    /// The named top-level accessor, when the schema declares one.
    pub fn at(&self, name: &str) -> Option<Field<'_>> {
        Field::root(self, name)
    }

    fn persistence_backend(&self) -> Result<&Rc<dyn Persistence>, ModelError> {
        self.persistence.as_ref().ok_or(ModelError::NoPersistence)
    }

    /// Store this model's data under `id` in the configured backend.
    pub fn save(&self, id: &str) -> Result<(), ModelError> {
        self.persistence_backend()?
            .save(id, &self.get_data())
            .map_err(|e| ModelError::Persistence(Box::new(e)))
    }

    /// Fetch a stored document by id.
    pub fn fetch(&self, id: &str) -> Result<Option<Value>, ModelError> {
        self.persistence_backend()?
            .get(id)
            .map_err(|e| ModelError::Persistence(Box::new(e)))
    }

    /// Delete the stored document under `id`.
    pub fn remove_stored(&self, id: &str) -> Result<(), ModelError> {
        self.persistence_backend()?
            .remove(id)
            .map_err(|e| ModelError::Persistence(Box::new(e)))
    }

    /// Whether the stored document under `id` differs from this model's
    /// current data.
    pub fn is_stored_changed(&self, id: &str) -> Result<bool, ModelError> {
        self.persistence_backend()?
            .is_changed(id, &self.get_data())
            .map_err(|e| ModelError::Persistence(Box::new(e)))
    }
}

fn write_step(parent: &mut Value, step: &Step, value: Value, full: &str) -> Result<(), ModelError> {
    match (parent, step) {
        (Value::Object(map), Step::Key(key)) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        (Value::Array(items), Step::Index(index)) => {
            let index = usize::try_from(*index).map_err(|_| ModelError::NotWritable {
                path: full.to_string(),
            })?;
            if index >= items.len() {
                // writing past the end null-pads the gap
                items.resize(index + 1, Value::Null);
            }
            items[index] = value;
            Ok(())
        }
        _ => Err(ModelError::NotWritable {
            path: full.to_string(),
        }),
    }
}
