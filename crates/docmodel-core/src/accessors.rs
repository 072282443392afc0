//! Schema-generated field accessors.
//!
//! An [`AccessorTree`] is built once per schema scope from the declared
//! paths: dotted groupings become structural branches, nested documents
//! carry their own trees, arrays carry a prototype node for their
//! elements. At runtime a [`Field`] pairs a tree node with a concrete
//! path (indices included), so
//! `model.at("owner").child("online").child("website")` addresses exactly
//! what `model.get("owner.online.website")` does.

use std::rc::Rc;

use serde_json::Value;

use docmodel_path::{push_step, Step};
use docmodel_schema::{PathKind, SchemaAdapter};

use crate::errors::ModelError;
use crate::model::{Delta, Model};

#[derive(Debug)]
pub enum AccessorKind {
    /// A plain value.
    Scalar,
    /// An intermediate segment of a dotted schema path.
    Structural { children: Vec<Rc<AccessorNode>> },
    /// An array; `item` is the prototype node for any element.
    Array { item: Rc<AccessorNode> },
    /// A nested document with its own accessor tree.
    Document { tree: Rc<AccessorTree> },
}

#[derive(Debug)]
pub struct AccessorNode {
    pub name: String,
    pub kind: AccessorKind,
}

/// The accessors of one schema scope, in declaration order.
#[derive(Debug, Default)]
pub struct AccessorTree {
    pub children: Vec<Rc<AccessorNode>>,
}

#[derive(Default)]
struct Builder {
    children: Vec<(String, BuilderNode)>,
}

enum BuilderNode {
    Leaf(AccessorKind),
    Branch(Builder),
}

impl Builder {
    fn insert(&mut self, segments: &[&str], kind: AccessorKind) {
        let Some((head, rest)) = segments.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.children
                .push((head.to_string(), BuilderNode::Leaf(kind)));
            return;
        }
        let position = match self.children.iter().position(|(name, _)| name == head) {
            Some(position) => {
                if !matches!(self.children[position].1, BuilderNode::Branch(_)) {
                    self.children[position].1 = BuilderNode::Branch(Builder::default());
                }
                position
            }
            None => {
                self.children
                    .push((head.to_string(), BuilderNode::Branch(Builder::default())));
                self.children.len() - 1
            }
        };
        if let BuilderNode::Branch(branch) = &mut self.children[position].1 {
            branch.insert(rest, kind);
        }
    }

    fn freeze(self) -> Vec<Rc<AccessorNode>> {
        self.children
            .into_iter()
            .map(|(name, node)| {
                Rc::new(AccessorNode {
                    name,
                    kind: match node {
                        BuilderNode::Leaf(kind) => kind,
                        BuilderNode::Branch(branch) => AccessorKind::Structural {
                            children: branch.freeze(),
                        },
                    },
                })
            })
            .collect()
    }
}

impl AccessorTree {
    pub fn build(adapter: &dyn SchemaAdapter, schema: &Value, reserved: &[String]) -> Self {
        let mut builder = Builder::default();
        for binding in adapter.get_paths(schema) {
            let segments: Vec<&str> = binding.path.split('.').collect();
            match segments.first() {
                Some(first) if !reserved.iter().any(|r| r == first) => {}
                _ => continue,
            }
            let kind = leaf_kind(adapter, binding.node, binding.kind, reserved);
            builder.insert(&segments, kind);
        }
        Self {
            children: builder.freeze(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<AccessorNode>> {
        self.children.iter().find(|node| node.name == name).cloned()
    }
}

fn leaf_kind(
    adapter: &dyn SchemaAdapter,
    node: &Value,
    kind: PathKind,
    reserved: &[String],
) -> AccessorKind {
    match kind {
        PathKind::Scalar => AccessorKind::Scalar,
        PathKind::Document => match adapter.sub_schema(node) {
            Some(sub) => AccessorKind::Document {
                tree: Rc::new(AccessorTree::build(adapter, sub, reserved)),
            },
            None => AccessorKind::Scalar,
        },
        PathKind::DocumentArray => {
            let item_kind = match adapter.sub_schema(node) {
                Some(sub) => AccessorKind::Document {
                    tree: Rc::new(AccessorTree::build(adapter, sub, reserved)),
                },
                None => AccessorKind::Scalar,
            };
            AccessorKind::Array {
                item: Rc::new(AccessorNode {
                    name: String::new(),
                    kind: item_kind,
                }),
            }
        }
        PathKind::Array => AccessorKind::Array {
            item: Rc::new(AccessorNode {
                name: String::new(),
                kind: AccessorKind::Scalar,
            }),
        },
    }
}

/// One addressable field of a model: a tree node anchored at a concrete
/// runtime path.
pub struct Field<'m> {
    model: &'m Model,
    node: Rc<AccessorNode>,
    path: String,
}

impl<'m> Field<'m> {
    pub(crate) fn root(model: &'m Model, name: &str) -> Option<Self> {
        let node = model.accessors.lookup(name)?;
        let mut path = String::new();
        push_step(&mut path, &Step::Key(name.to_string()));
        Some(Self { model, node, path })
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// The model-relative path this field addresses.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self) -> Result<Option<Value>, ModelError> {
        self.model.get_maybe(&self.path)
    }

    /// Assign through the model; with `allow_setting_through` set, missing
    /// parents are scaffolded on the way.
    pub fn set(&self, value: Value) -> Result<Option<Delta>, ModelError> {
        if self.model.options.allow_setting_through {
            self.model.set_with_parents(&self.path, value)
        } else {
            self.model.set(&self.path, value)
        }
    }

    /// Descend one named step, through a structural branch or into a
    /// nested document's tree.
    pub fn child(&self, name: &str) -> Option<Field<'m>> {
        let children = match &self.node.kind {
            AccessorKind::Structural { children } => children,
            AccessorKind::Document { tree } => &tree.children,
            _ => return None,
        };
        let node = children.iter().find(|child| child.name == name)?.clone();
        let mut path = self.path.clone();
        push_step(&mut path, &Step::Key(name.to_string()));
        Some(Field {
            model: self.model,
            node,
            path,
        })
    }

    pub fn as_array(&self) -> Option<ArrayField<'m>> {
        match &self.node.kind {
            AccessorKind::Array { item } => Some(ArrayField {
                model: self.model,
                item: Rc::clone(item),
                path: self.path.clone(),
            }),
            _ => None,
        }
    }
}

/// Array-shaped field with element access and list mutations.
pub struct ArrayField<'m> {
    model: &'m Model,
    item: Rc<AccessorNode>,
    path: String,
}

impl<'m> ArrayField<'m> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A clone of the current elements; an absent array reads as empty.
    pub fn values(&self) -> Result<Vec<Value>, ModelError> {
        Ok(self
            .model
            .get_maybe(&self.path)?
            .and_then(|value| match value {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default())
    }

    pub fn len(&self) -> Result<usize, ModelError> {
        Ok(self.values()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ModelError> {
        Ok(self.values()?.is_empty())
    }

    /// The field addressing element `index` (which need not exist yet).
    pub fn item(&self, index: usize) -> Field<'m> {
        let mut path = self.path.clone();
        push_step(&mut path, &Step::Index(index as i64));
        Field {
            model: self.model,
            node: Rc::clone(&self.item),
            path,
        }
    }

    /// Route a string key: numeric strings address elements.
    pub fn at_key(&self, key: &str) -> Option<Field<'m>> {
        key.parse::<usize>().ok().map(|index| self.item(index))
    }

    pub fn get(&self, index: usize) -> Result<Option<Value>, ModelError> {
        self.item(index).get()
    }

    pub fn set(&self, index: usize, value: Value) -> Result<Option<Delta>, ModelError> {
        self.item(index).set(value)
    }

    /// Append an element; the whole array is committed as one change.
    pub fn push(&self, value: Value) -> Result<usize, ModelError> {
        let mut items = self.values()?;
        items.push(value);
        self.replace(items)
    }

    /// Prepend an element; the whole array is committed as one change.
    pub fn unshift(&self, value: Value) -> Result<usize, ModelError> {
        let mut items = self.values()?;
        items.insert(0, value);
        self.replace(items)
    }

    fn replace(&self, items: Vec<Value>) -> Result<usize, ModelError> {
        let len = items.len();
        self.model.set_with_parents(&self.path, Value::Array(items))?;
        Ok(len)
    }

    /// Fields for every current element.
    pub fn iter(&self) -> Result<Vec<Field<'m>>, ModelError> {
        Ok((0..self.len()?).map(|index| self.item(index)).collect())
    }

    /// A clone of elements `start..end`, clamped to the current length.
    pub fn slice(&self, start: usize, end: usize) -> Result<Vec<Value>, ModelError> {
        let items = self.values()?;
        let end = end.min(items.len());
        let start = start.min(end);
        Ok(items[start..end].to_vec())
    }
}
