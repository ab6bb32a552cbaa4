//! Object-model seams between the traversal engine and the rule engine,
//! plus a small in-memory value model used by tests and harnesses.
//!
//! The rule engine never introspects host objects itself: values arrive
//! behind the [`ValueNode`] trait, and custom equality strategies arrive
//! behind the [`Comparator`] trait. The engine stores and resolves
//! comparators; invoking them is the traversal engine's job.

use std::any::Any;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use thiserror::Error;

use crate::type_identity::{TypeIdentity, TypeKind};

// ---------------------------------------------------------------------------
// Traversal-engine seams
// ---------------------------------------------------------------------------

/// Raised when a named field is absent or cannot be read from a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}` is not readable on type `{type_name}`")]
pub struct FieldUnreadable {
    pub type_name: String,
    pub field: String,
}

/// One value node in a compared object graph, as exposed by the host
/// introspection layer.
pub trait ValueNode {
    /// Exact runtime type identity of this value.
    fn type_identity(&self) -> TypeIdentity;

    /// Names of the fields this value exposes; empty for non-composite
    /// values.
    fn field_names(&self) -> BTreeSet<String>;

    /// Read a field by name. `Ok(None)` means the field exists and holds
    /// null; `Err` means the field is absent or unreadable.
    fn read_field(&self, name: &str) -> Result<Option<&dyn ValueNode>, FieldUnreadable>;

    /// Concrete-type escape hatch for comparator implementations.
    fn as_any(&self) -> &dyn Any;
}

/// Custom equality strategy registered for a type or a field path.
pub trait Comparator: Send + Sync {
    fn compare(&self, actual: &dyn ValueNode, expected: &dyn ValueNode) -> Ordering;

    /// Short label used when rendering the active configuration.
    fn describe(&self) -> &str {
        "custom comparator"
    }
}

/// Shared handle under which comparators are registered and resolved.
pub type SharedComparator = Arc<dyn Comparator>;

// ---------------------------------------------------------------------------
// Value — in-memory model standing in for host introspection
// ---------------------------------------------------------------------------

/// In-memory value model implementing [`ValueNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Seconds since the Unix epoch; the model's only temporal shape.
    Timestamp(i64),
    Seq(Vec<Value>),
    Record(Record),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn seq<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Self::Seq(items.into_iter().collect())
    }
}

/// A composite value with a named type and nullable named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    type_name: String,
    fields: BTreeMap<String, Option<Value>>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a non-null field.
    pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), Some(value));
        self
    }

    /// Add a field holding null.
    pub fn null_field(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), None);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl ValueNode for Value {
    fn type_identity(&self) -> TypeIdentity {
        match self {
            Value::Bool(_) => TypeIdentity::boolean(),
            Value::Int(_) => TypeIdentity::integer("i64"),
            Value::Float(_) => TypeIdentity::float("f64"),
            Value::Text(_) => TypeIdentity::text(),
            Value::Timestamp(_) => TypeIdentity::temporal("Timestamp"),
            Value::Seq(_) => TypeIdentity::sequence("Vec"),
            Value::Record(record) => TypeIdentity::new(TypeKind::Composite, record.type_name.clone()),
        }
    }

    fn field_names(&self) -> BTreeSet<String> {
        match self {
            Value::Record(record) => record.fields.keys().cloned().collect(),
            _ => BTreeSet::new(),
        }
    }

    fn read_field(&self, name: &str) -> Result<Option<&dyn ValueNode>, FieldUnreadable> {
        match self {
            Value::Record(record) => match record.fields.get(name) {
                Some(slot) => Ok(slot.as_ref().map(|value| value as &dyn ValueNode)),
                None => Err(FieldUnreadable {
                    type_name: record.type_name.clone(),
                    field: name.to_string(),
                }),
            },
            other => Err(FieldUnreadable {
                type_name: other.type_identity().name,
                field: name.to_string(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
