//! Dual values: one comparison node pairing the actual-side and
//! expected-side values found at a path.

use std::fmt;

use crate::field_path::FieldPath;
use crate::object_model::{FieldUnreadable, ValueNode};
use crate::type_identity::TypeIdentity;

/// A single traversal node: a path plus the actual and expected values at
/// that location. Transient and never mutated after construction; the
/// traversal engine builds one per visited node.
#[derive(Clone)]
pub struct DualValue<'g> {
    path: FieldPath,
    actual: Option<&'g dyn ValueNode>,
    expected: Option<&'g dyn ValueNode>,
}

impl<'g> DualValue<'g> {
    pub fn new(
        path: FieldPath,
        actual: Option<&'g dyn ValueNode>,
        expected: Option<&'g dyn ValueNode>,
    ) -> Self {
        Self {
            path,
            actual,
            expected,
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn actual(&self) -> Option<&'g dyn ValueNode> {
        self.actual
    }

    pub fn expected(&self) -> Option<&'g dyn ValueNode> {
        self.expected
    }

    /// Canonical dotted path string.
    pub fn concatenated_path(&self) -> &str {
        self.path.canonical()
    }

    /// Last path segment, or the empty string at the root.
    pub fn field_name(&self) -> &str {
        self.path.field_name()
    }

    pub fn actual_type(&self) -> Option<TypeIdentity> {
        self.actual.map(|value| value.type_identity())
    }

    pub fn expected_type(&self) -> Option<TypeIdentity> {
        self.expected.map(|value| value.type_identity())
    }

    /// True when the actual value is present and terminally typed; such
    /// nodes must always be compared with their intrinsic equality.
    pub fn is_terminal(&self) -> bool {
        self.actual
            .map(|value| value.type_identity().is_terminal())
            .unwrap_or(false)
    }

    /// Child dual value for `name`. The actual side must be readable; an
    /// unreadable expected-side field is folded into null, since absence is
    /// the best available signal and not fully distinguishable from a
    /// genuine null.
    pub fn for_field(&self, name: &str) -> Result<DualValue<'g>, FieldUnreadable> {
        let actual_parent = self.actual.ok_or_else(|| FieldUnreadable {
            type_name: "<absent>".to_string(),
            field: name.to_string(),
        })?;
        let actual_field = actual_parent.read_field(name)?;
        let expected_field = match self.expected {
            Some(expected) => expected.read_field(name).ok().flatten(),
            None => None,
        };
        Ok(DualValue::new(
            self.path.child(name),
            actual_field,
            expected_field,
        ))
    }
}

// Trait objects carry no Debug bound, so the derive is unavailable.
impl fmt::Debug for DualValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DualValue")
            .field("path", &self.path.canonical())
            .field("actual", &self.actual_type().map(|t| t.name))
            .field("expected", &self.expected_type().map(|t| t.name))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
