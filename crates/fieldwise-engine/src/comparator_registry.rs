//! Comparator registries: type-keyed and field-keyed custom comparators.
//!
//! Registration is a plain map insert: additive across calls, and the last
//! registration for an exact key silently replaces the previous one. The
//! field registry always outranks the type registry; that precedence lives
//! in the rule engine's resolver, not here.

use std::collections::BTreeMap;
use std::fmt;

use crate::field_path::FieldPath;
use crate::object_model::SharedComparator;
use crate::type_identity::TypeIdentity;

// ---------------------------------------------------------------------------
// TypeComparators — keyed by exact runtime type
// ---------------------------------------------------------------------------

/// Comparators keyed by exact runtime type. Identities are normalized on
/// registration and lookup so primitive spellings resolve to one entry.
#[derive(Clone, Default)]
pub struct TypeComparators {
    entries: BTreeMap<TypeIdentity, SharedComparator>,
}

impl TypeComparators {
    pub fn register(&mut self, identity: TypeIdentity, comparator: SharedComparator) {
        self.entries.insert(identity.normalized(), comparator);
    }

    pub fn get(&self, identity: &TypeIdentity) -> Option<SharedComparator> {
        self.entries.get(&identity.normalized()).cloned()
    }

    pub fn contains(&self, identity: &TypeIdentity) -> bool {
        self.entries.contains_key(&identity.normalized())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in identity order; gives renderers deterministic output.
    pub fn iter(&self) -> impl Iterator<Item = (&TypeIdentity, &SharedComparator)> {
        self.entries.iter()
    }
}

impl fmt::Debug for TypeComparators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeComparators")
            .field("types", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// FieldComparators — keyed by exact field path
// ---------------------------------------------------------------------------

/// Comparators keyed by exact field path from the root.
#[derive(Clone, Default)]
pub struct FieldComparators {
    entries: BTreeMap<FieldPath, SharedComparator>,
}

impl FieldComparators {
    pub fn register(&mut self, path: FieldPath, comparator: SharedComparator) {
        self.entries.insert(path, comparator);
    }

    pub fn get(&self, path: &FieldPath) -> Option<SharedComparator> {
        self.entries.get(path).cloned()
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in path order; gives renderers deterministic output.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &SharedComparator)> {
        self.entries.iter()
    }
}

impl fmt::Debug for FieldComparators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldComparators")
            .field("paths", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
