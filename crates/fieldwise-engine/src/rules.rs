//! The rule engine: build-then-freeze policy aggregate and the per-node
//! resolvers.
//!
//! All registration goes through [`RuleEngineBuilder`]; `build` freezes the
//! state into a [`RuleEngine`] that is immutable for the lifetime of the
//! comparisons it serves. Every resolver is a pure function of
//! `(RuleEngine, DualValue)` — referentially transparent, total over
//! well-formed dual values, and safe to re-query from concurrent
//! traversals sharing one engine.

use std::collections::BTreeSet;

use crate::comparator_registry::{FieldComparators, TypeComparators};
use crate::dual_value::DualValue;
use crate::field_path::FieldPath;
use crate::object_model::{FieldUnreadable, SharedComparator};
use crate::rule_tables::{compile_patterns, BypassRules, IgnoreRules, OrderRules, RuleError};
use crate::type_identity::TypeIdentity;

// ---------------------------------------------------------------------------
// RuleEngineBuilder — the only mutable surface
// ---------------------------------------------------------------------------

/// Mutable registration surface. Every registration call is additive:
/// it appends to the addressed rule table and never replaces it. The one
/// map-semantics exception: re-registering a comparator for an exact key
/// silently replaces the previous entry.
#[derive(Debug, Default)]
pub struct RuleEngineBuilder {
    strict_type_checking: bool,
    ignore: IgnoreRules,
    bypass: BypassRules,
    order: OrderRules,
    type_comparators: TypeComparators,
    field_comparators: FieldComparators,
}

impl RuleEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip every node whose actual value is null.
    pub fn ignore_all_actual_null_fields(mut self, ignore: bool) -> Self {
        self.ignore.ignore_all_actual_null_fields = ignore;
        self
    }

    /// Skip the given field paths.
    pub fn ignore_fields<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        self.ignore.fields.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Skip fields whose canonical path full-matches any of the given
    /// patterns. Fails fast on a malformed pattern; a failing call
    /// registers none of its patterns.
    pub fn ignore_fields_matching<I, S>(mut self, sources: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = compile_patterns(sources)?;
        self.ignore.field_patterns.extend(compiled);
        Ok(self)
    }

    /// Skip fields of the given exact types. Identities are normalized so
    /// a primitive spelling and its canonical form register as one type.
    pub fn ignore_fields_of_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = TypeIdentity>,
    {
        self.ignore
            .types
            .extend(types.into_iter().map(|identity| identity.normalized()));
        self
    }

    /// Force field-by-field recursion everywhere (except terminal types).
    pub fn ignore_all_overridden_equals(mut self) -> Self {
        self.bypass.ignore_all = true;
        self
    }

    /// Force field-by-field recursion at the given field paths.
    pub fn ignore_overridden_equals_for_fields<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        self.bypass.fields.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Force field-by-field recursion for values of the given exact types.
    pub fn ignore_overridden_equals_for_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = TypeIdentity>,
    {
        self.bypass.types.extend(types);
        self
    }

    /// Force field-by-field recursion for values whose fully-qualified
    /// type name full-matches any of the given patterns.
    pub fn ignore_overridden_equals_matching<I, S>(mut self, sources: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = compile_patterns(sources)?;
        self.bypass.type_name_patterns.extend(compiled);
        Ok(self)
    }

    /// Ignore sequence ordering everywhere.
    pub fn ignore_collection_order(mut self, ignore: bool) -> Self {
        self.order.ignore_all = ignore;
        self
    }

    /// Ignore sequence ordering at the given field paths.
    pub fn ignore_collection_order_in_fields<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        self.order.fields.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Ignore sequence ordering at fields whose canonical path
    /// full-matches any of the given patterns.
    pub fn ignore_collection_order_in_fields_matching<I, S>(
        mut self,
        sources: I,
    ) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = compile_patterns(sources)?;
        self.order.patterns.extend(compiled);
        Ok(self)
    }

    /// In strict mode a null actual value's type may be inferred from a
    /// non-null expected value for ignore-by-type evaluation.
    pub fn strict_type_checking(mut self, strict: bool) -> Self {
        self.strict_type_checking = strict;
        self
    }

    /// Register a comparator for an exact runtime type. Field comparators
    /// take precedence over comparators registered here.
    pub fn register_comparator_for_type(
        mut self,
        comparator: SharedComparator,
        identity: TypeIdentity,
    ) -> Self {
        self.type_comparators.register(identity, comparator);
        self
    }

    /// Register a comparator for an exact field path from the root.
    pub fn register_comparator_for_field(
        mut self,
        comparator: SharedComparator,
        path: impl Into<FieldPath>,
    ) -> Self {
        self.field_comparators.register(path.into(), comparator);
        self
    }

    /// Freeze the registered state into an immutable engine.
    pub fn build(self) -> RuleEngine {
        RuleEngine {
            strict_type_checking: self.strict_type_checking,
            ignore: self.ignore,
            bypass: self.bypass,
            order: self.order,
            type_comparators: self.type_comparators,
            field_comparators: self.field_comparators,
        }
    }
}

// ---------------------------------------------------------------------------
// RuleEngine — frozen policy aggregate and resolvers
// ---------------------------------------------------------------------------

/// Immutable policy aggregate consumed read-only by traversals. Safe to
/// share across threads; evaluation allocates only for path joins.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    strict_type_checking: bool,
    ignore: IgnoreRules,
    bypass: BypassRules,
    order: OrderRules,
    type_comparators: TypeComparators,
    field_comparators: FieldComparators,
}

impl RuleEngine {
    pub fn builder() -> RuleEngineBuilder {
        RuleEngineBuilder::new()
    }

    // -- Resolvers ---------------------------------------------------------

    /// Whether the node is excluded from the comparison entirely.
    pub fn should_ignore(&self, dual: &DualValue<'_>) -> bool {
        self.ignore.matches_path(dual.path()) || self.should_ignore_not_evaluating_name(dual)
    }

    /// Select the parent's field names that participate in the comparison.
    ///
    /// Two explicit passes: name-based criteria first, so fields excludable
    /// by path alone never have their values read, then value-based
    /// criteria on freshly built child dual values. Reading a field from
    /// the actual side must succeed (the candidate set is expected to come
    /// from the actual value's own field enumeration); an unreadable
    /// expected-side field is treated as null.
    pub fn select_field_names(
        &self,
        parent: &DualValue<'_>,
        candidates: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, FieldUnreadable> {
        if parent.actual().is_none() {
            return Ok(BTreeSet::new());
        }

        // pass 1: cheap, name-only
        let survivors: Vec<&String> = candidates
            .iter()
            .filter(|name| !self.ignore.matches_path(&parent.path().child(name)))
            .collect();

        // pass 2: expensive, value-based
        let mut selected = BTreeSet::new();
        for name in survivors {
            let child = parent.for_field(name)?;
            if self.should_ignore_not_evaluating_name(&child) {
                continue;
            }
            let field_name = child.field_name();
            if field_name.is_empty() {
                continue;
            }
            selected.insert(field_name.to_string());
        }
        Ok(selected)
    }

    /// Resolve the comparator for a node, if any. An exact-path entry in
    /// the field registry wins unconditionally over the type registry.
    pub fn comparator_for(&self, dual: &DualValue<'_>) -> Option<SharedComparator> {
        if let Some(comparator) = self.field_comparators.get(dual.path()) {
            return Some(comparator);
        }
        let identity = match (dual.actual_type(), dual.expected_type()) {
            (Some(identity), _) => identity,
            (None, Some(identity)) => identity,
            (None, None) => return None,
        };
        self.type_comparators.get(&identity)
    }

    /// Whether the node's type must bypass its own equality and be compared
    /// field-by-field instead.
    pub fn should_bypass_equals(&self, dual: &DualValue<'_>) -> bool {
        // terminal types keep their intrinsic equality, or the recursion
        // would descend into their internals forever
        if dual.is_terminal() {
            return false;
        }
        if self.bypass.ignore_all || self.bypass.matches_path(dual.path()) {
            return true;
        }
        match dual.actual_type() {
            Some(identity) => {
                self.bypass.matches_type_name(&identity.name) || self.bypass.matches_type(&identity)
            }
            None => false,
        }
    }

    /// Whether sequence ordering is ignored at this node. Never inspects
    /// values.
    pub fn should_ignore_order(&self, dual: &DualValue<'_>) -> bool {
        self.order.ignore_all || self.order.matches_path(dual.path())
    }

    // -- Introspection -----------------------------------------------------

    pub fn is_strict_type_checking(&self) -> bool {
        self.strict_type_checking
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }

    pub fn bypass_rules(&self) -> &BypassRules {
        &self.bypass
    }

    pub fn order_rules(&self) -> &OrderRules {
        &self.order
    }

    pub fn has_comparator_for_field(&self, path: &FieldPath) -> bool {
        self.field_comparators.contains(path)
    }

    pub fn has_comparator_for_type(&self, identity: &TypeIdentity) -> bool {
        self.type_comparators.contains(identity)
    }

    pub fn has_custom_comparators(&self) -> bool {
        !self.type_comparators.is_empty() || !self.field_comparators.is_empty()
    }

    /// Registered type comparators in identity order.
    pub fn comparators_by_type(&self) -> impl Iterator<Item = (&TypeIdentity, &SharedComparator)> {
        self.type_comparators.iter()
    }

    /// Registered field comparators in path order.
    pub fn comparators_by_field(&self) -> impl Iterator<Item = (&FieldPath, &SharedComparator)> {
        self.field_comparators.iter()
    }

    // -- Internal ----------------------------------------------------------

    /// Value-based ignore criteria: the null-fields flag and type ignores.
    /// Type determination: a present actual value decides; with actual
    /// absent, the expected value's type counts only under strict type
    /// checking. Otherwise the type is indeterminable and the node is not
    /// type-ignored — anything else would silently skip every null field
    /// of an ignored type without having verified the type.
    fn should_ignore_not_evaluating_name(&self, dual: &DualValue<'_>) -> bool {
        self.matches_ignored_null(dual) || self.matches_ignored_type(dual)
    }

    fn matches_ignored_null(&self, dual: &DualValue<'_>) -> bool {
        self.ignore.ignore_all_actual_null_fields && dual.actual().is_none()
    }

    fn matches_ignored_type(&self, dual: &DualValue<'_>) -> bool {
        if let Some(identity) = dual.actual_type() {
            return self.ignore.matches_type(&identity);
        }
        if self.strict_type_checking {
            if let Some(identity) = dual.expected_type() {
                return self.ignore.matches_type(&identity);
            }
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
