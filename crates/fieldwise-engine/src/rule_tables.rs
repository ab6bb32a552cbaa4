//! Compiled rule tables: the policy state consulted per traversal node.
//!
//! Three independent tables cover the skip, equality-bypass, and
//! collection-order questions. Patterns are compiled once at registration
//! and matched full-string at query time; exact rules are ordered-set
//! lookups on canonical path form or normalized type identity.

use std::collections::BTreeSet;

use regex::Regex;
use thiserror::Error;

use crate::field_path::FieldPath;
use crate::type_identity::TypeIdentity;

// ---------------------------------------------------------------------------
// RuleError — registration-time failures
// ---------------------------------------------------------------------------

/// Registration-time failure. Evaluation itself never fails.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule pattern that does not compile; raised at registration so a
    /// bad pattern cannot surface mid-traversal.
    #[error("invalid rule pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

// ---------------------------------------------------------------------------
// FullMatchPattern — anchored compiled pattern
// ---------------------------------------------------------------------------

/// A compiled pattern that only accepts a full-string match. The original
/// source is retained for rendering.
#[derive(Debug, Clone)]
pub struct FullMatchPattern {
    source: String,
    regex: Regex,
}

impl FullMatchPattern {
    pub fn compile(source: &str) -> Result<Self, RuleError> {
        let regex =
            Regex::new(&format!("^(?:{source})$")).map_err(|error| RuleError::InvalidPattern {
                pattern: source.to_string(),
                source: error,
            })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_full_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Compile a batch of pattern sources; a single bad source fails the whole
/// batch so a failed registration call registers nothing.
pub(crate) fn compile_patterns<I, S>(sources: I) -> Result<Vec<FullMatchPattern>, RuleError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    sources
        .into_iter()
        .map(|source| FullMatchPattern::compile(source.as_ref()))
        .collect()
}

// ---------------------------------------------------------------------------
// IgnoreRules — which nodes are skipped entirely
// ---------------------------------------------------------------------------

/// Rules deciding whether a node is excluded from the comparison.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    pub(crate) ignore_all_actual_null_fields: bool,
    pub(crate) fields: BTreeSet<FieldPath>,
    pub(crate) field_patterns: Vec<FullMatchPattern>,
    pub(crate) types: BTreeSet<TypeIdentity>,
}

impl IgnoreRules {
    pub fn ignore_all_actual_null_fields(&self) -> bool {
        self.ignore_all_actual_null_fields
    }

    pub fn fields(&self) -> &BTreeSet<FieldPath> {
        &self.fields
    }

    pub fn field_patterns(&self) -> &[FullMatchPattern] {
        &self.field_patterns
    }

    pub fn types(&self) -> &BTreeSet<TypeIdentity> {
        &self.types
    }

    /// Name-only criterion: exact path match or pattern full-match on the
    /// canonical form. Requires no value inspection.
    pub fn matches_path(&self, path: &FieldPath) -> bool {
        self.fields.contains(path)
            || self
                .field_patterns
                .iter()
                .any(|pattern| pattern.is_full_match(path.canonical()))
    }

    /// Whether the normalized identity is a registered ignore-type.
    pub fn matches_type(&self, identity: &TypeIdentity) -> bool {
        self.types.contains(&identity.normalized())
    }
}

// ---------------------------------------------------------------------------
// BypassRules — forcing field-by-field recursion over a type's own equality
// ---------------------------------------------------------------------------

/// Rules deciding whether a node's type must bypass its own equality and be
/// compared field-by-field instead.
#[derive(Debug, Clone, Default)]
pub struct BypassRules {
    pub(crate) ignore_all: bool,
    pub(crate) fields: BTreeSet<FieldPath>,
    pub(crate) types: BTreeSet<TypeIdentity>,
    pub(crate) type_name_patterns: Vec<FullMatchPattern>,
}

impl BypassRules {
    pub fn ignore_all(&self) -> bool {
        self.ignore_all
    }

    pub fn fields(&self) -> &BTreeSet<FieldPath> {
        &self.fields
    }

    pub fn types(&self) -> &BTreeSet<TypeIdentity> {
        &self.types
    }

    pub fn type_name_patterns(&self) -> &[FullMatchPattern] {
        &self.type_name_patterns
    }

    pub fn matches_path(&self, path: &FieldPath) -> bool {
        self.fields.contains(path)
    }

    /// Pattern match on a fully-qualified type name. Applies to the exact
    /// declared type only; no supertype or subtype propagation.
    pub fn matches_type_name(&self, type_name: &str) -> bool {
        self.type_name_patterns
            .iter()
            .any(|pattern| pattern.is_full_match(type_name))
    }

    /// Exact identity membership; registered types do not extend to
    /// subclasses or supertypes.
    pub fn matches_type(&self, identity: &TypeIdentity) -> bool {
        self.types.contains(identity)
    }
}

// ---------------------------------------------------------------------------
// OrderRules — relaxing sequence ordering
// ---------------------------------------------------------------------------

/// Rules deciding whether sequence ordering is ignored at a node. Purely
/// name-based; values are never inspected.
#[derive(Debug, Clone, Default)]
pub struct OrderRules {
    pub(crate) ignore_all: bool,
    pub(crate) fields: BTreeSet<FieldPath>,
    pub(crate) patterns: Vec<FullMatchPattern>,
}

impl OrderRules {
    pub fn ignore_all(&self) -> bool {
        self.ignore_all
    }

    pub fn fields(&self) -> &BTreeSet<FieldPath> {
        &self.fields
    }

    pub fn patterns(&self) -> &[FullMatchPattern] {
        &self.patterns
    }

    pub fn matches_path(&self, path: &FieldPath) -> bool {
        self.fields.contains(path)
            || self
                .patterns
                .iter()
                .any(|pattern| pattern.is_full_match(path.canonical()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
