//! Runtime type identity and terminal-type classification.
//!
//! The traversal engine computes one `TypeIdentity` per visited value from
//! the host introspection layer; the rule engine relies only on exact
//! identity equality, the fully-qualified name (for regex rules), and the
//! terminal classification.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TypeKind — coarse classification driving the bypass invariant
// ---------------------------------------------------------------------------

/// Coarse classification of a runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Bool,
    Integer,
    Float,
    Char,
    Text,
    Temporal,
    Sequence,
    Map,
    Composite,
}

impl TypeKind {
    /// Terminal kinds carry intrinsic equality that must never be bypassed
    /// in favor of field-by-field recursion.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Integer | Self::Float | Self::Char | Self::Text | Self::Temporal
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Char => "char",
            Self::Text => "text",
            Self::Temporal => "temporal",
            Self::Sequence => "sequence",
            Self::Map => "map",
            Self::Composite => "composite",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TypeIdentity — exact runtime type of one value
// ---------------------------------------------------------------------------

/// Exact runtime type of a value: a classification kind plus the
/// fully-qualified type name reported by the host introspection layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeIdentity {
    pub kind: TypeKind,
    pub name: String,
}

impl TypeIdentity {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn boolean() -> Self {
        Self::new(TypeKind::Bool, "bool")
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Integer, name)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Float, name)
    }

    pub fn text() -> Self {
        Self::new(TypeKind::Text, "String")
    }

    pub fn temporal(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Temporal, name)
    }

    pub fn sequence(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Sequence, name)
    }

    pub fn map(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Map, name)
    }

    pub fn composite(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Composite, name)
    }

    /// Whether this type's own equality must always be trusted.
    pub const fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    /// Canonicalize primitive spellings so a registered type and an
    /// observed runtime type compare as one representation: reference
    /// sigils and `core::primitive::`/`std::primitive::` prefixes are
    /// stripped, and the borrowed/owned text spellings fold into `String`.
    pub fn normalized(&self) -> Self {
        let mut name = self.name.as_str();
        loop {
            if let Some(rest) = name.strip_prefix("&mut ") {
                name = rest;
            } else if let Some(rest) = name.strip_prefix('&') {
                name = rest;
            } else {
                break;
            }
        }
        let name = name
            .strip_prefix("core::primitive::")
            .or_else(|| name.strip_prefix("std::primitive::"))
            .unwrap_or(name);
        let name = match name {
            "str" | "alloc::string::String" | "std::string::String" => "String",
            other => other,
        };
        Self::new(self.kind, name)
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
