//! Field paths: ordered segment sequences locating a node from the root.
//!
//! A path's canonical form joins its segments with `.` and is computed once
//! at construction. Equality, ordering, and hashing are all defined on the
//! canonical form, which is what makes paths usable as ordered set/map keys
//! in the rule tables and gives regex rules a single string to match.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Location of a field relative to the root of the compared graphs.
///
/// The root is the empty path: its canonical form and its field name are
/// both the empty string.
#[derive(Debug, Clone)]
pub struct FieldPath {
    segments: Vec<String>,
    dotted: String,
}

impl FieldPath {
    /// The root path (empty segment sequence).
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
            dotted: String::new(),
        }
    }

    /// Build a path from individual segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let dotted = segments.join(".");
        Self { segments, dotted }
    }

    /// Parse a dotted path such as `address.zip`. The empty string parses
    /// to the root path.
    pub fn from_dotted(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        Self::new(path.split('.'))
    }

    /// The path of `name` appended to this path.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self::new(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Canonical dotted form; the single representation all exact and regex
    /// rules match against.
    pub fn canonical(&self) -> &str {
        &self.dotted
    }

    /// Last segment, or the empty string for the root.
    pub fn field_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl PartialEq for FieldPath {
    fn eq(&self, other: &Self) -> bool {
        self.dotted == other.dotted
    }
}

impl Eq for FieldPath {}

impl PartialOrd for FieldPath {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldPath {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dotted.cmp(&other.dotted)
    }
}

impl Hash for FieldPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dotted.hash(state);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted)
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::from_dotted(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self::from_dotted(&path)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.dotted)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathVisitor;

        impl Visitor<'_> for PathVisitor {
            type Value = FieldPath;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a dotted field path string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<FieldPath, E> {
                Ok(FieldPath::from_dotted(value))
            }
        }

        deserializer.deserialize_str(PathVisitor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
