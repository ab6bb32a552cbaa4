#![forbid(unsafe_code)]
//! Rule-resolution engine for recursive field-by-field structural
//! comparison.
//!
//! Given one traversal node at a time — a [`DualValue`]: a path plus the
//! actual-side and expected-side values found there — a frozen
//! [`RuleEngine`] answers the policy questions the traversal engine needs
//! before recursing or comparing:
//!
//! - should the node be skipped entirely ([`RuleEngine::should_ignore`]),
//! - should the node's type bypass its own equality and be compared
//!   field-by-field ([`RuleEngine::should_bypass_equals`]),
//! - should ordering be ignored for sequence nodes
//!   ([`RuleEngine::should_ignore_order`]),
//! - which custom comparator applies, if any
//!   ([`RuleEngine::comparator_for`]),
//!
//! plus the two-phase field selection that avoids reading values for
//! fields already excludable by name ([`RuleEngine::select_field_names`]).
//!
//! The engine decides policy only: it never walks graphs, computes
//! equality, or produces diffs. Policy state follows a build-then-freeze
//! lifecycle — all registration goes through [`RuleEngineBuilder`], and the
//! frozen engine is pure to query and safe to share across concurrent
//! traversals.
//!
//! # Example
//!
//! ```
//! use fieldwise_engine::{DualValue, FieldPath, RuleEngine, Value};
//!
//! let engine = RuleEngine::builder()
//!     .ignore_fields(["address.zip"])
//!     .ignore_collection_order_in_fields(["tags"])
//!     .build();
//!
//! let zip = Value::text("99701");
//! let node = DualValue::new(FieldPath::from_dotted("address.zip"), Some(&zip), Some(&zip));
//! assert!(engine.should_ignore(&node));
//!
//! let tags = Value::seq([Value::text("a"), Value::text("b")]);
//! let node = DualValue::new(FieldPath::from_dotted("tags"), Some(&tags), Some(&tags));
//! assert!(engine.should_ignore_order(&node));
//! ```

pub mod comparator_registry;
pub mod describe;
pub mod dual_value;
pub mod field_path;
pub mod object_model;
pub mod rule_tables;
pub mod rules;
pub mod type_identity;

pub use comparator_registry::{FieldComparators, TypeComparators};
pub use describe::multi_line_description;
pub use dual_value::DualValue;
pub use field_path::FieldPath;
pub use object_model::{
    Comparator, FieldUnreadable, Record, SharedComparator, Value, ValueNode,
};
pub use rule_tables::{BypassRules, FullMatchPattern, IgnoreRules, OrderRules, RuleError};
pub use rules::{RuleEngine, RuleEngineBuilder};
pub use type_identity::{TypeIdentity, TypeKind};
