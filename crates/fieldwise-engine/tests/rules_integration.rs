#![forbid(unsafe_code)]
//! Integration tests for the `rules` module.
//!
//! Exercises the build-then-freeze lifecycle, the five resolvers against
//! realistic object graphs, comparator precedence, configuration
//! rendering, serde round-trips, and concurrent sharing from outside the
//! crate boundary.

use std::cmp::Ordering;
use std::sync::Arc;

use fieldwise_engine::{
    Comparator, DualValue, FieldPath, Record, RuleEngine, TypeIdentity, Value, ValueNode,
};

// ===========================================================================
// Helpers
// ===========================================================================

fn person(zip: &str, city: &str) -> Value {
    Record::new("crate::model::Person")
        .field("name", Value::text("Ada"))
        .field(
            "address",
            Record::new("crate::model::Address")
                .field("zip", Value::text(zip))
                .field("city", Value::text(city))
                .into(),
        )
        .field(
            "tags",
            Value::seq([Value::text("a"), Value::text("b"), Value::text("c")]),
        )
        .into()
}

fn dual_at<'g>(path: &str, actual: &'g Value, expected: &'g Value) -> DualValue<'g> {
    DualValue::new(FieldPath::from_dotted(path), Some(actual), Some(expected))
}

struct EpsilonComparator {
    epsilon: f64,
}

impl Comparator for EpsilonComparator {
    fn compare(&self, actual: &dyn ValueNode, expected: &dyn ValueNode) -> Ordering {
        let actual = actual.as_any().downcast_ref::<Value>();
        let expected = expected.as_any().downcast_ref::<Value>();
        match (actual, expected) {
            (Some(Value::Float(a)), Some(Value::Float(e))) => {
                if (a - e).abs() <= self.epsilon {
                    Ordering::Equal
                } else {
                    a.partial_cmp(e).unwrap_or(Ordering::Greater)
                }
            }
            _ => Ordering::Greater,
        }
    }

    fn describe(&self) -> &str {
        "epsilon comparator"
    }
}

struct Labeled(&'static str);

impl Comparator for Labeled {
    fn compare(&self, _actual: &dyn ValueNode, _expected: &dyn ValueNode) -> Ordering {
        Ordering::Equal
    }

    fn describe(&self) -> &str {
        self.0
    }
}

// ===========================================================================
// Ignore scenarios
// ===========================================================================

#[test]
fn objects_differing_only_in_ignored_field() {
    let engine = RuleEngine::builder().ignore_fields(["address.zip"]).build();
    let actual = person("12345", "Fairbanks");
    let expected = person("99701", "Fairbanks");

    let actual_address = actual.read_field("address").unwrap().unwrap();
    let expected_address = expected.read_field("address").unwrap().unwrap();
    let zip = DualValue::new(
        FieldPath::from_dotted("address.zip"),
        actual_address.read_field("zip").unwrap(),
        expected_address.read_field("zip").unwrap(),
    );
    let city = DualValue::new(
        FieldPath::from_dotted("address.city"),
        actual_address.read_field("city").unwrap(),
        expected_address.read_field("city").unwrap(),
    );

    assert!(engine.should_ignore(&zip));
    assert!(!engine.should_ignore(&city));
}

#[test]
fn regex_and_exact_rules_agree_on_overlap() {
    let both = RuleEngine::builder()
        .ignore_fields(["a.b"])
        .ignore_fields_matching(["a\\..*"])
        .expect("valid pattern")
        .build();
    let exact_only = RuleEngine::builder().ignore_fields(["a.b"]).build();
    let regex_only = RuleEngine::builder()
        .ignore_fields_matching(["a\\..*"])
        .expect("valid pattern")
        .build();

    let value = Value::Int(1);
    let dual = DualValue::new(FieldPath::from_dotted("a.b"), Some(&value), Some(&value));
    assert!(both.should_ignore(&dual));
    assert_eq!(both.should_ignore(&dual), exact_only.should_ignore(&dual));
    assert_eq!(both.should_ignore(&dual), regex_only.should_ignore(&dual));
}

#[test]
fn null_safe_type_ignore_requires_strict_mode() {
    let lenient = RuleEngine::builder()
        .ignore_fields_of_types([TypeIdentity::text()])
        .build();
    let strict = RuleEngine::builder()
        .ignore_fields_of_types([TypeIdentity::text()])
        .strict_type_checking(true)
        .build();
    let expected = Value::text("present");
    let dual = DualValue::new(FieldPath::from_dotted("note"), None, Some(&expected));

    assert!(!lenient.should_ignore(&dual));
    assert!(strict.should_ignore(&dual));
}

#[test]
fn null_actual_ignored_by_null_flag_regardless_of_type_rules() {
    let engine = RuleEngine::builder()
        .ignore_all_actual_null_fields(true)
        .build();
    let expected = Value::text("present");
    let dual = DualValue::new(FieldPath::from_dotted("note"), None, Some(&expected));
    assert!(engine.should_ignore(&dual));
}

// ===========================================================================
// Collection order scenarios
// ===========================================================================

#[test]
fn reordered_tags_are_order_ignored_by_field_rule() {
    let engine = RuleEngine::builder()
        .ignore_collection_order_in_fields(["tags"])
        .build();
    let actual = Value::seq([Value::text("a"), Value::text("b"), Value::text("c")]);
    let expected = Value::seq([Value::text("c"), Value::text("b"), Value::text("a")]);

    let tags = DualValue::new(
        FieldPath::from_dotted("tags"),
        Some(&actual),
        Some(&expected),
    );
    let other = DualValue::new(
        FieldPath::from_dotted("aliases"),
        Some(&actual),
        Some(&expected),
    );
    assert!(engine.should_ignore_order(&tags));
    assert!(!engine.should_ignore_order(&other));
}

#[test]
fn global_order_flag_covers_every_path() {
    let engine = RuleEngine::builder().ignore_collection_order(true).build();
    let seq = Value::seq([Value::Int(1)]);
    for path in ["tags", "deep.nested.items", ""] {
        let dual = DualValue::new(FieldPath::from_dotted(path), Some(&seq), Some(&seq));
        assert!(engine.should_ignore_order(&dual), "path `{path}`");
    }
}

// ===========================================================================
// Comparator resolution
// ===========================================================================

#[test]
fn epsilon_comparator_resolves_for_float_leaf() {
    let engine = RuleEngine::builder()
        .register_comparator_for_type(
            Arc::new(EpsilonComparator { epsilon: 1e-6 }),
            TypeIdentity::float("f64"),
        )
        .build();
    let actual = Value::Float(0.1 + 0.2);
    let expected = Value::Float(0.3);
    let dual = dual_at("ratio", &actual, &expected);

    let comparator = engine.comparator_for(&dual).expect("type comparator");
    assert_eq!(comparator.describe(), "epsilon comparator");
    assert_eq!(comparator.compare(&actual, &expected), Ordering::Equal);
}

#[test]
fn field_comparator_wins_over_type_comparator() {
    let engine = RuleEngine::builder()
        .register_comparator_for_type(
            Arc::new(EpsilonComparator { epsilon: 1e-6 }),
            TypeIdentity::float("f64"),
        )
        .register_comparator_for_field(Arc::new(Labeled("exact height")), "height")
        .build();
    let value = Value::Float(1.82);
    let dual = dual_at("height", &value, &value);
    assert_eq!(
        engine.comparator_for(&dual).expect("resolved").describe(),
        "exact height"
    );

    // a float leaf at another path still resolves through the type registry
    let other = dual_at("weight", &value, &value);
    assert_eq!(
        engine.comparator_for(&other).expect("resolved").describe(),
        "epsilon comparator"
    );
}

#[test]
fn comparator_absent_for_unregistered_type_and_path() {
    let engine = RuleEngine::builder()
        .register_comparator_for_type(Arc::new(Labeled("texts")), TypeIdentity::text())
        .build();
    let number = Value::Int(5);
    assert!(engine.comparator_for(&dual_at("count", &number, &number)).is_none());
}

// ===========================================================================
// Equality bypass
// ===========================================================================

#[test]
fn terminal_values_never_bypass_even_with_global_flag() {
    let engine = RuleEngine::builder()
        .ignore_all_overridden_equals()
        .ignore_overridden_equals_matching([".*"])
        .expect("valid pattern")
        .build();
    let text = Value::text("s");
    let int = Value::Int(42);
    let boolean = Value::Bool(true);
    let stamp = Value::Timestamp(1_700_000_000);
    for value in [&text, &int, &boolean, &stamp] {
        let dual = DualValue::new(FieldPath::from_dotted("leaf"), Some(value as &dyn ValueNode), None);
        assert!(!engine.should_bypass_equals(&dual));
    }
}

#[test]
fn composite_values_bypass_under_global_flag() {
    let engine = RuleEngine::builder().ignore_all_overridden_equals().build();
    let record = person("1", "x");
    let dual = DualValue::new(FieldPath::root(), Some(&record), Some(&record));
    assert!(engine.should_bypass_equals(&dual));
}

#[test]
fn bypass_rules_do_not_propagate_to_other_types() {
    let engine = RuleEngine::builder()
        .ignore_overridden_equals_for_types([TypeIdentity::composite("crate::model::Person")])
        .build();
    let person: Value = Record::new("crate::model::Person").into();
    let employee: Value = Record::new("crate::model::Employee").into();
    let person_dual = DualValue::new(FieldPath::from_dotted("p"), Some(&person), None);
    let employee_dual = DualValue::new(FieldPath::from_dotted("p"), Some(&employee), None);
    assert!(engine.should_bypass_equals(&person_dual));
    assert!(!engine.should_bypass_equals(&employee_dual));
}

// ===========================================================================
// Registration semantics
// ===========================================================================

#[test]
fn batched_and_incremental_registration_agree() {
    let one_call = RuleEngine::builder().ignore_fields(["z", "x", "y"]).build();
    let split_calls = RuleEngine::builder()
        .ignore_fields(["x", "y"])
        .ignore_fields(["z"])
        .build();
    assert_eq!(
        one_call.ignore_rules().fields(),
        split_calls.ignore_rules().fields()
    );

    let value = Value::Int(1);
    for path in ["x", "y", "z", "w"] {
        let dual = DualValue::new(FieldPath::from_dotted(path), Some(&value), Some(&value));
        assert_eq!(
            one_call.should_ignore(&dual),
            split_calls.should_ignore(&dual),
            "path `{path}`"
        );
    }
}

#[test]
fn failed_pattern_registration_reports_the_offending_source() {
    let err = RuleEngine::builder()
        .ignore_fields_matching(["fine", "broken("])
        .expect_err("malformed pattern");
    assert!(err.to_string().contains("broken("));
}

// ===========================================================================
// Rendering
// ===========================================================================

#[test]
fn rendered_description_covers_active_rule_families() {
    let engine = RuleEngine::builder()
        .ignore_all_actual_null_fields(true)
        .ignore_fields(["address.zip"])
        .ignore_collection_order_in_fields(["tags"])
        .register_comparator_for_type(
            Arc::new(EpsilonComparator { epsilon: 1e-9 }),
            TypeIdentity::float("f64"),
        )
        .strict_type_checking(true)
        .build();
    let report = engine.to_string();
    assert!(report.contains("all actual null fields were ignored"));
    assert!(report.contains("address.zip"));
    assert!(report.contains("collection order was ignored in the following fields"));
    assert!(report.contains("f64 -> epsilon comparator"));
    assert!(report.contains("incompatible"));
}

// ===========================================================================
// Serde round-trips
// ===========================================================================

#[test]
fn field_path_and_type_identity_round_trip_as_json() {
    let path = FieldPath::from_dotted("account.owner.id");
    let json = serde_json::to_string(&path).expect("serialize");
    let restored: FieldPath = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, path);

    let identity = TypeIdentity::composite("crate::model::Order");
    let json = serde_json::to_string(&identity).expect("serialize");
    let restored: TypeIdentity = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, identity);
}

// ===========================================================================
// Concurrent sharing
// ===========================================================================

#[test]
fn one_frozen_engine_serves_parallel_traversals() {
    let engine = Arc::new(
        RuleEngine::builder()
            .ignore_fields(["skip.me"])
            .ignore_collection_order(true)
            .build(),
    );
    std::thread::scope(|scope| {
        for _ in 0..4 {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for _ in 0..100 {
                    let value = Value::Int(1);
                    let skipped =
                        DualValue::new(FieldPath::from_dotted("skip.me"), Some(&value), None);
                    let kept =
                        DualValue::new(FieldPath::from_dotted("keep.me"), Some(&value), None);
                    assert!(engine.should_ignore(&skipped));
                    assert!(!engine.should_ignore(&kept));
                    assert!(engine.should_ignore_order(&kept));
                }
            });
        }
    });
}
