//! Human-readable rendering of a frozen rule engine's active policy.
//!
//! One bullet line per active rule family, in registration-table order;
//! inactive families render nothing. Output is deterministic: exact rules
//! list in canonical order and patterns in registration order.

use std::fmt;

use crate::rule_tables::FullMatchPattern;
use crate::rules::RuleEngine;

const INDENT_LEVEL_2: &str = "  -";

/// Multi-line report of every active rule, suitable for embedding in a
/// comparison failure message.
pub fn multi_line_description(engine: &RuleEngine) -> String {
    let mut out = String::new();
    describe_ignored_null_fields(engine, &mut out);
    describe_ignored_fields(engine, &mut out);
    describe_ignored_field_patterns(engine, &mut out);
    describe_ignored_types(engine, &mut out);
    describe_overridden_equals(engine, &mut out);
    describe_collection_order(engine, &mut out);
    describe_type_comparators(engine, &mut out);
    describe_field_comparators(engine, &mut out);
    describe_type_checking(engine, &mut out);
    out
}

impl fmt::Display for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&multi_line_description(self))
    }
}

fn describe_ignored_null_fields(engine: &RuleEngine, out: &mut String) {
    if engine.ignore_rules().ignore_all_actual_null_fields() {
        out.push_str("- all actual null fields were ignored in the comparison\n");
    }
}

fn describe_ignored_fields(engine: &RuleEngine, out: &mut String) {
    let fields = engine.ignore_rules().fields();
    if !fields.is_empty() {
        let listed: Vec<&str> = fields.iter().map(|path| path.canonical()).collect();
        out.push_str(&format!(
            "- the following fields were ignored in the comparison: {}\n",
            listed.join(", ")
        ));
    }
}

fn describe_ignored_field_patterns(engine: &RuleEngine, out: &mut String) {
    let patterns = engine.ignore_rules().field_patterns();
    if !patterns.is_empty() {
        out.push_str(&format!(
            "- the fields matching the following regexes were ignored in the comparison: {}\n",
            pattern_sources(patterns)
        ));
    }
}

fn describe_ignored_types(engine: &RuleEngine, out: &mut String) {
    let types = engine.ignore_rules().types();
    if !types.is_empty() {
        let listed: Vec<&str> = types.iter().map(|identity| identity.name.as_str()).collect();
        out.push_str(&format!(
            "- the following types were ignored in the comparison: {}\n",
            listed.join(", ")
        ));
    }
}

fn describe_overridden_equals(engine: &RuleEngine, out: &mut String) {
    let bypass = engine.bypass_rules();
    let has_selective_rules = !bypass.fields().is_empty()
        || !bypass.types().is_empty()
        || !bypass.type_name_patterns().is_empty();
    let header = if bypass.ignore_all() {
        "- no overridden equality was used in the comparison except for terminal types"
    } else {
        "- overridden equality was used in the comparison"
    };
    out.push_str(header);
    if !has_selective_rules {
        out.push('\n');
        return;
    }
    out.push_str(if bypass.ignore_all() {
        " and:\n"
    } else {
        ", except for:\n"
    });
    if !bypass.fields().is_empty() {
        let listed: Vec<&str> = bypass.fields().iter().map(|path| path.canonical()).collect();
        out.push_str(&format!(
            "{INDENT_LEVEL_2} the following fields: {}\n",
            listed.join(", ")
        ));
    }
    if !bypass.types().is_empty() {
        let listed: Vec<&str> = bypass
            .types()
            .iter()
            .map(|identity| identity.name.as_str())
            .collect();
        out.push_str(&format!(
            "{INDENT_LEVEL_2} the following types: {}\n",
            listed.join(", ")
        ));
    }
    if !bypass.type_name_patterns().is_empty() {
        out.push_str(&format!(
            "{INDENT_LEVEL_2} the types matching the following regexes: {}\n",
            pattern_sources(bypass.type_name_patterns())
        ));
    }
}

fn describe_collection_order(engine: &RuleEngine, out: &mut String) {
    let order = engine.order_rules();
    if order.ignore_all() {
        out.push_str("- collection order was ignored in all fields in the comparison\n");
    }
    if !order.fields().is_empty() {
        let listed: Vec<&str> = order.fields().iter().map(|path| path.canonical()).collect();
        out.push_str(&format!(
            "- collection order was ignored in the following fields in the comparison: {}\n",
            listed.join(", ")
        ));
    }
    if !order.patterns().is_empty() {
        out.push_str(&format!(
            "- collection order was ignored in the fields matching the following regexes in the comparison: {}\n",
            pattern_sources(order.patterns())
        ));
    }
}

fn describe_type_comparators(engine: &RuleEngine, out: &mut String) {
    let mut entries = engine.comparators_by_type().peekable();
    if entries.peek().is_none() {
        return;
    }
    out.push_str("- these types were compared with the following comparators:\n");
    for (identity, comparator) in entries {
        out.push_str(&format!(
            "{INDENT_LEVEL_2} {} -> {}\n",
            identity.name,
            comparator.describe()
        ));
    }
}

fn describe_field_comparators(engine: &RuleEngine, out: &mut String) {
    let mut entries = engine.comparators_by_field().peekable();
    if entries.peek().is_none() {
        return;
    }
    out.push_str("- these fields were compared with the following comparators:\n");
    for (path, comparator) in entries {
        out.push_str(&format!(
            "{INDENT_LEVEL_2} {} -> {}\n",
            path.canonical(),
            comparator.describe()
        ));
    }
    if engine.comparators_by_type().next().is_some() {
        out.push_str("- field comparators take precedence over type comparators\n");
    }
}

fn describe_type_checking(engine: &RuleEngine, out: &mut String) {
    if engine.is_strict_type_checking() {
        out.push_str(
            "- actual and expected values were considered different when their types were incompatible, even if all their fields matched\n",
        );
    } else {
        out.push_str(
            "- actual and expected values were compared field by field recursively even when their types differed\n",
        );
    }
}

fn pattern_sources(patterns: &[FullMatchPattern]) -> String {
    let listed: Vec<&str> = patterns.iter().map(FullMatchPattern::source).collect();
    listed.join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
