//! Property-based tests for the row shaper.
//!
//! - dashboards(P) is exactly the `type == "dashboard"` subsequence
//! - summary projections preserve length and order
//! - flattening never loses a leaf

use kbexport_shape::{
    filter_dashboards, flatten_record, project_dashboard_summary, project_rule_summary,
    MalformedPolicy,
};
use proptest::prelude::*;
use serde_json::{json, Value};

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn object_type_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["dashboard", "visualization", "search", "index-pattern", "lens"])
}

fn title_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ]{0,24}").unwrap()
}

fn saved_object_strategy() -> impl Strategy<Value = Value> {
    (object_type_strategy(), title_strategy(), 0usize..6).prop_map(|(kind, title, refs)| {
        let references: Vec<Value> = (0..refs).map(|i| json!({"id": format!("ref-{i}")})).collect();
        json!({
            "id": format!("{kind}-{title}"),
            "type": kind,
            "attributes": {"title": title},
            "references": references,
        })
    })
}

fn saved_objects_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(saved_object_strategy(), 0..40)
}

fn rules_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(rule_strategy(), 0..40)
}

fn rule_strategy() -> impl Strategy<Value = Value> {
    (title_strategy(), any::<bool>(), prop::collection::vec(title_strategy(), 0..4)).prop_map(
        |(name, enabled, tags)| json!({"name": name, "enabled": enabled, "tags": tags}),
    )
}

// =============================================================================
// DASHBOARD PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn dashboards_count_matches_type_count(objects in saved_objects_strategy()) {
        let expected = objects.iter().filter(|o| o["type"] == "dashboard").count();
        let dashboards = filter_dashboards(&objects, MalformedPolicy::Fail).unwrap();
        prop_assert_eq!(dashboards.len(), expected);
    }

    #[test]
    fn dashboards_preserve_relative_order(objects in saved_objects_strategy()) {
        let expected: Vec<&Value> = objects.iter().filter(|o| o["type"] == "dashboard").collect();
        let dashboards = filter_dashboards(&objects, MalformedPolicy::Skip).unwrap();
        prop_assert_eq!(dashboards.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn dashboard_summary_is_length_and_order_preserving(objects in saved_objects_strategy()) {
        let rows = project_dashboard_summary(&objects);
        prop_assert_eq!(rows.len(), objects.len());
        for (row, record) in rows.iter().zip(&objects) {
            prop_assert_eq!(row.name.as_str(), record["attributes"]["title"].as_str().unwrap());
            let references = record["references"].as_array().unwrap().len();
            prop_assert_eq!(row.visualization_count, references);
        }
    }

    // =========================================================================
    // RULE PROPERTIES
    // =========================================================================

    #[test]
    fn rule_summary_is_length_and_order_preserving(rules in rules_strategy()) {
        let rows = project_rule_summary(&rules);
        prop_assert_eq!(rows.len(), rules.len());
        for (row, rule) in rows.iter().zip(&rules) {
            prop_assert_eq!(row.name.as_str(), rule["name"].as_str().unwrap());
            prop_assert_eq!(row.enabled, rule["enabled"].as_bool());
        }
    }

    // =========================================================================
    // FLATTEN PROPERTIES
    // =========================================================================

    #[test]
    fn flatten_keeps_every_top_level_scalar(object in saved_object_strategy()) {
        let flat = flatten_record(&object);
        let id = flat.iter().find(|(k, _)| k == "id").map(|(_, v)| v.clone());
        prop_assert_eq!(id, Some(object["id"].clone()));
        let title = flat.iter().find(|(k, _)| k == "attributes.title").map(|(_, v)| v.clone());
        prop_assert_eq!(title, Some(object["attributes"]["title"].clone()));
    }
}
