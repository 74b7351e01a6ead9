use crate::{str_at, UNKNOWN_CREATOR};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client-facing projection of a detection rule.
///
/// Missing fields become empty strings (or `Unknown` for the creator) so a
/// sparse rule never fails the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummaryRow {
    pub name: String,
    pub rule_id: String,
    pub created_by: String,
    pub updated_at: String,
    /// `None` is written as an empty cell.
    pub enabled: Option<bool>,
    pub severity: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    /// Tags joined with `", "`.
    pub tags: String,
    pub last_execution: String,
}

impl RuleSummaryRow {
    pub fn from_record(rule: &Value) -> Self {
        let text = |pointer: &str| str_at(rule, pointer).unwrap_or_default().to_string();

        Self {
            name: text("/name"),
            rule_id: text("/rule_id"),
            created_by: str_at(rule, "/created_by").unwrap_or(UNKNOWN_CREATOR).to_string(),
            updated_at: text("/updated_at"),
            enabled: rule.get("enabled").and_then(Value::as_bool),
            severity: text("/severity"),
            rule_type: text("/type"),
            tags: join_tags(rule.get("tags")),
            last_execution: text("/execution_summary/last_execution/date"),
        }
    }
}

fn join_tags(tags: Option<&Value>) -> String {
    let Some(Value::Array(tags)) = tags else {
        return String::new();
    };
    tags.iter()
        .map(|tag| match tag {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// One summary row per rule, order preserved.
pub fn project_rule_summary(rules: &[Value]) -> Vec<RuleSummaryRow> {
    rules.iter().map(RuleSummaryRow::from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn full_rule_projection() {
        let rule = json!({
            "id": "8f0c",
            "rule_id": "brute-force-ssh",
            "name": "SSH brute force",
            "created_by": "elastic",
            "updated_at": "2024-03-01T10:00:00.000Z",
            "enabled": true,
            "severity": "high",
            "type": "threshold",
            "tags": ["Linux", "Credential Access"],
            "execution_summary": {
                "last_execution": {"date": "2024-03-02T08:15:00.000Z", "status": "succeeded"}
            }
        });

        assert_eq!(
            RuleSummaryRow::from_record(&rule),
            RuleSummaryRow {
                name: "SSH brute force".to_string(),
                rule_id: "brute-force-ssh".to_string(),
                created_by: "elastic".to_string(),
                updated_at: "2024-03-01T10:00:00.000Z".to_string(),
                enabled: Some(true),
                severity: "high".to_string(),
                rule_type: "threshold".to_string(),
                tags: "Linux, Credential Access".to_string(),
                last_execution: "2024-03-02T08:15:00.000Z".to_string(),
            }
        );
    }

    #[test]
    fn sparse_rule_uses_defaults() {
        let row = RuleSummaryRow::from_record(&json!({"name": "bare"}));
        assert_eq!(row.name, "bare");
        assert_eq!(row.created_by, "Unknown");
        assert_eq!(row.enabled, None);
        assert_eq!(row.tags, "");
        assert_eq!(row.last_execution, "");
    }

    #[test]
    fn empty_tag_list_is_empty_string() {
        let row = RuleSummaryRow::from_record(&json!({"tags": []}));
        assert_eq!(row.tags, "");
    }

    #[test]
    fn serialized_columns_use_type_key() {
        let row = RuleSummaryRow::from_record(&json!({"type": "query"}));
        let value = serde_json::to_value(&row).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "name",
                "rule_id",
                "created_by",
                "updated_at",
                "enabled",
                "severity",
                "type",
                "tags",
                "last_execution"
            ]
        );
    }
}
