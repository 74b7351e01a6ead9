//! Environment retagging of exported saved objects.
//!
//! Index patterns such as `logs-*` are rewritten to `dev:logs-*` so a feed
//! exported from one cluster can be imported into a cross-cluster setup
//! where each environment is a remote cluster alias.

use serde_json::Value;
use std::fmt;

/// Target environment a feed is retagged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Dev,
    Test,
    Sim,
    Live,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Dev,
        Environment::Test,
        Environment::Sim,
        Environment::Live,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Sim => "sim",
            Environment::Live => "live",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewrites a record's `attributes` for `env`. Other fields are untouched.
pub fn retag_record(record: &mut Value, env: Environment) {
    if let Some(attributes) = record.get_mut("attributes") {
        let retagged = retag_value(attributes, env);
        *attributes = retagged;
    }
}

/// Recursively prefixes wildcard strings with `<env>:`.
///
/// Strings holding serialized JSON objects or arrays (`searchSourceJSON`,
/// `panelsJSON`, ...) are parsed, rewritten and serialized again.
pub fn retag_value(value: &Value, env: Environment) -> Value {
    match value {
        Value::String(s) => Value::String(retag_str(s, env)),
        Value::Array(items) => Value::Array(items.iter().map(|v| retag_value(v, env)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), retag_value(v, env)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn retag_str(s: &str, env: Environment) -> String {
    if let Ok(embedded @ (Value::Object(_) | Value::Array(_))) = serde_json::from_str::<Value>(s) {
        return retag_value(&embedded, env).to_string();
    }

    let prefix = format!("{env}:");
    if s.contains('*') && !s.starts_with(&prefix) {
        format!("{prefix}{s}")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn wildcard_strings_get_prefixed() {
        assert_eq!(retag_value(&json!("logs-*"), Environment::Dev), json!("dev:logs-*"));
        assert_eq!(retag_value(&json!("plain"), Environment::Dev), json!("plain"));
    }

    #[test]
    fn already_prefixed_strings_are_left_alone() {
        assert_eq!(retag_value(&json!("live:logs-*"), Environment::Live), json!("live:logs-*"));
        assert_eq!(
            retag_value(&json!("dev:logs-*"), Environment::Live),
            json!("live:dev:logs-*")
        );
    }

    #[test]
    fn embedded_json_is_rewritten() {
        let value = json!(r#"{"index":"metrics-*","query":{"language":"kuery"}}"#);
        let retagged = retag_value(&value, Environment::Sim);
        let parsed: Value = serde_json::from_str(retagged.as_str().unwrap()).unwrap();
        assert_eq!(parsed["index"], "sim:metrics-*");
        assert_eq!(parsed["query"]["language"], "kuery");
    }

    #[test]
    fn only_attributes_are_rewritten() {
        let mut record = json!({
            "id": "idx-*",
            "type": "index-pattern",
            "attributes": {"title": "logs-*", "fields": ["a*", 3, true]}
        });
        retag_record(&mut record, Environment::Test);
        assert_eq!(
            record,
            json!({
                "id": "idx-*",
                "type": "index-pattern",
                "attributes": {"title": "test:logs-*", "fields": ["test:a*", 3, true]}
            })
        );
    }

    #[test]
    fn record_without_attributes_is_unchanged() {
        let mut record = json!({"id": "x*"});
        retag_record(&mut record, Environment::Dev);
        assert_eq!(record, json!({"id": "x*"}));
    }

    #[test]
    fn environment_names() {
        let names: Vec<&str> = Environment::ALL.iter().map(|e| e.as_str()).collect();
        assert_eq!(names, vec!["dev", "test", "sim", "live"]);
    }
}
