use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::warn;

/// Column used when a record is not a JSON object.
const SCALAR_COLUMN: &str = "value";

/// Flattens a record into `(column, leaf)` pairs.
///
/// Nested objects become dotted paths (`attributes.title`). Arrays and empty
/// objects are leaves and keep their JSON form. Order follows the record's
/// own key order.
///
/// A literal dotted key and a nested path can name the same column
/// (`{"a.b": 1, "a": {"b": 2}}`); the later one gets a ` (2)`, ` (3)`, ...
/// suffix so no leaf is lost.
pub fn flatten_record(record: &Value) -> Vec<(String, Value)> {
    let mut columns = Vec::new();
    match record {
        Value::Object(map) => flatten_into(map, None, &mut columns),
        other => columns.push((SCALAR_COLUMN.to_string(), other.clone())),
    }
    disambiguate(&mut columns);
    columns
}

fn disambiguate(columns: &mut [(String, Value)]) {
    let mut seen = HashSet::with_capacity(columns.len());
    for (name, _) in columns.iter_mut() {
        if seen.insert(name.clone()) {
            continue;
        }
        let renamed = (2..)
            .map(|n| format!("{name} ({n})"))
            .find(|candidate| !seen.contains(candidate))
            .unwrap_or_else(|| name.clone());
        warn!(column = %name, renamed = %renamed, "flattened column collides, renaming");
        seen.insert(renamed.clone());
        *name = renamed;
    }
}

fn flatten_into(map: &Map<String, Value>, prefix: Option<&str>, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_into(nested, Some(&path), out),
            leaf => out.push((path, leaf.clone())),
        }
    }
}
