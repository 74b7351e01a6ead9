//! Environment retagging of an exported feed.

use crate::error::{ExportError, ExportResult};
use kbexport_shape::{retag_record, Environment};
use kbexport_sink::{read_feed, write_feed, write_tabular, Sheet};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Writes one retagged copy of `input` per environment, as
/// `<output_dir>/<env>/<input file name>`, plus a workbook of the retagged
/// attributes at `<output_dir>/<env>/excel/modified_object_attributes_<env>.xlsx`.
/// Returns the written feed paths.
///
/// Lines that are not valid JSON are logged and left out of every copy.
pub fn retag_feed(
    input: &Path,
    output_dir: &Path,
    envs: &[Environment],
) -> ExportResult<Vec<PathBuf>> {
    let file_name = input
        .file_name()
        .ok_or_else(|| ExportError::Config(format!("{} is not a file", input.display())))?;

    let contents = read_feed(input)?;
    for bad in &contents.malformed {
        error!(
            input = %input.display(),
            line = bad.line,
            error = %bad.error,
            "skipping malformed line"
        );
    }

    let mut written = Vec::with_capacity(envs.len());
    for &env in envs {
        let records: Vec<Value> = contents
            .records
            .iter()
            .cloned()
            .map(|mut record| {
                retag_record(&mut record, env);
                record
            })
            .collect();

        let env_dir = output_dir.join(env.as_str());
        let path = env_dir.join(file_name);
        let count = write_feed(&records, &path)?;

        let workbook = env_dir
            .join("excel")
            .join(format!("modified_object_attributes_{env}.xlsx"));
        let attributes: Vec<Value> = records.iter().map(attribute_row).collect();
        write_tabular(&[Sheet::owned("Attributes", attributes)], &workbook)?;

        info!(%env, records = count, path = %path.display(), "feed retagged");
        written.push(path);
    }

    Ok(written)
}

/// A record's `attributes` with its `id` added, one workbook row per record.
fn attribute_row(record: &Value) -> Value {
    let mut row = match record.get("attributes") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let id = record.get("id").cloned().unwrap_or_else(|| Value::String(String::new()));
    row.insert("id".to_string(), id);
    Value::Object(row)
}
