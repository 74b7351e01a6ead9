use crate::{str_at, MalformedPolicy, ShapeError, ShapeResult, UNKNOWN_CREATOR};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

const DASHBOARD_TYPE: &str = "dashboard";

/// Client-facing projection of a dashboard saved object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummaryRow {
    pub name: String,
    pub description: String,
    pub created_by: String,
    /// Number of saved objects the dashboard references.
    pub visualization_count: usize,
}

impl DashboardSummaryRow {
    pub fn from_record(record: &Value) -> Self {
        let created_by = str_at(record, "/created_by")
            .or_else(|| str_at(record, "/attributes/created_by"))
            .unwrap_or(UNKNOWN_CREATOR);

        Self {
            name: str_at(record, "/attributes/title").unwrap_or_default().to_string(),
            description: str_at(record, "/attributes/description")
                .unwrap_or_default()
                .to_string(),
            created_by: created_by.to_string(),
            visualization_count: record
                .get("references")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
        }
    }
}

/// Returns the saved objects whose `type` is `dashboard`, in input order.
///
/// A record without a string `type` is skipped with a warning or fails the
/// call, depending on `policy`.
pub fn filter_dashboards(
    saved_objects: &[Value],
    policy: MalformedPolicy,
) -> ShapeResult<Vec<Value>> {
    let mut dashboards = Vec::new();

    for (index, record) in saved_objects.iter().enumerate() {
        match record.get("type").and_then(Value::as_str) {
            Some(DASHBOARD_TYPE) => dashboards.push(record.clone()),
            Some(_) => {}
            None => match policy {
                MalformedPolicy::Fail => {
                    return Err(ShapeError::MalformedRecord { index, field: "type" });
                }
                MalformedPolicy::Skip => {
                    let id = str_at(record, "/id").unwrap_or("<no id>");
                    warn!(index, id, "saved object has no `type`, skipping");
                }
            },
        }
    }

    Ok(dashboards)
}

/// One summary row per dashboard, order preserved.
pub fn project_dashboard_summary(dashboards: &[Value]) -> Vec<DashboardSummaryRow> {
    dashboards.iter().map(DashboardSummaryRow::from_record).collect()
}
