//! Run-level artifacts: the global summary workbook and the data-stream
//! export.

use crate::error::ExportResult;
use kbexport_client::ManagementApi;
use kbexport_sink::{write_feed, write_tabular, Sheet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const GLOBAL_SUMMARY_FILE: &str = "global_summary.xlsx";
pub const DATA_STREAMS_DIR: &str = "datastreams";

const SUMMARY_COLUMNS: [&str; 5] =
    ["space_id", "saved_objects", "rules", "data_views", "dashboards"];

/// Collection sizes of one exported space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummaryRow {
    pub space_id: String,
    pub saved_objects: usize,
    pub rules: usize,
    pub data_views: usize,
    pub dashboards: usize,
}

/// Outcome of a completed export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One row per exported space, in processing order.
    pub summary: Vec<RunSummaryRow>,
    pub data_streams: usize,
}

/// Writes `<root>/global_summary.xlsx` with a `Summary` sheet. The header is
/// written even when `rows` is empty.
pub fn write_global_summary(rows: &[RunSummaryRow], root: &Path) -> ExportResult<PathBuf> {
    let path = root.join(GLOBAL_SUMMARY_FILE);
    write_tabular(
        &[Sheet::from_serialize("Summary", rows)?.with_columns(SUMMARY_COLUMNS)],
        &path,
    )?;
    info!(path = %path.display(), spaces = rows.len(), "global summary written");
    Ok(path)
}

/// Fetches data streams once and writes them as a feed and a `DataStreams`
/// workbook under `<root>/datastreams/`. Returns the stream count.
pub async fn export_data_streams<A>(api: &A, root: &Path) -> ExportResult<usize>
where
    A: ManagementApi + ?Sized,
{
    let streams = api.fetch_data_streams().await?;
    let dir = root.join(DATA_STREAMS_DIR);

    write_feed(&streams, &dir.join("datastreams.ndjson"))?;
    write_tabular(&[Sheet::new("DataStreams", &streams)], &dir.join("datastreams.xlsx"))?;

    info!(data_streams = streams.len(), "data streams exported");
    Ok(streams.len())
}
