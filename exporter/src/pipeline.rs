//! Per-space export pipeline.
//!
//! For every selected space the four scoped collections are fetched, the
//! dashboards and client summaries derived, and three artifacts written under
//! `<root>/<space>/`. Spaces are processed strictly one after another and the
//! first failure aborts the run.

use crate::config::ExportOptions;
use crate::error::{ExportError, ExportResult};
use crate::summary::{self, RunReport, RunSummaryRow};
use kbexport_client::{space_ids, ManagementApi};
use kbexport_shape::{filter_dashboards, project_dashboard_summary, project_rule_summary};
use kbexport_sink::{write_feed, write_json, write_tabular, Sheet};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, Instrument};

/// File name of the space catalogue written at the output root.
pub const SPACES_DETAILS_FILE: &str = "spaces_details.json";

const DASHBOARD_SUMMARY_COLUMNS: [&str; 4] =
    ["name", "description", "created_by", "visualization_count"];

const RULE_SUMMARY_COLUMNS: [&str; 9] = [
    "name",
    "rule_id",
    "created_by",
    "updated_at",
    "enabled",
    "severity",
    "type",
    "tags",
    "last_execution",
];

/// Artifact paths of one space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceLayout {
    dir: PathBuf,
    space: String,
}

impl SpaceLayout {
    pub fn new(root: &Path, space: &str) -> Self {
        Self {
            dir: root.join(space),
            space: space.to_string(),
        }
    }

    /// `<root>/<space>/excel/<space>.xlsx`
    pub fn workbook(&self) -> PathBuf {
        self.dir.join("excel").join(format!("{}.xlsx", self.space))
    }

    /// `<root>/<space>/ndjson/<space>.ndjson`
    pub fn feed(&self) -> PathBuf {
        self.dir.join("ndjson").join(format!("{}.ndjson", self.space))
    }

    /// `<root>/<space>/client_summary/client_summary.xlsx`
    pub fn client_summary(&self) -> PathBuf {
        self.dir.join("client_summary").join("client_summary.xlsx")
    }
}

/// Drives a full export against a [`ManagementApi`].
pub struct Exporter<'a, A: ManagementApi + ?Sized> {
    api: &'a A,
    options: &'a ExportOptions,
}

impl<'a, A: ManagementApi + ?Sized> Exporter<'a, A> {
    pub fn new(api: &'a A, options: &'a ExportOptions) -> Self {
        Self { api, options }
    }

    /// Exports every selected space, then the global summary and the data
    /// streams.
    pub async fn run(&self) -> ExportResult<RunReport> {
        let root = self.options.output_dir.as_path();
        info!(output = %root.display(), "starting export");

        let discovered = self.api.fetch_spaces().await?;
        let spaces = select_spaces(discovered, &self.options.spaces)?;
        let ids = space_ids(&spaces)?;
        if let Some(bad) = ids.iter().find(|id| !is_safe_segment(id)) {
            return Err(ExportError::UnsafeSpaceId(bad.clone()));
        }
        info!(spaces = ids.len(), "spaces selected");

        write_json(&Value::Array(spaces), &root.join(SPACES_DETAILS_FILE))?;

        let mut rows = Vec::with_capacity(ids.len());
        for id in &ids {
            let row = self
                .export_space(id)
                .instrument(info_span!("space", id = %id))
                .await?;
            rows.push(row);
        }

        summary::write_global_summary(&rows, root)?;
        let data_streams = summary::export_data_streams(self.api, root).await?;

        info!(spaces = rows.len(), data_streams, "export complete");
        Ok(RunReport {
            summary: rows,
            data_streams,
        })
    }

    async fn export_space(&self, space: &str) -> ExportResult<RunSummaryRow> {
        info!("fetching collections");
        let saved_objects = self.api.fetch_saved_objects(space).await?;
        let rules = self.api.fetch_rules(space).await?;
        let data_views = self.api.fetch_data_views(space).await?;
        debug!(
            saved_objects = saved_objects.len(),
            rules = rules.len(),
            data_views = data_views.len(),
            "collections fetched"
        );

        let dashboards = filter_dashboards(&saved_objects, self.options.on_malformed)?;
        let dashboard_summary = project_dashboard_summary(&dashboards);
        let rule_summary = project_rule_summary(&rules);

        let layout = SpaceLayout::new(&self.options.output_dir, space);
        write_tabular(
            &[
                Sheet::new("SavedObjects", &saved_objects),
                Sheet::new("Rules", &rules),
                Sheet::new("DataViews", &data_views),
                Sheet::new("Dashboards", &dashboards),
            ],
            &layout.workbook(),
        )?;
        write_feed(
            saved_objects
                .iter()
                .chain(&rules)
                .chain(&data_views)
                .chain(&dashboards),
            &layout.feed(),
        )?;
        write_tabular(
            &[
                Sheet::from_serialize("Dashboards", &dashboard_summary)?
                    .with_columns(DASHBOARD_SUMMARY_COLUMNS),
                Sheet::from_serialize("Rules", &rule_summary)?.with_columns(RULE_SUMMARY_COLUMNS),
            ],
            &layout.client_summary(),
        )?;

        let row = RunSummaryRow {
            space_id: space.to_string(),
            saved_objects: saved_objects.len(),
            rules: rules.len(),
            data_views: data_views.len(),
            dashboards: dashboards.len(),
        };
        info!(
            saved_objects = row.saved_objects,
            rules = row.rules,
            data_views = row.data_views,
            dashboards = row.dashboards,
            "space exported"
        );
        Ok(row)
    }
}

/// Keeps the spaces named in `requested`, in discovery order. An empty
/// request keeps everything.
pub fn select_spaces(spaces: Vec<Value>, requested: &[String]) -> ExportResult<Vec<Value>> {
    if requested.is_empty() {
        return Ok(spaces);
    }

    let ids = space_ids(&spaces)?;
    let unknown: Vec<String> = requested
        .iter()
        .filter(|wanted| !ids.contains(*wanted))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ExportError::UnknownSpaces(unknown));
    }

    Ok(spaces
        .into_iter()
        .zip(ids)
        .filter(|(_, id)| requested.contains(id))
        .map(|(space, _)| space)
        .collect())
}

fn is_safe_segment(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}
