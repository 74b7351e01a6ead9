//! Row shaping for kbexport.
//!
//! Everything in this crate is a pure function over `serde_json::Value`
//! records: no I/O and no shared state.
//!
//! - [`filter_dashboards`] picks the dashboards out of a saved-object list
//! - [`project_dashboard_summary`] and [`project_rule_summary`] build the
//!   reduced client-facing rows
//! - [`flatten_record`] turns a nested record into dotted-path columns
//! - [`retag_record`] prefixes wildcard patterns with an environment name

mod dashboards;
mod flatten;
mod retag;
mod rules;

pub use dashboards::{filter_dashboards, project_dashboard_summary, DashboardSummaryRow};
pub use flatten::flatten_record;
pub use retag::{retag_record, retag_value, Environment};
pub use rules::{project_rule_summary, RuleSummaryRow};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value used when a record does not say who created it.
pub const UNKNOWN_CREATOR: &str = "Unknown";

/// Result type alias using the crate's error type.
pub type ShapeResult<T> = std::result::Result<T, ShapeError>;

/// Errors raised while shaping records.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("record {index} is missing required field `{field}`")]
    MalformedRecord { index: usize, field: &'static str },
}

/// What to do with a record that lacks a field the shaper relies on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Log a warning and leave the record out of the derived set.
    #[default]
    Skip,
    /// Fail the run with [`ShapeError::MalformedRecord`].
    Fail,
}

/// Reads a string at a JSON pointer, if present.
pub(crate) fn str_at<'a>(record: &'a Value, pointer: &str) -> Option<&'a str> {
    record.pointer(pointer).and_then(Value::as_str)
}
