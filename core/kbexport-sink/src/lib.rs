//! Output sinks for kbexport.
//!
//! Two formats are produced from the same row sets:
//! - multi-sheet `.xlsx` workbooks, one sheet per named row set, nested
//!   records flattened into dotted-path columns
//! - `.ndjson` feeds, one compact JSON record per line
//!
//! Both writers create missing parent directories and overwrite existing
//! files. Workbooks carry a fixed creation timestamp, so writing the same
//! rows twice yields identical bytes.

mod feed;
mod tabular;

pub use feed::{read_feed, write_feed, write_json, FeedContents, MalformedLine};
pub use tabular::{write_tabular, Sheet, MAX_CELL_CHARS, MAX_SHEET_NAME_CHARS};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors raised while writing or reading output artifacts.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sheet `{sheet}` exceeds spreadsheet limits: {reason}")]
    SheetLimit { sheet: String, reason: String },
}

/// Creates the parent directory of `path` if it has one.
pub(crate) fn ensure_parent(path: &Path) -> SinkResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
