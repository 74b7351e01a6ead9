//! kbexport: archives the configuration of a Kibana deployment.
//!
//! For every space the saved objects, detection rules and data views are
//! written to a multi-sheet workbook and an NDJSON feed, together with a
//! reduced client summary. A global summary and the cluster's data streams
//! are written once per run.
//!
//! The binary wires these pieces to the command line; the library is split so
//! the pipeline can run against any [`ManagementApi`](kbexport_client::ManagementApi).

pub mod config;
pub mod error;
pub mod pipeline;
pub mod retag;
pub mod summary;

pub use config::{ExportConfig, ExportOptions};
pub use error::{ExportError, ExportResult};
pub use pipeline::{select_spaces, Exporter, SpaceLayout, SPACES_DETAILS_FILE};
pub use retag::retag_feed;
pub use summary::{RunReport, RunSummaryRow, DATA_STREAMS_DIR, GLOBAL_SUMMARY_FILE};
