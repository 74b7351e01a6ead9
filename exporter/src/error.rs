//! Export error types.

use kbexport_client::ClientError;
use kbexport_shape::ShapeError;
use kbexport_sink::SinkError;
use thiserror::Error;

/// Result type alias using the exporter's error type.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Errors that abort an export or retag run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    #[error("shaping error: {0}")]
    Shape(#[from] ShapeError),

    #[error("output error: {0}")]
    Sink(#[from] SinkError),

    #[error("unknown spaces requested: {}", .0.join(", "))]
    UnknownSpaces(Vec<String>),

    #[error("space id `{0}` cannot be used as a directory name")]
    UnsafeSpaceId(String),

    #[error("configuration error: {0}")]
    Config(String),
}
