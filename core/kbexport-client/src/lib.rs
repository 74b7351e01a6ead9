//! Read-only client for the Kibana management API.
//!
//! Exposes the handful of collections kbexport archives:
//! - spaces (the partitions everything else is scoped to)
//! - saved objects, detection rules and data views, per space
//! - data streams, once per run
//!
//! All calls are authenticated GETs. A non-success status is returned as
//! [`ClientError::RequestFailure`] and never retried.

mod api;
mod client;
mod config;
mod error;

pub use api::{space_ids, ManagementApi, SPACES_PATH};
pub use client::KibanaClient;
pub use config::{AuthScheme, ClientConfig, DEFAULT_PAGE_SIZE};
pub use error::{ClientError, ClientResult};
