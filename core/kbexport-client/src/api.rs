//! Management API abstraction.
//!
//! The export pipeline only depends on this trait, so it can be driven by the
//! HTTP client or by an in-memory implementation in tests.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use serde_json::Value;

/// Path of the space listing endpoint, also used to label decode errors.
pub const SPACES_PATH: &str = "/api/spaces/space";

/// Read-only view of the management API.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Lists every space record visible to the credential.
    async fn fetch_spaces(&self) -> ClientResult<Vec<Value>>;

    /// Lists space identifiers in discovery order.
    async fn fetch_partitions(&self) -> ClientResult<Vec<String>> {
        let spaces = self.fetch_spaces().await?;
        space_ids(&spaces)
    }

    /// Saved objects of one space.
    async fn fetch_saved_objects(&self, space: &str) -> ClientResult<Vec<Value>>;

    /// Detection rules of one space.
    async fn fetch_rules(&self, space: &str) -> ClientResult<Vec<Value>>;

    /// Data views of one space.
    async fn fetch_data_views(&self, space: &str) -> ClientResult<Vec<Value>>;

    /// Data streams. Not scoped to a space.
    async fn fetch_data_streams(&self) -> ClientResult<Vec<Value>>;
}

/// Extracts the `id` of each space record, preserving order.
pub fn space_ids(spaces: &[Value]) -> ClientResult<Vec<String>> {
    spaces
        .iter()
        .enumerate()
        .map(|(index, space)| {
            space
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ClientError::Decode {
                    url: SPACES_PATH.to_string(),
                    reason: format!("space record {index} has no string `id`"),
                })
        })
        .collect()
}
