//! Client configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default page size for paged collections (saved objects, rules).
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

/// Scheme placed in front of the credential in the `Authorization` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// `Authorization: ApiKey <credential>`
    #[default]
    ApiKey,
    /// `Authorization: Bearer <credential>`
    Bearer,
}

impl AuthScheme {
    /// Builds the full `Authorization` header value for a credential.
    pub fn authorization(self, credential: &str) -> String {
        match self {
            AuthScheme::ApiKey => format!("ApiKey {credential}"),
            AuthScheme::Bearer => format!("Bearer {credential}"),
        }
    }
}

/// Connection settings for a [`KibanaClient`](crate::KibanaClient).
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the management API (e.g. `https://kibana.example:5601`).
    pub base_url: String,
    /// Opaque credential sent with every request.
    pub credential: String,
    pub auth_scheme: AuthScheme,
    /// `per_page` value for paged collections.
    pub page_size: u32,
    /// Follow `page=N` until the envelope's `total` is reached.
    /// When false a single page is fetched and anything beyond it is dropped.
    pub paginate: bool,
    /// Per-request timeout. `None` leaves the HTTP layer's default (no deadline).
    pub timeout_secs: Option<u64>,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
    /// Saved-object types sent as repeated `type=` filters. Empty fetches all.
    pub saved_object_types: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5601".to_string(),
            credential: String::new(),
            auth_scheme: AuthScheme::default(),
            page_size: DEFAULT_PAGE_SIZE,
            paginate: true,
            timeout_secs: None,
            accept_invalid_certs: false,
            saved_object_types: Vec::new(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("credential", &"<redacted>")
            .field("auth_scheme", &self.auth_scheme)
            .field("page_size", &self.page_size)
            .field("paginate", &self.paginate)
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("saved_object_types", &self.saved_object_types)
            .finish()
    }
}
