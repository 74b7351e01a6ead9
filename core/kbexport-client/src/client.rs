//! HTTP implementation of [`ManagementApi`] against Kibana.

use crate::api::{ManagementApi, SPACES_PATH};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const SAVED_OBJECTS_PATH: &str = "/api/saved_objects/_find";
const RULES_PATH: &str = "/api/detection_engine/rules/_find";
const DATA_VIEWS_PATH: &str = "/api/data_views";
const DATA_STREAMS_PATH: &str = "/_data_stream";

/// Kibana management API client.
///
/// Holds one keep-alive HTTP client for the lifetime of a run. Every request
/// carries the credential, the `kbn-xsrf` header and a JSON content type.
pub struct KibanaClient {
    config: ClientConfig,
    base_url: String,
    http: Client,
}

impl KibanaClient {
    /// Creates a client from the given configuration.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        if config.page_size == 0 {
            return Err(ClientError::Config("page size must be positive".to_string()));
        }

        let authorization = config.auth_scheme.authorization(&config.credential);
        let mut auth = HeaderValue::from_str(&authorization).map_err(|e| {
            ClientError::Config(format!("credential is not a valid header value: {e}"))
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("kbn-xsrf", HeaderValue::from_static("true"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            config,
            base_url,
            http,
        })
    }

    /// Base URL with trailing slashes removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds an endpoint URL, inserting `/s/<space>` when scoped.
    fn endpoint(&self, space: Option<&str>, path: &str) -> String {
        match space {
            Some(space) => format!("{}/s/{}{}", self.base_url, urlencoding::encode(space), path),
            None => format!("{}{}", self.base_url, path),
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> ClientResult<Value> {
        let request = self.http.get(url).query(query).build()?;
        let url = request.url().to_string();
        debug!(%url, "GET");

        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), %body, "request failed");
            return Err(ClientError::RequestFailure {
                url,
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| ClientError::Decode {
            url,
            reason: format!("invalid JSON body: {e}"),
        })
    }

    async fn fetch_collection(&self, url: &str, key: Option<&str>) -> ClientResult<Vec<Value>> {
        let body = self.get_json(url, &[]).await?;
        take_array(body, key, url)
    }

    /// Fetches a `_find` style collection, following pages when enabled.
    ///
    /// `filter` is appended to every page request.
    async fn fetch_paged(
        &self,
        space: &str,
        path: &str,
        key: &str,
        filter: &[(&str, String)],
    ) -> ClientResult<Vec<Value>> {
        let page_size = self.config.page_size;
        let url = self.endpoint(Some(space), path);
        let mut items = Vec::new();
        let mut previous_first: Option<Value> = None;
        let mut page: u32 = 1;

        loop {
            let mut query = vec![("per_page", page_size.to_string())];
            if self.config.paginate {
                query.push(("page", page.to_string()));
            }
            query.extend(filter.iter().cloned());

            let body = self.get_json(&url, &query).await?;
            let total = body.get("total").and_then(Value::as_u64);
            let batch = take_array(body, Some(key), &url)?;
            let received = batch.len();

            // A server that ignores `page` keeps answering with the first page.
            if page > 1 && batch.first().is_some() && batch.first() == previous_first.as_ref() {
                warn!(%url, page, "page repeated, stopping pagination");
                break;
            }
            previous_first = batch.first().cloned();
            items.extend(batch);
            let collected = items.len() as u64;

            if !self.config.paginate {
                if let Some(total) = total.filter(|t| *t > collected) {
                    warn!(%url, total, collected, "collection truncated at page size");
                }
                break;
            }

            let more = match total {
                Some(total) => collected < total,
                None => received == page_size as usize,
            };
            if received == 0 || !more {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

/// Moves the collection out of a response envelope.
///
/// `key == None` means the body itself must be the array.
fn take_array(body: Value, key: Option<&str>, url: &str) -> ClientResult<Vec<Value>> {
    let value = match key {
        Some(key) => match body {
            Value::Object(mut map) => map.remove(key),
            _ => None,
        },
        None => Some(body),
    };

    match value {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(ClientError::Decode {
            url: url.to_string(),
            reason: match key {
                Some(key) => format!("expected an array under `{key}`"),
                None => "expected a JSON array".to_string(),
            },
        }),
    }
}

#[async_trait]
impl ManagementApi for KibanaClient {
    async fn fetch_spaces(&self) -> ClientResult<Vec<Value>> {
        let url = self.endpoint(None, SPACES_PATH);
        self.fetch_collection(&url, None).await
    }

    async fn fetch_saved_objects(&self, space: &str) -> ClientResult<Vec<Value>> {
        let types: Vec<(&str, String)> = self
            .config
            .saved_object_types
            .iter()
            .map(|t| ("type", t.clone()))
            .collect();
        self.fetch_paged(space, SAVED_OBJECTS_PATH, "saved_objects", &types)
            .await
    }

    async fn fetch_rules(&self, space: &str) -> ClientResult<Vec<Value>> {
        self.fetch_paged(space, RULES_PATH, "data", &[]).await
    }

    async fn fetch_data_views(&self, space: &str) -> ClientResult<Vec<Value>> {
        let url = self.endpoint(Some(space), DATA_VIEWS_PATH);
        self.fetch_collection(&url, Some("data_view")).await
    }

    async fn fetch_data_streams(&self) -> ClientResult<Vec<Value>> {
        let url = self.endpoint(None, DATA_STREAMS_PATH);
        self.fetch_collection(&url, Some("data_streams")).await
    }
}
