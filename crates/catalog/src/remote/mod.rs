//! Hosted backend client (table API, object storage, auth).
//!
//! Uses `reqwest` 0.13 directly. Every request carries the project API key in
//! both the `apikey` header and as a bearer token; the auth endpoint replaces
//! the bearer with the caller's access token.
//!
//! Status mapping:
//!
//! | status              | error                |
//! |---------------------|----------------------|
//! | 400, 409, 422       | `ValidationFailed`   |
//! | anything else ≥ 400 | `BackendUnavailable` |
//! | unparsable body     | `BackendUnavailable` |

mod favorites;
mod storage;
mod table;

use std::sync::Arc;
use std::time::Duration;

use eclat_core::Entity;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::config::RemoteConfig;
use crate::error::{StoreError, StoreResult};

pub use favorites::RemoteFavorites;
pub use storage::RemoteImageStore;
pub use table::RemoteTable;

/// Longest slice of a response body copied into logs and error messages.
const BODY_SNIPPET_LEN: usize = 200;

// =============================================================================
// RemoteClient
// =============================================================================

/// Client for the hosted backend.
///
/// Cheap to clone; all table, storage and auth handles share one connection
/// pool.
#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<RemoteClientInner>,
}

struct RemoteClientInner {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    storage_bucket: String,
}

impl RemoteClient {
    /// Create a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig, timeout: Duration) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("eclat-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a client on top of an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(config: &RemoteConfig, http: reqwest::Client) -> Self {
        // Relative joins only append when the base path ends with '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            inner: Arc::new(RemoteClientInner {
                http,
                base_url,
                api_key: config.api_key.clone(),
                storage_bucket: config.storage_bucket.clone(),
            }),
        }
    }

    /// Handle on the table holding `T`.
    #[must_use]
    pub fn table<T: Entity>(&self) -> RemoteTable<T> {
        RemoteTable::new(self.clone())
    }

    /// Handle on the `favorites` table.
    #[must_use]
    pub fn favorites(&self) -> RemoteFavorites {
        RemoteFavorites::new(self.clone())
    }

    /// Handle on the image bucket.
    #[must_use]
    pub fn images(&self) -> RemoteImageStore {
        RemoteImageStore::new(self.clone())
    }

    pub(crate) fn storage_bucket(&self) -> &str {
        &self.inner.storage_bucket
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve a path relative to the backend base URL.
    pub(crate) fn url(&self, path: &str) -> StoreResult<Url> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| StoreError::BackendUnavailable(format!("invalid backend path {path}: {e}")))
    }

    /// Start a request authenticated with the project API key.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let key = self.inner.api_key.expose_secret();
        self.inner
            .http
            .request(method, url)
            .header("apikey", key)
            .bearer_auth(key)
    }

    /// Start a request on behalf of a signed-in user.
    pub(crate) fn request_as_user(&self, method: Method, url: Url, access_token: &str) -> RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .header("apikey", self.inner.api_key.expose_secret())
            .bearer_auth(access_token)
    }

    /// Send a request and return its status and body, whatever the status.
    pub(crate) async fn send_raw(&self, request: RequestBuilder) -> StoreResult<(StatusCode, String)> {
        let response = request.send().await?;
        let status = response.status();
        Ok((status, response.text().await?))
    }

    /// Send a request and return the raw body of a successful response.
    pub(crate) async fn send(&self, request: RequestBuilder) -> StoreResult<String> {
        let (status, body) = self.send_raw(request).await?;

        if status.is_success() {
            debug!(status = %status, bytes = body.len(), "backend request succeeded");
            return Ok(body);
        }

        let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
        error!(status = %status, body = %snippet, "backend returned non-success status");
        Err(status_error(status, &body))
    }

    /// Send a request and decode its JSON body.
    pub(crate) async fn send_json<R: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<R> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(BODY_SNIPPET_LEN).collect::<String>(),
                "failed to parse backend response"
            );
            StoreError::BackendUnavailable(format!("unexpected response body: {e}"))
        })
    }
}

/// Map a non-success status to the store error taxonomy.
fn status_error(status: StatusCode, body: &str) -> StoreError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            StoreError::ValidationFailed(error_message(body))
        }
        _ => StoreError::BackendUnavailable(format!("HTTP {status}")),
    }
}

/// Pull the human-readable message out of an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.chars().take(BODY_SNIPPET_LEN).collect())
}
