//! releases::php_net
//!
//! Release source backed by the php.net release API.
//!
//! # Endpoints
//!
//! - `GET {api_base}/releases/states?json` returns
//!   `{"8": {"8.3": {"state": "stable"}, ...}, ...}`
//! - `GET {api_base}/releases/?json&version=8.3` returns the latest release
//!   of the branch, `{"version": "8.3.14", ...}`, or `{"error": "..."}` for
//!   an unknown branch (with a 200 status).
//!
//! Requests are sent one at a time; no retries are attempted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::traits::{Release, ReleaseError, ReleaseSource, ReleaseStateMap};

/// Default php.net base URL.
pub const DEFAULT_API_BASE: &str = "https://www.php.net";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("ci-actions/", env!("CARGO_PKG_VERSION"));

/// php.net release source.
#[derive(Debug, Clone)]
pub struct PhpNetSource {
    client: Client,
    api_base: String,
}

/// Body of a latest-release response: either a release or an error.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReleaseResponse {
    Error { error: String },
    Release(Release),
}

impl PhpNetSource {
    /// Create a source for the given base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseError::Network` if the HTTP client cannot be built.
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, ReleaseError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ReleaseError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn states_url(&self) -> String {
        format!("{}/releases/states?json", self.api_base)
    }

    fn release_url(&self) -> String {
        format!("{}/releases/", self.api_base)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ReleaseError> {
        let response = request
            .send()
            .await
            .map_err(|e| ReleaseError::Network(e.to_string()))?;
        Self::handle_response(response).await
    }

    /// Map a response onto the decoded body or a `ReleaseError`.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ReleaseError> {
        let status = response.status();

        if status.is_success() {
            return response.json().await.map_err(|e| ReleaseError::Api {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = match body.trim() {
            "" => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
            text => text.lines().next().unwrap_or(text).to_string(),
        };

        Err(match status {
            _ if status.is_server_error() => ReleaseError::Api {
                status: status.as_u16(),
                message: format!("php.net server error: {}", message),
            },
            StatusCode::TOO_MANY_REQUESTS => ReleaseError::Api {
                status: status.as_u16(),
                message: format!("rate limited: {}", message),
            },
            _ => ReleaseError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl ReleaseSource for PhpNetSource {
    fn name(&self) -> &'static str {
        "php.net"
    }

    async fn states(&self) -> Result<ReleaseStateMap, ReleaseError> {
        self.get_json(self.client.get(self.states_url())).await
    }

    async fn latest_release(&self, branch: &str) -> Result<Release, ReleaseError> {
        let request = self
            .client
            .get(self.release_url())
            .query(&[("json", ""), ("version", branch)]);

        match self.get_json::<ReleaseResponse>(request).await? {
            ReleaseResponse::Release(release) => Ok(release),
            ReleaseResponse::Error { error } => Err(ReleaseError::NotFound {
                branch: branch.to_string(),
                message: error,
            }),
        }
    }
}
