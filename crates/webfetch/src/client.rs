//! Bearer-authenticated JSON request execution.

use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Timeout applied to every API request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors surfaced by the request executor.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request exceeded the timeout
    #[error("Request timed out")]
    TimedOut,

    /// Network-level failure (DNS, connection reset, ...)
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service answered with a non-success status
    #[error("API Error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Client for one remote API: fixed base URL, bearer credential, and a
/// fixed informational user agent.
pub struct ApiClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl ApiClient {
    /// Create a client for the given API base host.
    pub fn new(
        base_url: impl Into<String>,
        api_key: String,
        user_agent: &str,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .map_err(ApiError::Build)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    /// POST a JSON body to a path under the API base.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    /// GET a path under the API base. No body, no content headers.
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(Method::GET, path, None).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, url, "sending API request");

        let mut request = self.http.request(method, &url).bearer_auth(&self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        // The services sometimes answer plain text on success; pass the raw
        // body through unchanged.
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::TimedOut
    } else {
        ApiError::Transport(err)
    }
}
