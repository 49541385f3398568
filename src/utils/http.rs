//! HTTP helpers
//!
//! Each adapter owns one `reqwest::Client`; the client pools connections and
//! is safe to share across concurrent calls.

use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::defaults;
use crate::error::{ProviderError, classify_http_error};

/// Build the HTTP client for one adapter with its own timeouts.
pub fn build_client(
    provider: &str,
    timeout: Duration,
    connect_timeout: Duration,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .user_agent(defaults::http::USER_AGENT)
        .pool_max_idle_per_host(defaults::http::MAX_IDLE_PER_HOST)
        .pool_idle_timeout(defaults::http::KEEP_ALIVE_TIMEOUT)
        .build()
        .map_err(|e| ProviderError::network(provider, format!("failed to build HTTP client: {e}")))
}

/// Send a request and turn non-success statuses into classified errors.
pub async fn send_checked(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, &e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_http_error(provider, status.as_u16(), &body))
}

/// Read a full response body as JSON.
pub async fn read_json<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, &e))?;
    serde_json::from_slice(&bytes).map_err(|e| ProviderError::from_json(provider, &e))
}
