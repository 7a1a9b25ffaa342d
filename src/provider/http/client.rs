//! HTTP client wrapper for chat completion requests.

use crate::config::ClientConfig;
use crate::provider::error::{ApiError, Error, TransportError};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Serialize;

/// Chat completions path appended to the configured base URL.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Pooled HTTP transport bound to one endpoint and API key.
///
/// `reqwest::Client` is internally reference counted and synchronizes its own
/// connection pool, so one instance is shared by every concurrent call.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
}

impl HttpClient {
    /// Create a client with its own pooled transport built from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let transport = &config.transport;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(transport.connect_timeout())
            .pool_max_idle_per_host(transport.pool_max_idle_per_host)
            .pool_idle_timeout(transport.pool_idle_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Self::with_client(config, client)
    }

    /// Use a pre-configured transport. Timeouts are whatever `client` was built with.
    pub fn with_client(config: &ClientConfig, client: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            client,
            url: config.endpoint(),
            headers: build_headers(&config.api_key)?,
        })
    }

    /// Full endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST a JSON body and return the response if its status is a success.
    ///
    /// Non-success statuses are read to completion and turned into [`ApiError`].
    /// Streaming requests additionally send `Accept: text/event-stream`.
    pub async fn post<T: Serialize>(
        &self,
        body: &T,
        stream: bool,
    ) -> Result<reqwest::Response, Error> {
        let mut headers = self.headers.clone();
        if stream {
            headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        }

        let response = self
            .client
            .post(&self.url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(response.headers());
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_body(status.as_u16(), text)
                .with_retry_after(retry_after)
                .into());
        }

        Ok(response)
    }
}

/// Build the fixed request headers. The key is marked sensitive so it never
/// shows up in `Debug` output.
fn build_headers(api_key: &str) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| Error::Config("API key contains invalid header characters".into()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    Ok(headers)
}

/// Delay requested by a `Retry-After` header, in whole seconds.
///
/// Only the delta-seconds form is understood; fractions round up and the
/// result is at least 1. HTTP dates yield `None`.
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    delay_secs(value)
}

fn delay_secs(value: &str) -> Option<u64> {
    let secs: f64 = value.trim().parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| (secs.ceil() as u64).max(1))
}
