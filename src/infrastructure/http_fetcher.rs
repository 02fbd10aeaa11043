//! HTTP fetch adapter backed by reqwest.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use tracing::debug;

use crate::domain::errors::LoadError;
use crate::domain::ports::FetchPort;

/// Fetches resource bytes over HTTP(S) with a fixed per-request timeout.
/// `data:` URLs are materialized locally without touching the network.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl HttpFetcher {
    /// Creates a fetcher whose every request times out after `timeout_ms`.
    ///
    /// # Errors
    /// Returns `LoadError::FetchFailed` if the HTTP client cannot be built.
    pub fn new(timeout_ms: u64) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| LoadError::fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }
}

#[async_trait::async_trait]
impl FetchPort for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, LoadError> {
        if url.starts_with("data:") {
            return decode_data_url(url);
        }

        debug!(url = %url, "fetching resource");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::FetchTimeout {
                    timeout_ms: self.timeout_ms,
                }
            } else {
                LoadError::fetch(format!("request failed: {e}"))
            }
        })?;

        if !response.status().is_success() {
            return Err(LoadError::fetch(format!(
                "HTTP {}: {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::FetchTimeout {
                    timeout_ms: self.timeout_ms,
                }
            } else {
                LoadError::fetch(format!("failed to read body: {e}"))
            }
        })
    }
}

/// Materializes a `data:` URL payload. Base64 payloads are decoded; anything
/// else is taken verbatim.
fn decode_data_url(url: &str) -> Result<Bytes, LoadError> {
    let body = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| LoadError::fetch("malformed data URL"))?;

    let (header, payload) = body;
    if header.ends_with(";base64") {
        BASE64
            .decode(payload)
            .map(Bytes::from)
            .map_err(|e| LoadError::fetch(format!("invalid base64 payload: {e}")))
    } else {
        Ok(Bytes::copy_from_slice(payload.as_bytes()))
    }
}
