//! Port definition for fetching resource bytes.

use bytes::Bytes;

use crate::domain::errors::LoadError;

/// Port for fetching the raw bytes of a source URL.
/// The implementation owns the fetch timeout; on expiry it reports
/// `LoadError::FetchTimeout` and the attempt is routed into the retry branch
/// exactly like a network error.
#[async_trait::async_trait]
pub trait FetchPort: Send + Sync {
    /// Fetches the resource bytes.
    ///
    /// # Errors
    /// `FetchFailed` for network errors and non-2xx responses,
    /// `FetchTimeout` when the configured deadline passes.
    async fn fetch(&self, url: &str) -> Result<Bytes, LoadError>;
}
