//! Port definition for the persistent content cache.

use bytes::Bytes;

use crate::domain::errors::LoadError;

/// Port for the persistent byte store consulted before any network fetch.
/// Keyed by the original source URL. Implementations must be thread-safe;
/// capacity and eviction belong to the implementation, not the loader.
#[async_trait::async_trait]
pub trait ContentCachePort: Send + Sync {
    /// Attempts to read the cached bytes for a source URL.
    /// Returns `None` on a miss; a read failure is also reported as a miss
    /// after logging, so the loader falls through to the network.
    async fn lookup(&self, url: &str) -> Option<Bytes>;

    /// Stores fetched bytes under a source URL. Best-effort.
    ///
    /// # Errors
    /// Returns `LoadError::CacheUnavailable` if the store cannot be written.
    async fn store(&self, url: &str, bytes: &[u8]) -> Result<(), LoadError>;

    /// Removes one entry, if present.
    async fn evict(&self, url: &str);

    /// Drops every entry.
    ///
    /// # Errors
    /// Returns `LoadError::CacheUnavailable` if the store cannot be walked.
    async fn clear(&self) -> Result<(), LoadError>;
}
