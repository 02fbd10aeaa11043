//! Port definitions for the loading pipeline.

mod content_cache_port;
mod fetch_port;

pub use content_cache_port::ContentCachePort;
pub use fetch_port::FetchPort;

/// Mock port implementations shared by loader tests.
#[cfg(test)]
pub mod mocks {
    pub use super::content_cache_port::mock::MockContentCache;
    pub use super::fetch_port::mock::MockFetcher;
}
