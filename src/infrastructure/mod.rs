//! Infrastructure layer with external service adapters.

/// Persistent on-disk content cache.
pub mod disk_cache;
/// HTTP fetch adapter.
pub mod http_fetcher;

pub use disk_cache::DiskContentCache;
pub use http_fetcher::HttpFetcher;
