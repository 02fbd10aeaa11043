//! Loader configuration.

use std::sync::Arc;
use std::time::Duration;

/// Configuration for the loader. Fixed for the instance lifetime.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum simultaneous cache/network executions. Kept small to respect
    /// a downstream proxy's connection limits.
    pub max_concurrent: usize,
    /// Additional attempts after the first failed one.
    pub max_retries: u32,
    /// Base of the exponential backoff between attempts.
    pub retry_delay_base_ms: u64,
    /// Per-fetch deadline.
    pub fetch_timeout_ms: u64,
    /// Fixed fallback resource applied when retries are exhausted.
    pub placeholder: Arc<image::DynamicImage>,
    /// Namespace of the persistent content cache.
    pub cache_namespace: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            max_retries: 2,
            retry_delay_base_ms: 500,
            fetch_timeout_ms: 10_000,
            placeholder: Arc::new(image::DynamicImage::new_rgb8(16, 16)),
            cache_namespace: crate::NAME.to_string(),
        }
    }
}

impl LoaderConfig {
    /// Backoff before the attempt with the given (already incremented) retry
    /// count: `retry_delay_base_ms * 2^retry_count`.
    #[must_use]
    pub fn backoff_delay(&self, retry_count: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry_count);
        Duration::from_millis(self.retry_delay_base_ms.saturating_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_delay_base_ms, 500);
        assert_eq!(config.fetch_timeout_ms, 10_000);
    }

    #[test_case(1, 1000; "first retry waits one second")]
    #[test_case(2, 2000; "second retry doubles")]
    #[test_case(3, 4000; "delays keep doubling")]
    fn test_backoff_delay(retry_count: u32, expected_ms: u64) {
        let config = LoaderConfig::default();
        assert_eq!(
            config.backoff_delay(retry_count),
            Duration::from_millis(expected_ms)
        );
    }
}
