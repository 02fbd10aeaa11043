//! Load error taxonomy.
//!
//! Every variant is recovered inside the loader; nothing here crosses the
//! caller boundary as an error. The only caller-visible effect of failure is
//! the `Error` visual state and the placeholder resource.

use thiserror::Error;

/// Error variants of the loading pipeline.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum LoadError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("cache unavailable: {message}")]
    CacheUnavailable { message: String },

    #[error("fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("fetch timed out after {timeout_ms}ms")]
    FetchTimeout { timeout_ms: u64 },

    #[error("failed to decode resource: {message}")]
    DecodeFailed { message: String },

    #[error("retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl LoadError {
    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Creates a cache unavailable error.
    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    /// Creates a fetch failed error.
    #[must_use]
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::FetchFailed {
            message: message.into(),
        }
    }

    /// Creates a decode failed error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    /// Returns whether a failed attempt with this error enters the retry
    /// branch. Cache errors never do on their own; they fall through to the
    /// network path instead.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::FetchTimeout { .. } | Self::DecodeFailed { .. }
        )
    }

    /// Returns whether this error came from a timed-out fetch.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::FetchTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(LoadError::fetch("connection reset"), true; "network error retries")]
    #[test_case(LoadError::FetchTimeout { timeout_ms: 10_000 }, true; "timeout retries")]
    #[test_case(LoadError::decode("bad magic"), true; "decode failure retries")]
    #[test_case(LoadError::cache("store missing"), false; "cache error falls through")]
    #[test_case(LoadError::invalid_request("empty url"), false; "invalid request is dropped")]
    #[test_case(LoadError::RetriesExhausted { attempts: 3 }, false; "exhaustion is terminal")]
    fn test_retryability(err: LoadError, expected: bool) {
        assert_eq!(err.is_retryable(), expected);
    }

    #[test]
    fn test_display_carries_context() {
        let err = LoadError::FetchTimeout { timeout_ms: 10_000 };
        assert_eq!(err.to_string(), "fetch timed out after 10000ms");
    }
}
