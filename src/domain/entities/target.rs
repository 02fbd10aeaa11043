//! Target identity and per-target visual state.

/// Stable identifier of a rendering target (a slot in the UI that wants a
/// visual resource). Opaque to the loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetId(pub String);

impl TargetId {
    /// Creates a new `TargetId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives a stable cache-file name from a source URL by hashing it.
    #[must_use]
    pub fn digest(url: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16])
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TargetId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Visual state of one target, as the rendering layer observes it.
/// States are mutually exclusive at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualState {
    /// No attempt has started yet (unstyled slot).
    #[default]
    Pending,
    /// A cache read or network fetch is in progress.
    Loading,
    /// A resource was applied, from cache or network.
    Loaded,
    /// All retries exhausted; the placeholder was applied.
    Error,
}

impl VisualState {
    /// Returns true if a resource is applied and ready for display.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    /// Returns true if an attempt is currently running.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true if loading settled on the placeholder.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns true if no attempt has started.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Where a loaded resource came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceSource {
    /// Served from the persistent content cache.
    Cache,
    /// Downloaded from the network.
    Network,
}

impl std::fmt::Display for ResourceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
        }
    }
}
