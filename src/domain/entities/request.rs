//! Pending load requests and queue diagnostics.

use std::time::Instant;

use super::target::TargetId;

/// One queued load request. At most one exists per target while pending;
/// re-submitting an already-pending target updates its priority in place.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// The rendering target this request serves.
    pub target: TargetId,
    /// The resource to fetch. Never empty.
    pub source_url: String,
    /// Scheduling weight; higher is dispatched sooner. Mutable while pending.
    pub priority: i32,
    /// Failed attempts so far. Zero for a fresh submission.
    pub retry_count: u32,
    /// Insertion sequence, the tie-break among equal priorities.
    pub seq: u64,
    /// When the request entered the queue. Diagnostics only.
    pub enqueued_at: Instant,
}

impl LoadRequest {
    /// Creates a fresh request with the given insertion sequence.
    #[must_use]
    pub fn new(
        target: TargetId,
        source_url: impl Into<String>,
        priority: i32,
        retry_count: u32,
        seq: u64,
    ) -> Self {
        Self {
            target,
            source_url: source_url.into(),
            priority,
            retry_count,
            seq,
            enqueued_at: Instant::now(),
        }
    }

    /// Returns true if this request is a backoff re-submission.
    #[must_use]
    pub const fn is_retry(&self) -> bool {
        self.retry_count > 0
    }
}

/// Snapshot of the loader's queue, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    /// Requests waiting for a slot.
    pub queued: usize,
    /// Requests currently executing a cache read or network fetch.
    pub running: usize,
    /// The fixed concurrency cap.
    pub max_concurrent: usize,
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} queued, {}/{} running",
            self.queued, self.running, self.max_concurrent
        )
    }
}
