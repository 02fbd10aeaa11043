//! Priority-ordered pending queue with per-target de-duplication.

use tracing::trace;

use crate::domain::entities::{LoadRequest, TargetId};

/// Pending requests, kept sorted descending by priority with insertion order
/// breaking ties. At most one entry exists per target; re-submitting a
/// pending target updates its priority in place.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: Vec<LoadRequest>,
    next_seq: u64,
}

impl PendingQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a request, or re-prioritizes the pending entry for the same
    /// target. Returns true if a new entry was inserted.
    pub fn submit(
        &mut self,
        target: TargetId,
        source_url: impl Into<String>,
        priority: i32,
        retry_count: u32,
    ) -> bool {
        if let Some(pos) = self.entries.iter().position(|e| e.target == target) {
            let mut entry = self.entries.remove(pos);
            trace!(target = %entry.target, old = entry.priority, new = priority, "re-prioritized pending request");
            entry.priority = priority;
            self.insert_sorted(entry);
            return false;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.insert_sorted(LoadRequest::new(target, source_url, priority, retry_count, seq));
        true
    }

    /// Removes and returns the highest-priority request.
    pub fn pop(&mut self) -> Option<LoadRequest> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// Drops every pending request.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of pending requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the target has a pending entry.
    #[must_use]
    pub fn contains(&self, target: &TargetId) -> bool {
        self.entries.iter().any(|e| &e.target == target)
    }

    fn insert_sorted(&mut self, entry: LoadRequest) {
        let pos = self.entries.partition_point(|e| {
            e.priority > entry.priority || (e.priority == entry.priority && e.seq < entry.seq)
        });
        self.entries.insert(pos, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit(queue: &mut PendingQueue, target: &str, priority: i32) -> bool {
        queue.submit(TargetId::new(target), "https://x/img.png", priority, 0)
    }

    #[test]
    fn test_pop_highest_priority_first() {
        let mut queue = PendingQueue::new();
        submit(&mut queue, "low", 0);
        submit(&mut queue, "high", 5);
        submit(&mut queue, "mid", 2);

        assert_eq!(queue.pop().unwrap().target.as_str(), "high");
        assert_eq!(queue.pop().unwrap().target.as_str(), "mid");
        assert_eq!(queue.pop().unwrap().target.as_str(), "low");
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_equal_priority_is_fifo() {
        let mut queue = PendingQueue::new();
        submit(&mut queue, "first", 1);
        submit(&mut queue, "second", 1);
        submit(&mut queue, "third", 1);

        assert_eq!(queue.pop().unwrap().target.as_str(), "first");
        assert_eq!(queue.pop().unwrap().target.as_str(), "second");
        assert_eq!(queue.pop().unwrap().target.as_str(), "third");
    }

    #[test]
    fn test_resubmit_updates_priority_in_place() {
        let mut queue = PendingQueue::new();
        assert!(submit(&mut queue, "a", 0));
        assert!(submit(&mut queue, "b", 3));
        assert!(!submit(&mut queue, "a", 5));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().target.as_str(), "a");
        assert_eq!(queue.pop().unwrap().target.as_str(), "b");
    }

    #[test]
    fn test_reprioritized_entry_keeps_arrival_order_among_equals() {
        let mut queue = PendingQueue::new();
        submit(&mut queue, "a", 0);
        submit(&mut queue, "b", 2);
        // a moves up to b's priority; it arrived first, so it dispatches first.
        submit(&mut queue, "a", 2);

        assert_eq!(queue.pop().unwrap().target.as_str(), "a");
        assert_eq!(queue.pop().unwrap().target.as_str(), "b");
    }

    #[test]
    fn test_clear_empties_queue() {
        let mut queue = PendingQueue::new();
        submit(&mut queue, "a", 0);
        submit(&mut queue, "b", 1);
        assert!(!queue.is_empty());

        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_contains() {
        let mut queue = PendingQueue::new();
        submit(&mut queue, "a", 0);
        assert!(queue.contains(&TargetId::new("a")));
        assert!(!queue.contains(&TargetId::new("b")));
    }

    #[test]
    fn test_negative_priorities_sink() {
        let mut queue = PendingQueue::new();
        submit(&mut queue, "retrying", -1);
        submit(&mut queue, "fresh", 0);

        assert_eq!(queue.pop().unwrap().target.as_str(), "fresh");
        assert_eq!(queue.pop().unwrap().target.as_str(), "retrying");
    }
}
