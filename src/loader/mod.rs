//! The bounded image-loading queue.
//!
//! This module provides:
//! - Construction-time configuration with conservative defaults
//! - A priority-ordered, target-deduplicating pending queue
//! - The loader itself: a worker-loop actor with semaphore-bounded
//!   dispatch, cache-first execution, and exponential-backoff retries

mod config;
mod core;
mod queue;

pub use self::config::LoaderConfig;
pub use self::core::{BoundedImageLoader, LoadEvent, LoadState};
pub use self::queue::PendingQueue;
