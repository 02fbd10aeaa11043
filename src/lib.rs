//! imgqueue - a bounded, priority-scheduled image loading queue.
//!
//! This crate provides the image-loading core of a monitoring dashboard
//! client: a loader that accepts fire-and-forget load requests, enforces a
//! small cap on simultaneous fetches, consults a persistent byte cache before
//! hitting the network, and retries failed fetches with exponential backoff
//! before settling on a placeholder.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// The loading queue itself: configuration, pending queue, worker loop.
pub mod loader;

pub use domain::entities::{LoadRequest, QueueStatus, ResourceSource, TargetId, VisualState};
pub use domain::errors::LoadError;
pub use domain::ports::{ContentCachePort, FetchPort};
pub use infrastructure::{DiskContentCache, HttpFetcher};
pub use loader::{BoundedImageLoader, LoadEvent, LoadState, LoaderConfig};

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name, also the default cache namespace.
pub const NAME: &str = "imgqueue";
