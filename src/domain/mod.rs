//! Domain layer with core entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{LoadRequest, QueueStatus, ResourceSource, TargetId, VisualState};
pub use errors::LoadError;
pub use ports::{ContentCachePort, FetchPort};
