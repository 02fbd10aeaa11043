//! Domain entities for the loading queue.

mod request;
mod target;

pub use request::{LoadRequest, QueueStatus};
pub use target::{ResourceSource, TargetId, VisualState};
