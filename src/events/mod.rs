//! Event fan-out between the source registry, pools and managers.
//!
//! Every event carries the [`Frame`](crate::model::Frame) that stamped it so
//! ordering can be reconstructed by receivers without a global lock.

pub mod publisher;
pub mod types;

pub use publisher::EventPublisher;
pub use types::{PoolEvent, PoolEventKind, RenderRequest, SourceEvent, SourceEventKind};
