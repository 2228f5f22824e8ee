//! Representation pools: time-indexed actor caches with observer-gated
//! recomputation.

pub mod pipeline;
pub(crate) mod ranged_value;
pub mod representation_pool;
pub mod updater;

pub use pipeline::{PipelineError, PipelineFactory, RepresentationPipeline};
pub use representation_pool::RepresentationPool;
pub use updater::PoolUpdater;
