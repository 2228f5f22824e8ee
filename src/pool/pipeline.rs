//! External collaborator boundary: representation pipelines.
//!
//! Pipelines are the expensive, opaque extraction algorithms (iso-surfacing,
//! slice extraction, volume raycasting setup) supplied by the surrounding
//! application. The cache treats them as pure functions from `(item, view
//! state)` to an actor set.

use crate::model::{ActorSet, ViewItem, ViewItemRef, ViewState};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by pipeline execution.
///
/// A failing pipeline never corrupts the cache: the pool keeps the previous
/// valid entry as the most recent ready state for the affected item.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("actor generation failed for item {item}: {message}")]
    ActorGeneration { item: String, message: String },

    #[error("pipeline {pipeline} does not support item kind {kind}")]
    UnsupportedKind { pipeline: String, kind: String },
}

/// Builds renderable actors for one item.
///
/// Implementations must be reentrant and safe to invoke off the control
/// thread: `create_actors` is the designated offload point and may run on a
/// blocking worker (see [`PoolUpdater`](crate::pool::PoolUpdater)).
pub trait RepresentationPipeline: Send + Sync {
    /// Stable identifier of the representation kind (e.g. `"slice"`,
    /// `"volumetric"`).
    fn kind(&self) -> &str;

    /// Produce the actors representing `item` under `state`.
    fn create_actors(&self, item: &ViewItem, state: &ViewState)
        -> Result<ActorSet, PipelineError>;
}

/// Creates one pipeline instance per source item.
///
/// A pool owns one factory and materializes pipelines lazily, only once the
/// pool is actually observed.
pub trait PipelineFactory: Send + Sync {
    /// The representation kind of the pipelines this factory produces.
    fn kind(&self) -> &str;

    /// Bind a pipeline instance to `item`.
    fn create_pipeline(&self, item: &ViewItemRef) -> Arc<dyn RepresentationPipeline>;
}
