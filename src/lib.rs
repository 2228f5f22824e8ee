//! # VoxelView Core
//!
//! Time-versioned representation cache sitting between a changing domain
//! model (image stacks and derived segmentations) and any number of
//! independently-paced views.
//!
//! ## Overview
//!
//! Rendering frontends need up-to-date actor sets for whatever the user is
//! looking at, without recomputing representations that nothing displays and
//! without ever showing a view something older than what it last requested.
//! This crate provides the caching/versioning/observer contract that makes
//! that work:
//!
//! - [`registry::SourceRegistry`] — authoritative list of representable
//!   items, partitioned into base stacks and derived segmentations, with
//!   frame-stamped event fan-out.
//! - [`pool::RepresentationPool`] — per-pipeline-kind, time-indexed actor
//!   cache that only computes while someone is observing it.
//! - [`manager::RepresentationManager`] — per-view controller with no-op
//!   suppression, coalesced render requests and clone fan-out across views.
//!
//! The expensive extraction algorithms themselves (iso-surfacing, slice
//! extraction, ...) are external collaborators behind
//! [`pool::RepresentationPipeline`], and actors are opaque handles.
//!
//! ## Control flow
//!
//! View state change → manager (filters no-op changes) → pool(s) (recompute
//! if observed) → pipeline (may run on a blocking worker via
//! [`pool::PoolUpdater`]) → pool publishes time-stamped actors → view pulls
//! the latest ready result through [`manager::RepresentationManager::display`].
//!
//! ## Module Organization
//!
//! - [`model`] - Timestamps, frames, items and opaque actor bundles
//! - [`events`] - Frame-stamped event types and broadcast publishers
//! - [`registry`] - Source registry and the pool arena
//! - [`pool`] - Time-indexed actor caches and the pipeline boundary
//! - [`manager`] - Per-view display coordination
//! - [`config`] - Channel and retention tuning
//! - [`error`] - Structured error handling
//! - [`logging`] - Environment-aware tracing setup

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod manager;
pub mod model;
pub mod pool;
pub mod registry;

pub use config::CoreConfig;
pub use error::{CoreError, Result};
pub use events::{PoolEvent, PoolEventKind, RenderRequest, SourceEvent, SourceEventKind};
pub use manager::{ManagerFlags, ManagerStatus, RepresentationManager, ViewId};
pub use model::{
    ActorHandle, ActorSet, Actors, Frame, FrameClock, FrameRef, ItemId, ItemKind, TimeRange,
    TimeStamp, ViewItem, ViewItemRef, ViewState,
};
pub use pool::{
    PipelineError, PipelineFactory, PoolUpdater, RepresentationPipeline, RepresentationPool,
};
pub use registry::{PoolKey, PoolRegistry, SourceRegistry};
