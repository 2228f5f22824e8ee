//! Offloading pipeline execution to worker threads.
//!
//! Pipeline invocation is the only designated suspension point in the
//! system: pool bookkeeping and manager state stay on the control thread,
//! while `create_actors` batches may run on tokio's blocking pool. The pool's
//! publication boundary is thread-safe and orders results by timestamp, so
//! overlapping updates need no cancellation; a stale completion is discarded
//! on arrival.

use crate::error::{CoreError, Result};
use crate::model::FrameRef;
use crate::pool::RepresentationPool;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runs pool updates off the control thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolUpdater;

impl PoolUpdater {
    /// Recompute `pool` for `frame` on a blocking worker.
    ///
    /// Completion order across spawned updates is irrelevant: publication is
    /// gated by the strictly-newer rule, so the cache always ends at the
    /// newest requested frame regardless of which worker finishes last.
    pub fn spawn(pool: Arc<RepresentationPool>, frame: FrameRef) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || pool.set_view_state(&frame))
    }

    /// Recompute `pool` for `frame` and wait for publication.
    ///
    /// Errors only if the worker itself failed (panicked or was cancelled);
    /// a superseded computation is not an error, its result is simply
    /// discarded at the publication boundary.
    pub async fn run(pool: Arc<RepresentationPool>, frame: FrameRef) -> Result<()> {
        Self::spawn(pool, frame)
            .await
            .map_err(|e| CoreError::Worker(format!("pool update worker failed: {e}")))
    }
}
