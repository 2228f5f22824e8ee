//! # Core Error Types
//!
//! Structured error handling for the representation cache using thiserror
//! instead of `Box<dyn Error>` patterns.
//!
//! Lifecycle violations (observer underflow, reading a never-published cache,
//! duplicate registration) are deliberately *not* represented here: they
//! indicate caller bugs and fail fast with a panic after being reported
//! through `tracing`. Pipeline failures never surface here either; they are
//! isolated per item inside the pool (see
//! [`PipelineError`](crate::pool::PipelineError)).

use thiserror::Error;

/// Recoverable errors surfaced by the representation cache.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Worker execution error: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
