//! Event payloads exchanged between registry, pools and managers.

use crate::model::{FrameRef, TimeStamp, ViewItemRef};
use serde::{Deserialize, Serialize};

/// Membership and invalidation notifications emitted by the source registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceEventKind {
    /// Items joined the registry.
    Added,
    /// Items left the registry.
    Removed,
    /// Item data changed without a membership change; representations must be
    /// recomputed.
    Invalidated,
    /// Item appearance (e.g. color) changed without a membership change.
    AppearanceInvalidated,
}

/// A source registry event for one item category.
#[derive(Debug, Clone)]
pub struct SourceEvent {
    pub kind: SourceEventKind,
    pub items: Vec<ViewItemRef>,
    /// The frame stamped for the batch this event belongs to.
    pub frame: FrameRef,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl SourceEvent {
    pub fn new(kind: SourceEventKind, items: Vec<ViewItemRef>, frame: FrameRef) -> Self {
        Self {
            kind,
            items,
            frame,
            published_at: chrono::Utc::now(),
        }
    }
}

/// Publication notifications emitted by a representation pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolEventKind {
    /// A strictly newer frame produced different actors.
    ActorsReady,
    /// A strictly newer frame produced identical actors; the valid range was
    /// extended without storing a duplicate.
    ActorsReused,
    /// The cache was cleared; previously published actors are gone.
    ActorsInvalidated,
}

/// A pool publication event.
#[derive(Debug, Clone)]
pub struct PoolEvent {
    pub kind: PoolEventKind,
    pub frame: FrameRef,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl PoolEvent {
    pub fn new(kind: PoolEventKind, frame: FrameRef) -> Self {
        Self {
            kind,
            frame,
            published_at: chrono::Utc::now(),
        }
    }
}

/// Coalesced signal that a re-render should occur soon.
///
/// A manager emits at most one of these per advancing timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub time: TimeStamp,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl RenderRequest {
    pub fn new(time: TimeStamp) -> Self {
        Self {
            time,
            published_at: chrono::Utc::now(),
        }
    }
}
