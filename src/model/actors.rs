//! Opaque renderable output of representation pipelines.
//!
//! The cache never looks inside an actor; it only needs identity and
//! equality so a pool can tell whether a recomputation actually changed
//! anything.

use crate::model::item::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Opaque handle to one renderable actor (a GPU-side prop in the consuming
/// application).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorHandle {
    id: u64,
    kind: String,
}

impl ActorHandle {
    pub fn new(id: u64, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// The renderable result produced for one item at one frame.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSet(Vec<ActorHandle>);

impl ActorSet {
    pub fn new(actors: Vec<ActorHandle>) -> Self {
        Self(actors)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorHandle> {
        self.0.iter()
    }
}

impl From<Vec<ActorHandle>> for ActorSet {
    fn from(actors: Vec<ActorHandle>) -> Self {
        Self(actors)
    }
}

/// Per-item actor sets published at one timestamp.
///
/// Published atomically and immutable afterwards; readers always observe a
/// complete map, never a partially-populated one.
pub type Actors = Arc<HashMap<ItemId, ActorSet>>;

/// An empty published result (distinct from "never published").
pub fn empty_actors() -> Actors {
    Arc::new(HashMap::new())
}
