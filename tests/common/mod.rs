//! Shared fixtures: counting stub pipelines and scene builders.

#![allow(dead_code)]

use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::collections::HashMap;
use voxelview_core::{
    ActorHandle, ActorSet, Actors, CoreConfig, Frame, FrameClock, FrameRef, ItemId, ItemKind,
    PipelineError, PipelineFactory, RepresentationPipeline, SourceRegistry, TimeStamp, ViewItem,
    ViewItemRef, ViewState,
};

/// Deterministic stub pipeline: same `(item, state)` always yields the same
/// actors, and every invocation is counted.
pub struct StubPipeline {
    kind: String,
    invocations: Arc<AtomicUsize>,
    failing: Arc<RwLock<HashSet<ItemId>>>,
}

impl RepresentationPipeline for StubPipeline {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn create_actors(
        &self,
        item: &ViewItem,
        state: &ViewState,
    ) -> Result<ActorSet, PipelineError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);

        if self.failing.read().contains(&item.id()) {
            return Err(PipelineError::ActorGeneration {
                item: item.id().to_string(),
                message: "stub failure".to_string(),
            });
        }

        Ok(ActorSet::new(vec![ActorHandle::new(
            fingerprint(item, state),
            self.kind.clone(),
        )]))
    }
}

/// Factory producing [`StubPipeline`] instances that share one invocation
/// counter and one failure list.
pub struct StubFactory {
    kind: String,
    invocations: Arc<AtomicUsize>,
    failing: Arc<RwLock<HashSet<ItemId>>>,
}

impl StubFactory {
    pub fn new(kind: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            kind: kind.into(),
            invocations: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(RwLock::new(HashSet::new())),
        })
    }

    /// Total `create_actors` invocations across all pipelines of this
    /// factory.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Make every future invocation for `item` fail.
    pub fn fail_item(&self, item: &ViewItemRef) {
        self.failing.write().insert(item.id());
    }

    /// Let `item` succeed again.
    pub fn heal_item(&self, item: &ViewItemRef) {
        self.failing.write().remove(&item.id());
    }
}

impl PipelineFactory for StubFactory {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn create_pipeline(&self, _item: &ViewItemRef) -> Arc<dyn RepresentationPipeline> {
        Arc::new(StubPipeline {
            kind: self.kind.clone(),
            invocations: self.invocations.clone(),
            failing: self.failing.clone(),
        })
    }
}

fn fingerprint(item: &ViewItem, state: &ViewState) -> u64 {
    let mut hasher = DefaultHasher::new();
    item.id().hash(&mut hasher);
    for v in state
        .crosshair
        .iter()
        .chain(state.resolution.iter())
        .chain(state.bounds.iter())
    {
        v.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

pub fn config() -> CoreConfig {
    CoreConfig::default()
}

/// A fresh clock plus a registry wired to it.
pub fn scene() -> (Arc<FrameClock>, Arc<SourceRegistry>) {
    let clock = FrameClock::new();
    let registry = SourceRegistry::new(clock.clone(), &config());
    (clock, registry)
}

pub fn stack(name: &str) -> ViewItemRef {
    ViewItem::new(ItemKind::Stack, name)
}

/// A frame at an arbitrary timestamp, with a crosshair derived from it so
/// frames at different times carry different states.
pub fn frame_at(time: u64) -> FrameRef {
    Frame::new(
        TimeStamp::from(time),
        ViewState::default().with_crosshair([time as f64, 0.0, 0.0]),
    )
}

/// A one-item actor map whose content is determined by `seed`.
pub fn actors_with(seed: u64) -> Actors {
    let mut map = HashMap::new();
    map.insert(
        ItemId::new(),
        ActorSet::new(vec![ActorHandle::new(seed, "slice")]),
    );
    Arc::new(map)
}

pub fn segmentation(name: &str) -> ViewItemRef {
    ViewItem::new(ItemKind::Segmentation, name)
}
