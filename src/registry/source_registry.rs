//! # Source Registry
//!
//! Authoritative list of currently representable items, partitioned by
//! [`ItemKind`], with event fan-out to dependent pools.
//!
//! The registry performs no recomputation itself; it is pure bookkeeping plus
//! event publication. Each mutating batch is stamped with a single
//! [`Frame`](crate::model::Frame) from the shared clock so every dependent
//! can match the change against one causal point.

use crate::config::CoreConfig;
use crate::events::{EventPublisher, SourceEvent, SourceEventKind};
use crate::model::{FrameClock, FrameRef, ItemId, ItemKind, ViewItemRef, ViewState};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error};

/// Tracks representable items and notifies dependents of membership and
/// invalidation changes.
#[derive(Debug)]
pub struct SourceRegistry {
    clock: Arc<FrameClock>,
    items: RwLock<HashMap<ItemId, ViewItemRef>>,
    stack_events: EventPublisher<SourceEvent>,
    segmentation_events: EventPublisher<SourceEvent>,
}

impl SourceRegistry {
    pub fn new(clock: Arc<FrameClock>, config: &CoreConfig) -> Arc<Self> {
        Arc::new(Self {
            clock,
            items: RwLock::new(HashMap::new()),
            stack_events: EventPublisher::new(config.event_channel_capacity),
            segmentation_events: EventPublisher::new(config.event_channel_capacity),
        })
    }

    /// The shared stamping authority.
    pub fn clock(&self) -> &Arc<FrameClock> {
        &self.clock
    }

    /// Record the latest view state on the clock so registry-stamped frames
    /// carry current crosshair/resolution/bounds.
    pub fn set_view_state(&self, state: ViewState) {
        self.clock.set_view_state(state);
    }

    /// Subscribe to events for one item category.
    pub fn subscribe(&self, kind: ItemKind) -> broadcast::Receiver<SourceEvent> {
        self.publisher_for(kind).subscribe()
    }

    /// Register new items and notify dependents.
    ///
    /// Stamps one frame for the whole batch and emits one `Added` event per
    /// affected category.
    ///
    /// # Panics
    ///
    /// Panics if any item is already registered; double insertion is a caller
    /// bug, not a recoverable condition.
    pub fn insert(&self, items: Vec<ViewItemRef>) -> FrameRef {
        {
            let mut members = self.items.write();
            for item in &items {
                if members.contains_key(&item.id()) {
                    error!(item = %item.id(), name = item.name(), "duplicate source insertion");
                    panic!("source {} is already registered", item.id());
                }
                members.insert(item.id(), item.clone());
            }
        }

        let frame = self.clock.stamp();
        debug!(frame = %frame.time, count = items.len(), "sources added");
        self.publish_partitioned(SourceEventKind::Added, items, &frame);

        frame
    }

    /// Deregister items and notify dependents.
    ///
    /// # Panics
    ///
    /// Panics if any item is not a member; removing an unknown source is a
    /// caller bug.
    pub fn remove(&self, items: Vec<ViewItemRef>) -> FrameRef {
        {
            let mut members = self.items.write();
            for item in &items {
                if members.remove(&item.id()).is_none() {
                    error!(item = %item.id(), name = item.name(), "removal of unregistered source");
                    panic!("source {} is not registered", item.id());
                }
            }
        }

        let frame = self.clock.stamp();
        debug!(frame = %frame.time, count = items.len(), "sources removed");
        self.publish_partitioned(SourceEventKind::Removed, items, &frame);

        frame
    }

    /// Signal that item data changed without a membership change: dependents
    /// must recompute representations but not add or remove anything.
    pub fn invalidate(&self, items: Vec<ViewItemRef>, frame: FrameRef) {
        debug!(frame = %frame.time, count = items.len(), "sources invalidated");
        self.publish_partitioned(SourceEventKind::Invalidated, items, &frame);
    }

    /// Signal that item appearance changed (e.g. a color property) without a
    /// membership change.
    pub fn invalidate_appearance(&self, items: Vec<ViewItemRef>, frame: FrameRef) {
        debug!(frame = %frame.time, count = items.len(), "source appearance invalidated");
        self.publish_partitioned(SourceEventKind::AppearanceInvalidated, items, &frame);
    }

    pub fn contains(&self, item: &ViewItemRef) -> bool {
        self.items.read().contains_key(&item.id())
    }

    /// All current members of one category.
    pub fn all_of(&self, kind: ItemKind) -> Vec<ViewItemRef> {
        self.items
            .read()
            .values()
            .filter(|item| item.kind() == kind)
            .cloned()
            .collect()
    }

    /// All current members.
    pub fn sources(&self) -> Vec<ViewItemRef> {
        self.items.read().values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    fn publisher_for(&self, kind: ItemKind) -> &EventPublisher<SourceEvent> {
        match kind {
            ItemKind::Stack => &self.stack_events,
            ItemKind::Segmentation => &self.segmentation_events,
        }
    }

    /// Emit one event per category actually present in `items`, all carrying
    /// the same frame.
    fn publish_partitioned(&self, kind: SourceEventKind, items: Vec<ViewItemRef>, frame: &FrameRef) {
        let (stacks, segmentations): (Vec<_>, Vec<_>) =
            items.into_iter().partition(|item| item.kind().is_base());

        if !stacks.is_empty() {
            self.stack_events
                .publish(SourceEvent::new(kind, stacks, frame.clone()));
        }
        if !segmentations.is_empty() {
            self.segmentation_events
                .publish(SourceEvent::new(kind, segmentations, frame.clone()));
        }
    }
}
