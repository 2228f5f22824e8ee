//! # Representation Pool
//!
//! Per-pipeline-kind actor cache with lazy, observer-gated recomputation.
//!
//! A pool never computes anything while its observer count is zero. Source
//! events accumulate in its broadcast receiver and newly added items stay
//! "pending" (no pipeline instance) until observation resumes, so inactive
//! views cost nothing. Publication goes through a single guarded boundary
//! ([`RepresentationPool::on_actors_ready`]) that accepts only strictly newer
//! timestamps, which resolves overlapping in-flight computations by
//! discard-on-arrival rather than cancellation.

use crate::config::CoreConfig;
use crate::events::{EventPublisher, PoolEvent, PoolEventKind, SourceEvent, SourceEventKind};
use crate::model::{
    actors::empty_actors, Actors, FrameRef, ItemId, ItemKind, TimeRange, TimeStamp, ViewItemRef,
};
use crate::pool::pipeline::{PipelineFactory, RepresentationPipeline};
use crate::pool::ranged_value::RangedValue;
use crate::registry::SourceRegistry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Time-indexed actor cache for one representation kind over one item
/// category.
pub struct RepresentationPool {
    kind: ItemKind,
    pipeline_kind: String,
    factory: Arc<dyn PipelineFactory>,
    observers: AtomicU32,
    max_retained_frames: usize,
    events: EventPublisher<PoolEvent>,
    inner: RwLock<PoolInner>,
}

struct PoolInner {
    registry: Weak<SourceRegistry>,
    receiver: Option<broadcast::Receiver<SourceEvent>>,
    sources: HashMap<ItemId, ViewItemRef>,
    pipelines: HashMap<ItemId, Arc<dyn RepresentationPipeline>>,
    pending: Vec<ViewItemRef>,
    requested: Option<FrameRef>,
    cache: RangedValue<Actors>,
}

/// One batch of pipeline invocations decided under the pool lock and executed
/// outside it.
struct UpdateJob {
    frame: FrameRef,
    targets: Vec<(ViewItemRef, Arc<dyn RepresentationPipeline>)>,
    /// Partial jobs merge over `base`; full jobs replace the published map.
    partial: bool,
    /// Snapshot of the last published actors, used for merging and as the
    /// per-item fallback when a pipeline fails.
    base: Option<Actors>,
}

/// What draining the source-event backlog found.
#[derive(Default)]
struct Drained {
    invalidations: Vec<(Vec<ViewItemRef>, FrameRef)>,
    structural_change: bool,
    newest_frame: Option<FrameRef>,
}

impl RepresentationPool {
    pub fn new(kind: ItemKind, factory: Arc<dyn PipelineFactory>, config: &CoreConfig) -> Arc<Self> {
        Arc::new(Self {
            kind,
            pipeline_kind: factory.kind().to_string(),
            factory,
            observers: AtomicU32::new(0),
            max_retained_frames: config.max_retained_frames,
            events: EventPublisher::new(config.event_channel_capacity),
            inner: RwLock::new(PoolInner {
                registry: Weak::new(),
                receiver: None,
                sources: HashMap::new(),
                pipelines: HashMap::new(),
                pending: Vec::new(),
                requested: None,
                cache: RangedValue::new(),
            }),
        })
    }

    /// The item category this pool attends to.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// The representation kind of this pool's pipelines.
    pub fn pipeline_kind(&self) -> &str {
        &self.pipeline_kind
    }

    /// Wire the pool to a source registry.
    ///
    /// Subscribes to the registry's events for this pool's item category and
    /// seeds the pending-source list with the current members. Nothing is
    /// computed here; pending sources are materialized on the next observed
    /// update.
    pub fn set_sources(self: &Arc<Self>, registry: &Arc<SourceRegistry>) {
        let mut inner = self.inner.write();
        inner.registry = Arc::downgrade(registry);
        inner.receiver = Some(registry.subscribe(self.kind));
        inner.pipelines.clear();
        inner.cache.invalidate();
        inner.sources = registry
            .all_of(self.kind)
            .into_iter()
            .map(|item| (item.id(), item))
            .collect();
        inner.pending = inner.sources.values().cloned().collect();
        debug!(
            pool = self.pipeline_kind,
            sources = inner.sources.len(),
            "pool sources set"
        );
    }

    /// Record the requested view state and, if the pool is observed, drain
    /// pending sources and recompute actors for `frame`.
    ///
    /// A frame whose timestamp has already been processed triggers no work.
    pub fn set_view_state(&self, frame: &FrameRef) {
        self.inner.write().requested = Some(frame.clone());
        self.process();
    }

    /// Idempotent re-application of the last requested state.
    ///
    /// Drains any backlog and recomputes if there are pending sources or the
    /// requested frame is newer than the last published one; a no-op
    /// otherwise.
    pub fn update(&self) {
        self.process();
    }

    /// All valid actors at the greatest published timestamp not newer than
    /// `t`. A `t` newer than anything published resolves to the most recent
    /// completed result; a `t` older than the oldest retained entry resolves
    /// to an empty set.
    ///
    /// # Panics
    ///
    /// Panics if the pool has never published anything; asking an empty cache
    /// for actors is a caller lifecycle bug.
    pub fn actors_at(&self, t: TimeStamp) -> Actors {
        let inner = self.inner.read();
        if inner.cache.is_empty() {
            error!(pool = self.pipeline_kind, time = %t, "actors_at on empty cache");
            panic!(
                "actors_at({t}) on pool {} which never published",
                self.pipeline_kind
            );
        }
        inner
            .cache
            .value_at(t)
            .cloned()
            .unwrap_or_else(empty_actors)
    }

    /// Collapse cached entries not newer than `t` into a single floor entry
    /// at `t` carrying the most recent retained actors.
    pub fn invalidate_previous_actors(&self, t: TimeStamp) {
        self.inner.write().cache.invalidate_previous_values(t);
    }

    /// The inclusive set of timestamps between the oldest retained entry and
    /// the last published one.
    pub fn ready_range(&self) -> TimeRange {
        self.inner.read().cache.time_range()
    }

    /// Timestamp of the newest published entry, or [`TimeStamp::ZERO`] if
    /// nothing was ever published.
    pub fn last_update_timestamp(&self) -> TimeStamp {
        self.inner.read().cache.last_time()
    }

    /// Whether the pool has any sources, pending ones included, as of the
    /// last observed update.
    pub fn has_sources(&self) -> bool {
        !self.inner.read().sources.is_empty()
    }

    /// The sources the pool attends to, as of the last observed update.
    pub fn sources(&self) -> Vec<ViewItemRef> {
        self.inner.read().sources.values().cloned().collect()
    }

    /// Extend the valid range to `frame` without recomputation. Used when a
    /// view ticks but nothing relevant changed. A no-op on an empty cache.
    pub fn reuse_representations(&self, frame: &FrameRef) {
        {
            let mut inner = self.inner.write();
            if inner.cache.is_empty() {
                return;
            }
            inner.cache.reuse_previous_value(frame.time);
            inner.cache.truncate_to(self.max_retained_frames);
        }
        self.events
            .publish(PoolEvent::new(PoolEventKind::ActorsReused, frame.clone()));
    }

    /// Register a manager as depending on this pool. The transition from
    /// unobserved to observed drains the accumulated backlog.
    pub fn increment_observers(&self) {
        let previous = self.observers.fetch_add(1, Ordering::SeqCst);
        if previous == 0 {
            debug!(pool = self.pipeline_kind, "pool is now observed");
            self.process();
        }
    }

    /// Deregister a depending manager.
    ///
    /// # Panics
    ///
    /// Panics on underflow; decrementing an unobserved pool is a caller
    /// lifecycle bug and is reported, never silently ignored.
    pub fn decrement_observers(&self) {
        let mut current = self.observers.load(Ordering::SeqCst);
        loop {
            if current == 0 {
                error!(pool = self.pipeline_kind, "observer count underflow");
                panic!(
                    "decrement_observers on unobserved pool {}",
                    self.pipeline_kind
                );
            }
            match self.observers.compare_exchange(
                current,
                current - 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    /// Current observer count.
    pub fn observer_count(&self) -> u32 {
        self.observers.load(Ordering::SeqCst)
    }

    /// Recompute the given items at `frame`, merging over the latest
    /// published actors for every other item. While unobserved, the cache is
    /// cleared instead so the next observed update recomputes from scratch.
    pub fn invalidate_representations(&self, items: &[ViewItemRef], frame: &FrameRef) {
        if self.observers.load(Ordering::SeqCst) == 0 {
            self.inner.write().cache.invalidate();
            debug!(
                pool = self.pipeline_kind,
                "invalidation while unobserved; cache cleared"
            );
            return;
        }

        let job = {
            let mut inner = self.inner.write();
            Self::materialize_pending(&self.factory, &mut inner);
            let targets = Self::targets_for(&inner, items);
            UpdateJob {
                frame: frame.clone(),
                targets,
                partial: true,
                base: inner.cache.last().cloned(),
            }
        };
        self.run_job(job);
    }

    /// Force-clear the cache and drop every pipeline binding; the next
    /// observed update rebuilds them from scratch.
    pub fn invalidate_actors(&self) {
        let mut inner = self.inner.write();
        inner.cache.invalidate();
        inner.pipelines.clear();
        inner.pending = inner.sources.values().cloned().collect();
        debug!(pool = self.pipeline_kind, "actors invalidated, pipelines reset");
    }

    /// Subscribe to publication events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<PoolEvent> {
        self.events.subscribe()
    }

    /// Single publication boundary, safe to invoke from a worker thread.
    ///
    /// Accepts only timestamps strictly newer than the last published one;
    /// anything else is a superseded in-flight computation and is discarded
    /// on arrival. Identical actor content extends the valid range instead of
    /// storing a duplicate, so dependents can still advance their notion of
    /// currentness. After publication the cache is collapsed to at most
    /// `max_retained_frames` entries, the oldest becoming the floor.
    pub fn on_actors_ready(&self, frame: &FrameRef, actors: Actors) {
        let event_kind = {
            let mut inner = self.inner.write();
            if !Self::not_has_been_processed(&inner, frame.time) {
                debug!(
                    pool = self.pipeline_kind,
                    frame = %frame.time,
                    last = %inner.cache.last_time(),
                    "discarding stale publication"
                );
                return;
            }

            let changed = inner.cache.last() != Some(&actors);
            let kind = if changed {
                inner.cache.add_value(actors, frame.time);
                PoolEventKind::ActorsReady
            } else {
                inner.cache.reuse_previous_value(frame.time);
                PoolEventKind::ActorsReused
            };
            inner.cache.truncate_to(self.max_retained_frames);
            kind
        };
        self.events.publish(PoolEvent::new(event_kind, frame.clone()));
    }

    /// True if `t` is newer than everything published so far.
    fn not_has_been_processed(inner: &PoolInner, t: TimeStamp) -> bool {
        t > inner.cache.last_time()
    }

    /// Drain the backlog, materialize pending pipelines and run whatever
    /// recomputation the backlog and the requested frame call for. The heart
    /// of the lazy gate: a no-op unless the pool is observed.
    fn process(&self) {
        if self.observers.load(Ordering::SeqCst) == 0 {
            return;
        }

        let (jobs, invalidated_frame) = {
            let mut inner = self.inner.write();
            let mut drained = Self::drain_source_events(&self.pipeline_kind, self.kind, &mut inner);

            if Self::materialize_pending(&self.factory, &mut inner) {
                drained.structural_change = true;
            }

            if inner.sources.is_empty() {
                (Vec::new(), None)
            } else {
                let mut jobs = Vec::new();

                for (items, frame) in std::mem::take(&mut drained.invalidations) {
                    jobs.push(UpdateJob {
                        frame,
                        targets: Self::targets_for(&inner, &items),
                        partial: true,
                        base: inner.cache.last().cloned(),
                    });
                }

                let full_frame = Self::newest_frame(&inner.requested, &drained.newest_frame);
                let mut invalidated_frame = None;
                if let Some(frame) = full_frame {
                    let stale = !Self::not_has_been_processed(&inner, frame.time);
                    if drained.structural_change || !stale {
                        let base = inner.cache.last().cloned();
                        if drained.structural_change {
                            inner.cache.invalidate();
                            invalidated_frame = Some(frame.clone());
                        }
                        jobs.push(UpdateJob {
                            frame,
                            targets: inner
                                .sources
                                .values()
                                .filter_map(|item| {
                                    inner
                                        .pipelines
                                        .get(&item.id())
                                        .map(|pipeline| (item.clone(), pipeline.clone()))
                                })
                                .collect(),
                            partial: false,
                            base,
                        });
                    }
                }

                (jobs, invalidated_frame)
            }
        };

        if let Some(frame) = invalidated_frame {
            self.events
                .publish(PoolEvent::new(PoolEventKind::ActorsInvalidated, frame));
        }

        for job in jobs {
            self.run_job(job);
        }
    }

    /// Execute one batch of pipeline invocations and publish the result.
    ///
    /// This is the designated expensive path; [`PoolUpdater`] runs it on a
    /// blocking worker. A failing pipeline is isolated to its item: the item
    /// keeps its previously published actors and its siblings still publish.
    ///
    /// [`PoolUpdater`]: crate::pool::PoolUpdater
    fn run_job(&self, job: UpdateJob) {
        let mut map: HashMap<ItemId, _> = if job.partial {
            job.base
                .as_deref()
                .cloned()
                .unwrap_or_default()
        } else {
            HashMap::new()
        };

        for (item, pipeline) in &job.targets {
            match pipeline.create_actors(item, &job.frame.state) {
                Ok(actors) => {
                    map.insert(item.id(), actors);
                }
                Err(err) => {
                    warn!(
                        pool = self.pipeline_kind,
                        item = %item.id(),
                        error = %err,
                        "pipeline failed, keeping previous actors for item"
                    );
                    if let Some(previous) = job
                        .base
                        .as_ref()
                        .and_then(|base| base.get(&item.id()).cloned())
                    {
                        map.insert(item.id(), previous);
                    }
                }
            }
        }

        self.on_actors_ready(&job.frame, Arc::new(map));
    }

    /// Instantiate pipeline bindings for every pending source. Returns true
    /// if anything was materialized.
    fn materialize_pending(factory: &Arc<dyn PipelineFactory>, inner: &mut PoolInner) -> bool {
        if inner.pending.is_empty() {
            return false;
        }
        for item in std::mem::take(&mut inner.pending) {
            let pipeline = factory.create_pipeline(&item);
            inner.pipelines.insert(item.id(), pipeline);
        }
        true
    }

    fn targets_for(
        inner: &PoolInner,
        items: &[ViewItemRef],
    ) -> Vec<(ViewItemRef, Arc<dyn RepresentationPipeline>)> {
        items
            .iter()
            .filter_map(|item| {
                inner
                    .pipelines
                    .get(&item.id())
                    .map(|pipeline| (item.clone(), pipeline.clone()))
            })
            .collect()
    }

    /// Remember the newest frame among structural (add/remove) events.
    /// Invalidation frames drive their own partial jobs and must not force a
    /// full recomputation on top.
    fn track_newest(drained: &mut Drained, frame: &FrameRef) {
        drained.newest_frame = match drained.newest_frame.take() {
            Some(newest) if newest.time >= frame.time => Some(newest),
            _ => Some(frame.clone()),
        };
    }

    fn newest_frame(requested: &Option<FrameRef>, event_frame: &Option<FrameRef>) -> Option<FrameRef> {
        match (requested, event_frame) {
            (Some(r), Some(e)) => Some(if e.time > r.time { e.clone() } else { r.clone() }),
            (Some(r), None) => Some(r.clone()),
            (None, Some(e)) => Some(e.clone()),
            (None, None) => None,
        }
    }

    /// Apply the queued registry events to the bookkeeping state.
    ///
    /// Additions become pending sources, removals drop bindings, and
    /// invalidations are collected for targeted recomputation. A lagged
    /// receiver triggers a full resync against the registry.
    fn drain_source_events(
        pipeline_kind: &str,
        kind: ItemKind,
        inner: &mut PoolInner,
    ) -> Drained {
        let mut drained = Drained::default();
        let Some(mut receiver) = inner.receiver.take() else {
            return drained;
        };

        let mut closed = false;
        loop {
            match receiver.try_recv() {
                Ok(event) => {
                    match event.kind {
                        SourceEventKind::Added => {
                            Self::track_newest(&mut drained, &event.frame);
                            for item in event.items {
                                inner.sources.insert(item.id(), item.clone());
                                inner.pending.push(item);
                            }
                        }
                        SourceEventKind::Removed => {
                            Self::track_newest(&mut drained, &event.frame);
                            for item in &event.items {
                                inner.sources.remove(&item.id());
                                if inner.pipelines.remove(&item.id()).is_some() {
                                    drained.structural_change = true;
                                } else {
                                    inner.pending.retain(|pending| pending.id() != item.id());
                                }
                            }
                        }
                        SourceEventKind::Invalidated
                        | SourceEventKind::AppearanceInvalidated => {
                            drained
                                .invalidations
                                .push((event.items, event.frame));
                        }
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => break,
                Err(broadcast::error::TryRecvError::Closed) => {
                    closed = true;
                    break;
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(pool = pipeline_kind, skipped, "source events lagged, resyncing");
                    if let Some(registry) = inner.registry.upgrade() {
                        inner.sources = registry
                            .all_of(kind)
                            .into_iter()
                            .map(|item| (item.id(), item))
                            .collect();
                        let PoolInner {
                            sources,
                            pipelines,
                            pending,
                            ..
                        } = &mut *inner;
                        pipelines.retain(|id, _| sources.contains_key(id));
                        *pending = sources
                            .values()
                            .filter(|item| !pipelines.contains_key(&item.id()))
                            .cloned()
                            .collect();
                        inner.cache.invalidate();
                        drained.structural_change = true;
                        drained.invalidations.clear();
                    }
                }
            }
        }

        if !closed {
            inner.receiver = Some(receiver);
        }
        drained
    }
}

impl std::fmt::Debug for RepresentationPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepresentationPool")
            .field("kind", &self.kind)
            .field("pipeline_kind", &self.pipeline_kind)
            .field("observers", &self.observer_count())
            .finish_non_exhaustive()
    }
}
