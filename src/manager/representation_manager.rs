//! # Representation Manager
//!
//! Per-view coordinator deciding when pools recompute and when results are
//! displayed or hidden.
//!
//! One concrete type covers every representation variant; what used to be a
//! specialization hierarchy is a flat [`ManagerFlags`] capability record
//! plus the set of pools the manager draws from. Managers can be cloned so
//! one logical representation drives several views: activation changes fan
//! out parent → children, never the other way around.

use crate::config::CoreConfig;
use crate::events::{EventPublisher, RenderRequest};
use crate::manager::status::{ManagerFlags, ManagerStatus};
use crate::model::{Actors, FrameRef, TimeRange, TimeStamp, ViewState};
use crate::pool::RepresentationPool;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};
use uuid::Uuid;

/// Opaque identity of an attached view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-view controller over one or more representation pools.
pub struct RepresentationManager {
    name: String,
    description: String,
    icon: String,
    flags: ManagerFlags,
    render_requests: EventPublisher<RenderRequest>,
    inner: RwLock<ManagerInner>,
}

struct ManagerInner {
    pools: Vec<Arc<RepresentationPool>>,
    view: Option<ViewId>,
    active: bool,
    status: ManagerStatus,
    state: ViewState,
    last_render_request: TimeStamp,
    children: Vec<Arc<RepresentationManager>>,
}

impl RepresentationManager {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        flags: ManagerFlags,
        config: &CoreConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
            flags,
            render_requests: EventPublisher::new(config.render_channel_capacity),
            inner: RwLock::new(ManagerInner {
                pools: Vec::new(),
                view: None,
                active: false,
                status: ManagerStatus::Idle,
                state: ViewState::default(),
                last_render_request: TimeStamp::ZERO,
                children: Vec::new(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn flags(&self) -> ManagerFlags {
        self.flags
    }

    pub fn is_active(&self) -> bool {
        self.inner.read().active
    }

    pub fn status(&self) -> ManagerStatus {
        self.inner.read().status
    }

    pub fn current_state(&self) -> ViewState {
        self.inner.read().state
    }

    pub fn last_render_request(&self) -> TimeStamp {
        self.inner.read().last_render_request
    }

    /// The pool handles this manager draws from.
    pub fn pools(&self) -> Vec<Arc<RepresentationPool>> {
        self.inner.read().pools.clone()
    }

    /// Add a pool handle. An already-active manager starts observing the
    /// pool immediately.
    pub fn add_pool(&self, pool: Arc<RepresentationPool>) {
        let active = {
            let mut inner = self.inner.write();
            inner.pools.push(pool.clone());
            inner.active
        };
        if active {
            pool.increment_observers();
        }
    }

    /// Attach to (or detach from) a view. Detaching clears any pending
    /// display obligation.
    pub fn set_view(&self, view: Option<ViewId>) {
        let mut inner = self.inner.write();
        inner.view = view;
        if view.is_none() {
            inner.status = ManagerStatus::Idle;
        }
    }

    /// Activate the manager: start observing its pools, trigger an update
    /// for `frame` on each of them, and fan the activation out to clones.
    pub fn show(&self, frame: &FrameRef) {
        let (to_observe, to_update, children) = {
            let mut inner = self.inner.write();
            let was_active = inner.active;
            inner.active = true;
            inner.state = frame.state;

            let to_observe = if was_active {
                Vec::new()
            } else {
                inner.pools.clone()
            };
            let to_update = if inner.view.is_some() {
                inner.pools.clone()
            } else {
                Vec::new()
            };
            (to_observe, to_update, inner.children.clone())
        };

        for pool in &to_observe {
            pool.increment_observers();
        }
        for pool in &to_update {
            pool.set_view_state(frame);
        }

        {
            let mut inner = self.inner.write();
            if inner.view.is_some() && self.has_representations(&inner) {
                inner.status = ManagerStatus::PendingDisplay;
            }
        }

        debug!(manager = self.name, frame = %frame.time, "shown");
        self.emit_render_request(frame.time);

        for child in children {
            child.show(frame);
        }
    }

    /// Deactivate the manager: stop observing its pools, request a hide at
    /// `frame`, and fan the deactivation out to clones.
    pub fn hide(&self, frame: &FrameRef) {
        let (to_release, had_displayed, children) = {
            let mut inner = self.inner.write();
            let was_active = inner.active;
            inner.active = false;

            let to_release = if was_active {
                inner.pools.clone()
            } else {
                Vec::new()
            };
            let had_displayed = inner.view.is_some() && self.has_representations(&inner);
            if had_displayed {
                inner.status = ManagerStatus::PendingDisplay;
            }
            (to_release, had_displayed, inner.children.clone())
        };

        for pool in &to_release {
            pool.decrement_observers();
        }

        debug!(manager = self.name, frame = %frame.time, "hidden");
        if had_displayed || !to_release.is_empty() {
            self.emit_render_request(frame.time);
        }

        for child in children {
            child.hide(frame);
        }
    }

    /// Crosshair intake. A value equal to the current one is suppressed
    /// entirely: no cache churn, no render request.
    pub fn on_crosshair_changed(&self, crosshair: [f64; 3], frame: &FrameRef) {
        if !self.accept_crosshair_change(crosshair) {
            trace!(manager = self.name, "crosshair change suppressed");
            return;
        }
        self.apply_state_change(frame, |state| state.crosshair = crosshair);
    }

    /// Scene resolution intake; no-ops are suppressed.
    pub fn on_scene_resolution_changed(&self, resolution: [f64; 3], frame: &FrameRef) {
        if !self.accept_resolution_change(resolution) {
            trace!(manager = self.name, "resolution change suppressed");
            return;
        }
        self.apply_state_change(frame, |state| state.resolution = resolution);
    }

    /// Scene bounds intake; no-ops are suppressed.
    pub fn on_scene_bounds_changed(&self, bounds: [f64; 6], frame: &FrameRef) {
        if !self.accept_bounds_change(bounds) {
            trace!(manager = self.name, "bounds change suppressed");
            return;
        }
        self.apply_state_change(frame, |state| state.bounds = bounds);
    }

    pub fn accept_crosshair_change(&self, crosshair: [f64; 3]) -> bool {
        self.inner.read().state.crosshair != crosshair
    }

    pub fn accept_resolution_change(&self, resolution: [f64; 3]) -> bool {
        self.inner.read().state.resolution != resolution
    }

    pub fn accept_bounds_change(&self, bounds: [f64; 6]) -> bool {
        self.inner.read().state.bounds != bounds
    }

    /// Pull-style display: materialize the actors valid at `frame` for the
    /// attached view. Returns one actor map per pool with published output;
    /// an inactive manager (or one whose capabilities include no actors)
    /// returns nothing and the view should clear.
    ///
    /// A manager that needs actors stays [`ManagerStatus::PendingDisplay`]
    /// while any pool has published something newer than `frame`; one that
    /// does not (widget-style overlays) settles to idle right away.
    pub fn display(&self, frame: &FrameRef) -> Vec<Actors> {
        let (pools, active, attached) = {
            let inner = self.inner.read();
            (inner.pools.clone(), inner.active, inner.view.is_some())
        };

        let actors = if active && attached && self.flags.has_actors {
            pools
                .iter()
                .filter(|pool| !pool.ready_range().is_empty())
                .map(|pool| pool.actors_at(frame.time))
                .collect()
        } else {
            Vec::new()
        };

        let mut inner = self.inner.write();
        let newest_published = inner
            .pools
            .iter()
            .map(|pool| pool.last_update_timestamp())
            .max()
            .unwrap_or(TimeStamp::ZERO);
        let pending_newer = self.flags.needs_actors && newest_published > frame.time;
        if !pending_newer {
            inner.status = ManagerStatus::Idle;
        }

        actors
    }

    /// Create a child manager sharing this manager's identity, capability
    /// flags, pools and current activation. Future `show`/`hide` calls on
    /// this manager fan out to the child; the child never affects its
    /// parent.
    pub fn clone_manager(self: &Arc<Self>, config: &CoreConfig) -> Arc<Self> {
        let (pools, active, state) = {
            let inner = self.inner.read();
            (inner.pools.clone(), inner.active, inner.state)
        };

        let child = Arc::new(Self {
            name: self.name.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            flags: self.flags,
            render_requests: EventPublisher::new(config.render_channel_capacity),
            inner: RwLock::new(ManagerInner {
                pools: pools.clone(),
                view: None,
                active,
                status: ManagerStatus::Idle,
                state,
                last_render_request: TimeStamp::ZERO,
                children: Vec::new(),
            }),
        });

        // The child counts as its own observer on the shared pools.
        if active {
            for pool in &pools {
                pool.increment_observers();
            }
        }

        self.inner.write().children.push(child.clone());
        debug!(manager = self.name, "manager cloned");
        child
    }

    /// Coalesced render notification: at most one per advancing timestamp.
    /// Requests at or below the last emitted timestamp are dropped.
    pub fn emit_render_request(&self, time: TimeStamp) {
        {
            let mut inner = self.inner.write();
            if time <= inner.last_render_request {
                return;
            }
            inner.last_render_request = time;
        }
        self.render_requests.publish(RenderRequest::new(time));
    }

    /// Subscribe to coalesced render requests.
    pub fn subscribe_render_requests(&self) -> broadcast::Receiver<RenderRequest> {
        self.render_requests.subscribe()
    }

    /// What can currently be displayed without blocking.
    ///
    /// Active: the intersection of the pools' ready ranges. Inactive: a
    /// degenerate range holding the last render-request timestamp, so
    /// dependents of a hidden manager never stall waiting for it.
    pub fn ready_range(&self) -> TimeRange {
        let inner = self.inner.read();
        if !inner.active {
            return vec![inner.last_render_request];
        }

        let mut ranges = inner.pools.iter().map(|pool| pool.ready_range());
        let Some(first) = ranges.next() else {
            return Vec::new();
        };
        ranges.fold(first, |acc, range| {
            acc.into_iter().filter(|t| range.contains(t)).collect()
        })
    }

    fn has_representations(&self, inner: &ManagerInner) -> bool {
        self.flags.has_actors && inner.pools.iter().any(|pool| pool.has_sources())
    }

    /// Record an accepted state change and, if the manager is active,
    /// forward it to every pool at `frame`.
    fn apply_state_change(&self, frame: &FrameRef, change: impl FnOnce(&mut ViewState)) {
        let (to_update, active) = {
            let mut inner = self.inner.write();
            change(&mut inner.state);
            if inner.active && self.has_representations(&inner) {
                inner.status = ManagerStatus::PendingDisplay;
            }
            let to_update = if inner.active {
                inner.pools.clone()
            } else {
                Vec::new()
            };
            (to_update, inner.active)
        };

        for pool in &to_update {
            pool.set_view_state(frame);
        }
        if active {
            self.emit_render_request(frame.time);
        }
    }
}

impl fmt::Debug for RepresentationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepresentationManager")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("active", &self.is_active())
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
