//! Manager activation, no-op suppression, render-request coalescing and
//! clone fan-out.

mod common;

use common::{actors_with, config, frame_at, scene, stack, StubFactory};
use std::sync::Arc;
use voxelview_core::{
    FrameClock, ItemKind, ManagerFlags, ManagerStatus, RepresentationManager, RepresentationPool,
    SourceRegistry, TimeStamp, ViewId, ViewState,
};

/// A one-stack scene wired to a slice manager attached to a view.
fn slice_scene() -> (
    Arc<FrameClock>,
    Arc<SourceRegistry>,
    Arc<StubFactory>,
    Arc<RepresentationPool>,
    Arc<RepresentationManager>,
) {
    let (clock, registry) = scene();
    let factory = StubFactory::new("slice");
    let pool = RepresentationPool::new(ItemKind::Stack, factory.clone(), &config());
    pool.set_sources(&registry);
    registry.insert(vec![stack("cortex")]);

    let manager = RepresentationManager::new(
        "Slice",
        "Slice representation of stacks",
        "slice.svg",
        ManagerFlags::actors(),
        &config(),
    );
    manager.add_pool(pool.clone());
    manager.set_view(Some(ViewId::new()));

    (clock, registry, factory, pool, manager)
}

#[test]
fn show_observes_pools_and_goes_pending() {
    let (clock, _registry, _factory, pool, manager) = slice_scene();
    assert!(!manager.is_active());
    assert_eq!(pool.observer_count(), 0);

    let frame = clock.stamp();
    manager.show(&frame);

    assert!(manager.is_active());
    assert_eq!(pool.observer_count(), 1);
    assert_eq!(manager.status(), ManagerStatus::PendingDisplay);
    assert_eq!(manager.last_render_request(), frame.time);
    assert_eq!(pool.last_update_timestamp(), frame.time);
}

#[test]
fn identical_state_changes_are_suppressed() {
    let (clock, _registry, factory, _pool, manager) = slice_scene();
    let shown = clock.stamp_with(ViewState::default().with_crosshair([1.0, 2.0, 3.0]));
    manager.show(&shown);
    let invocations = factory.invocations();
    let mut requests = manager.subscribe_render_requests();

    let frame = clock.stamp();
    manager.on_crosshair_changed([1.0, 2.0, 3.0], &frame);
    manager.on_scene_resolution_changed([0.0, 0.0, 0.0], &frame);
    manager.on_scene_bounds_changed([0.0; 6], &frame);

    assert_eq!(factory.invocations(), invocations);
    assert!(requests.try_recv().is_err());
    assert_eq!(manager.last_render_request(), shown.time);
}

#[test]
fn accepted_changes_recompute_and_request_render() {
    let (clock, _registry, factory, pool, manager) = slice_scene();
    manager.show(&clock.stamp());
    let invocations = factory.invocations();
    let mut requests = manager.subscribe_render_requests();

    let frame = clock.stamp_with(ViewState::default().with_crosshair([5.0, 0.0, 0.0]));
    manager.on_crosshair_changed([5.0, 0.0, 0.0], &frame);

    assert_eq!(factory.invocations(), invocations + 1);
    assert_eq!(requests.try_recv().unwrap().time, frame.time);
    assert_eq!(manager.status(), ManagerStatus::PendingDisplay);
    assert_eq!(pool.last_update_timestamp(), frame.time);
    assert_eq!(manager.current_state().crosshair, [5.0, 0.0, 0.0]);
}

#[test]
fn render_requests_are_coalesced() {
    let (_clock, _registry, _factory, _pool, manager) = slice_scene();
    let mut requests = manager.subscribe_render_requests();

    manager.emit_render_request(TimeStamp::from(5));
    manager.emit_render_request(TimeStamp::from(5));
    manager.emit_render_request(TimeStamp::from(3));

    assert_eq!(requests.try_recv().unwrap().time, TimeStamp::from(5));
    assert!(requests.try_recv().is_err());

    manager.emit_render_request(TimeStamp::from(6));
    assert_eq!(requests.try_recv().unwrap().time, TimeStamp::from(6));
}

#[test]
fn hide_releases_observation() {
    let (clock, _registry, factory, pool, manager) = slice_scene();
    manager.show(&clock.stamp());
    let shown_request = manager.last_render_request();

    let frame = clock.stamp();
    manager.hide(&frame);

    assert!(!manager.is_active());
    assert_eq!(pool.observer_count(), 0);
    assert_eq!(manager.status(), ManagerStatus::PendingDisplay);
    assert!(manager.last_render_request() > shown_request);

    // Changes while hidden cost nothing.
    let invocations = factory.invocations();
    pool.set_view_state(&clock.stamp_with(ViewState::default().with_crosshair([9.0, 0.0, 0.0])));
    assert_eq!(factory.invocations(), invocations);
}

#[test]
fn hiding_twice_does_not_release_twice() {
    let (clock, _registry, _factory, pool, manager) = slice_scene();
    manager.show(&clock.stamp());
    manager.hide(&clock.stamp());
    manager.hide(&clock.stamp());
    assert_eq!(pool.observer_count(), 0);
}

#[test]
fn pools_added_while_active_are_observed_immediately() {
    let (clock, _registry, _factory, _pool, manager) = slice_scene();
    manager.show(&clock.stamp());

    let extra = RepresentationPool::new(ItemKind::Stack, StubFactory::new("mesh"), &config());
    manager.add_pool(extra.clone());

    assert_eq!(extra.observer_count(), 1);
}

#[test]
fn clone_shares_pools_and_follows_its_parent() {
    let (clock, _registry, _factory, pool, manager) = slice_scene();
    manager.show(&clock.stamp());

    let child = manager.clone_manager(&config());
    assert!(child.is_active());
    assert_eq!(pool.observer_count(), 2);

    // The child can hide on its own without touching its parent.
    child.hide(&clock.stamp());
    assert!(manager.is_active());
    assert_eq!(pool.observer_count(), 1);

    // Activation fans out parent to children.
    manager.show(&clock.stamp());
    assert!(child.is_active());
    assert_eq!(pool.observer_count(), 2);

    manager.hide(&clock.stamp());
    assert!(!child.is_active());
    assert_eq!(pool.observer_count(), 0);
}

#[test]
fn ready_range_is_the_intersection_of_pool_ranges() {
    let a = RepresentationPool::new(ItemKind::Stack, StubFactory::new("slice"), &config());
    let b = RepresentationPool::new(ItemKind::Stack, StubFactory::new("mesh"), &config());
    a.on_actors_ready(&frame_at(5), actors_with(5));
    a.on_actors_ready(&frame_at(7), actors_with(7));
    b.on_actors_ready(&frame_at(7), actors_with(70));
    b.on_actors_ready(&frame_at(9), actors_with(90));

    let manager = RepresentationManager::new(
        "Combined",
        "Slice and mesh",
        "combined.svg",
        ManagerFlags::actors(),
        &config(),
    );
    manager.add_pool(a);
    manager.add_pool(b);
    manager.show(&frame_at(9));

    assert_eq!(manager.ready_range(), vec![TimeStamp::from(7)]);
}

#[test]
fn inactive_ready_range_is_the_last_render_request() {
    let (clock, _registry, _factory, _pool, manager) = slice_scene();
    manager.show(&clock.stamp());
    let frame = clock.stamp();
    manager.hide(&frame);

    assert_eq!(manager.ready_range(), vec![frame.time]);
}

#[test]
fn display_returns_actors_and_settles_idle() {
    let (clock, _registry, _factory, _pool, manager) = slice_scene();
    let frame = clock.stamp();
    manager.show(&frame);
    assert_eq!(manager.status(), ManagerStatus::PendingDisplay);

    let shown = manager.display(&frame);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].len(), 1);
    assert_eq!(manager.status(), ManagerStatus::Idle);
}

#[test]
fn display_on_a_stale_frame_stays_pending() {
    let (clock, _registry, _factory, _pool, manager) = slice_scene();
    let first = clock.stamp();
    manager.show(&first);

    let bounds = [0.0, 10.0, 0.0, 10.0, 0.0, 10.0];
    let second = clock.stamp_with(ViewState::default().with_bounds(bounds));
    manager.on_scene_bounds_changed(bounds, &second);

    let shown = manager.display(&first);
    assert!(!shown.is_empty());
    assert_eq!(manager.status(), ManagerStatus::PendingDisplay);

    manager.display(&second);
    assert_eq!(manager.status(), ManagerStatus::Idle);
}

#[test]
fn inactive_display_returns_nothing() {
    let (clock, _registry, _factory, _pool, manager) = slice_scene();
    manager.show(&clock.stamp());
    let frame = clock.stamp();
    manager.hide(&frame);

    assert!(manager.display(&frame).is_empty());
    assert_eq!(manager.status(), ManagerStatus::Idle);
}

#[test]
fn actorless_managers_pull_nothing_and_settle_immediately() {
    let pool = RepresentationPool::new(ItemKind::Stack, StubFactory::new("slice"), &config());
    pool.on_actors_ready(&frame_at(5), actors_with(5));

    let manager = RepresentationManager::new(
        "Crosshair",
        "Crosshair overlay",
        "crosshair.svg",
        ManagerFlags::default(),
        &config(),
    );
    manager.add_pool(pool);
    manager.set_view(Some(ViewId::new()));
    manager.show(&frame_at(1));

    // Nothing actor-backed to show, so activation leaves it idle.
    assert_eq!(manager.status(), ManagerStatus::Idle);

    // A newer pool publication does not keep an actorless manager pending.
    let shown = manager.display(&frame_at(2));
    assert!(shown.is_empty());
    assert_eq!(manager.status(), ManagerStatus::Idle);
}

#[test]
fn detaching_the_view_clears_pending_display() {
    let (clock, _registry, _factory, _pool, manager) = slice_scene();
    manager.show(&clock.stamp());
    assert_eq!(manager.status(), ManagerStatus::PendingDisplay);

    manager.set_view(None);
    assert_eq!(manager.status(), ManagerStatus::Idle);
}
