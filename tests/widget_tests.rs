mod common;

use std::time::Duration;

use common::{CannedGeocoder, LineDirections, SlowDirections, bangalore_points};
use haulmap::{
    config::Config,
    geocode::SearchHit,
    map::{HeadlessSurface, Status},
    poi::PointOfInterest,
    proximity::{Directions, RouteCache, RouteRequest},
    shared::Coordinate,
    tracker::{GeolocationError, SimulatedGeolocation, TrackedPosition, TrackerEvent, TrackerState},
    widget::{Command, ToggleAction, Widget, command_channel},
};

type TestWidget = Widget<HeadlessSurface, SimulatedGeolocation, CannedGeocoder, LineDirections>;

fn fix(latitude: f64, longitude: f64) -> TrackedPosition {
    TrackedPosition::new(Coordinate::new(latitude, longitude), Some(8.0))
}

fn widget(device: &SimulatedGeolocation) -> TestWidget {
    widget_with(device, LineDirections::default(), bangalore_points())
}

fn widget_with<D: Directions + 'static>(
    device: &SimulatedGeolocation,
    directions: D,
    points: Vec<PointOfInterest>,
) -> Widget<HeadlessSurface, SimulatedGeolocation, CannedGeocoder, D> {
    Widget::new(
        Config::default(),
        HeadlessSurface::new(),
        device.clone(),
        CannedGeocoder::answering("Cubbon Park, Bengaluru", Coordinate::new(12.9763, 77.5929)),
        directions,
        points,
    )
}

#[tokio::test]
async fn tracking_draws_user_and_routes() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    let mut widget = widget(&device);
    widget.mount().unwrap();

    assert_eq!(widget.start_tracking().await, Ok(TrackerState::Tracking));
    assert_eq!(widget.renderer().view(), Some((Coordinate::new(12.9700, 77.5950), 15.0)));
    assert!(widget.renderer().has_user_marker());
    assert!(widget.has_pending_routes());

    let proximity = widget.proximity().unwrap();
    assert_eq!(proximity.nearest().unwrap().point_id.as_ref(), "2");

    assert!(widget.settle_routes().await);
    assert_eq!(widget.renderer().route_count(), 3);

    let view = widget.view();
    assert_eq!(view.toggle.action, ToggleAction::Stop);
    assert_eq!(view.toggle.label(), "Stop Live Location");
    assert_eq!(view.route_count, 3);
}

#[tokio::test]
async fn denied_permission_disables_toggle() {
    let device = SimulatedGeolocation::denied();
    let mut widget = widget(&device);
    widget.mount().unwrap();

    assert_eq!(
        widget.start_tracking().await,
        Err(GeolocationError::PermissionDenied)
    );
    let view = widget.view();
    assert_eq!(view.toggle.action, ToggleAction::Start);
    assert_eq!(view.toggle.label(), "Live Location");
    assert!(!view.toggle.enabled);
    assert_eq!(view.notice, Some(GeolocationError::PermissionDenied));
    assert_eq!(view.tracker, TrackerState::Error(GeolocationError::PermissionDenied));
    assert_eq!(device.active_watches(), 0);
    assert!(view.proximity.is_none());

    // The toggle stays off until the user retries.
    assert!(widget.start_tracking().await.is_err());
    assert_eq!(device.fix_requests(), 1);

    device.set_fix(Ok(fix(12.9700, 77.5950)));
    assert_eq!(widget.retry_tracking().await, Ok(TrackerState::Tracking));
    let view = widget.view();
    assert!(view.toggle.enabled);
    assert!(view.notice.is_none());
    assert_eq!(device.active_watches(), 1);
}

#[tokio::test]
async fn dismissing_notice_keeps_toggle_state() {
    let device = SimulatedGeolocation::denied();
    let mut widget = widget(&device);
    widget.mount().unwrap();
    let _ = widget.start_tracking().await;

    widget.dismiss_notice();
    let view = widget.view();
    assert!(view.notice.is_none());
    assert!(!view.toggle.enabled);
}

#[tokio::test]
async fn older_route_batch_never_replaces_newer() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    let mut widget = widget(&device);
    widget.mount().unwrap();
    widget.start_tracking().await.unwrap();
    let planned_for = widget.generation();
    let old = widget.proximity().unwrap().clone();

    // A fix while routes are in flight waits for them instead of dropping them.
    widget.handle_event(TrackerEvent::Position(fix(12.9681, 77.5921)));
    assert_eq!(widget.generation(), planned_for + 1);
    assert!(widget.has_pending_routes());

    // The first batch lands and the next one is planned from the newest fix.
    assert!(widget.settle_routes().await);
    assert_eq!(widget.renderer().route_count(), 3);
    assert!(widget.has_pending_routes());
    assert!(widget.settle_routes().await);
    assert!(!widget.has_pending_routes());

    let stale = RouteRequest::new(planned_for, &old, &bangalore_points(), &RouteCache::new())
        .run(&LineDirections::default())
        .await;
    assert!(!widget.apply_routes(stale));
    assert_eq!(widget.renderer().route_count(), 3);
    assert_eq!(widget.proximity().unwrap().nearest().unwrap().point_id.as_ref(), "3");
}

#[tokio::test]
async fn outdated_batch_fills_route_cache() {
    let here = fix(12.9700, 77.5950);
    let device = SimulatedGeolocation::new(here);
    let mut widget = widget(&device);
    widget.mount().unwrap();
    widget.start_tracking().await.unwrap();

    widget.handle_event(TrackerEvent::Position(here));
    widget.settle_routes().await;
    widget.settle_routes().await;

    assert_eq!(widget.directions().calls.get(), 3);
    assert_eq!(widget.renderer().route_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn slow_routes_still_land_while_moving() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    let mut widget = widget_with(
        &device,
        SlowDirections::new(Duration::from_millis(100)),
        bangalore_points(),
    );
    widget.mount().unwrap();
    let mut view = widget.subscribe();
    let (tx, rx) = command_channel();

    let handle = device.clone();
    let driver = async move {
        tx.send(Command::StartTracking).unwrap();
        view.wait_for(|state| state.tracker == TrackerState::Tracking)
            .await
            .unwrap();
        // One fix every 25 ms for a second, each in a new grid cell.
        for step in 1..=40 {
            tokio::time::sleep(Duration::from_millis(25)).await;
            handle.push(Ok(fix(12.9700 + f64::from(step) * 0.0003, 77.5950)));
        }
        let drawn = view.borrow().route_count;
        tx.send(Command::StopTracking).unwrap();
        drop(tx);
        drawn
    };

    let (_, drawn) = tokio::join!(widget.run(rx), driver);
    assert_eq!(drawn, 3);
    assert!(widget.directions().calls.get() < 3 * 41);
}

#[tokio::test]
async fn failed_route_leaves_distance_in_place() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    let points = bangalore_points();
    let points = vec![points[0].clone(), points[2].clone()];
    let directions = LineDirections::failing_for(&[points[1].position]);
    let mut widget = widget_with(&device, directions, points);
    widget.mount().unwrap();

    widget.start_tracking().await.unwrap();
    assert!(widget.settle_routes().await);

    assert_eq!(widget.renderer().surface().polyline_count(), 1);
    let view = widget.view();
    assert_eq!(view.route_count, 1);
    let proximity = view.proximity.unwrap();
    assert_eq!(proximity.len(), 2);
    assert!(proximity.get("3").unwrap().distance.as_meters() > 0.0);
    assert!(proximity.get("1").unwrap().distance.as_meters() > 0.0);
}

#[tokio::test]
async fn next_fix_clears_location_notice() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    let mut widget = widget(&device);
    widget.mount().unwrap();
    widget.start_tracking().await.unwrap();

    widget.handle_event(TrackerEvent::Error(GeolocationError::Timeout));
    assert_eq!(widget.view().notice, Some(GeolocationError::Timeout));
    assert_eq!(widget.view().tracker, TrackerState::Tracking);

    widget.handle_event(TrackerEvent::Position(fix(12.9701, 77.5950)));
    assert!(widget.view().notice.is_none());
}

#[tokio::test]
async fn loop_keeps_running_while_prompt_is_open() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    device.hold_prompt();
    let mut widget = widget(&device);
    widget.mount().unwrap();
    let mut view = widget.subscribe();
    let (tx, rx) = command_channel();

    let handle = device.clone();
    let driver = async move {
        tx.send(Command::StartTracking).unwrap();
        let action = view
            .wait_for(|state| state.tracker == TrackerState::RequestingPermission)
            .await
            .unwrap()
            .toggle
            .action;
        assert_eq!(action, ToggleAction::Stop);

        tx.send(Command::Click(Coordinate::new(12.98, 77.6))).unwrap();
        view.wait_for(|state| state.selected.is_some()).await.unwrap();

        tx.send(Command::StopTracking).unwrap();
        view.wait_for(|state| state.tracker == TrackerState::Idle)
            .await
            .unwrap();
        handle.answer_prompt();
        tokio::task::yield_now().await;
        drop(tx);
    };

    tokio::join!(widget.run(rx), driver);
    assert_eq!(device.fix_requests(), 1);
    assert_eq!(device.active_watches(), 0);
    assert!(widget.proximity().is_none());
    assert_eq!(widget.renderer().status(), &Status::Uninitialized);
}

#[tokio::test]
async fn stop_discards_pending_routes() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    let mut widget = widget(&device);
    widget.mount().unwrap();
    widget.start_tracking().await.unwrap();
    let generation = widget.generation();
    let batch = widget.proximity().unwrap().clone();

    widget.stop_tracking();
    assert!(!widget.has_pending_routes());
    assert!(!widget.settle_routes().await);

    let late = RouteRequest::new(generation, &batch, &bangalore_points(), &RouteCache::new())
        .run(&LineDirections::default())
        .await;
    assert!(!widget.apply_routes(late));

    let view = widget.view();
    assert_eq!(view.tracker, TrackerState::Idle);
    assert_eq!(view.route_count, 0);
    assert!(view.proximity.is_none());
    assert!(!widget.renderer().has_user_marker());
    assert_eq!(widget.renderer().surface().polyline_count(), 0);
    assert_eq!(device.active_watches(), 0);
}

#[tokio::test]
async fn tracking_works_without_map() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    let mut widget = Widget::new(
        Config::default(),
        HeadlessSurface::unavailable("offline"),
        device.clone(),
        CannedGeocoder::offline(),
        LineDirections::default(),
        bangalore_points(),
    );
    assert!(widget.mount().is_err());
    assert!(matches!(widget.view().map, Status::Failed(_)));

    widget.start_tracking().await.unwrap();
    assert!(widget.proximity().is_some());
    assert!(!widget.renderer().has_user_marker());
    widget.settle_routes().await;
    assert_eq!(widget.renderer().route_count(), 0);
}

#[tokio::test]
async fn click_and_search() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    let mut widget = widget(&device);
    widget.mount().unwrap();

    let location = widget.click(Coordinate::new(12.98, 77.6)).await;
    assert_eq!(location.address, "Cubbon Park, Bengaluru");
    assert_eq!(widget.view().selected, Some(location));

    let hit = widget.search("3dx").await.unwrap();
    assert_eq!(
        hit,
        SearchHit::Point {
            id: "1".into(),
            position: Coordinate::new(12.9716, 77.5946),
        }
    );
    assert_eq!(
        widget.renderer().view(),
        Some((Coordinate::new(12.9716, 77.5946), 15.0))
    );
}

#[tokio::test]
async fn unmount_releases_everything() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    let mut widget = widget(&device);
    widget.mount().unwrap();
    widget.start_tracking().await.unwrap();
    widget.settle_routes().await;

    widget.unmount();
    widget.unmount();
    assert_eq!(device.active_watches(), 0);
    assert_eq!(widget.renderer().surface().layer_count(), 0);
    assert_eq!(widget.renderer().status(), &Status::Uninitialized);
}

#[tokio::test]
async fn event_loop_end_to_end() {
    let device = SimulatedGeolocation::new(fix(12.9700, 77.5950));
    let mut widget = widget(&device);
    widget.mount().unwrap();
    let mut view = widget.subscribe();
    let (tx, rx) = command_channel();

    let handle = device.clone();
    let moved = fix(12.9681, 77.5921);
    let driver = async move {
        tx.send(Command::StartTracking).unwrap();
        view.wait_for(|state| state.route_count == 3).await.unwrap();

        handle.push(Ok(moved));
        view.wait_for(|state| state.user_position == Some(moved)).await.unwrap();
        view.wait_for(|state| {
            state
                .proximity
                .as_ref()
                .and_then(|batch| batch.nearest())
                .is_some_and(|nearest| nearest.point_id.as_ref() == "3")
        })
        .await
        .unwrap();

        tx.send(Command::StopTracking).unwrap();
        view.wait_for(|state| state.tracker == TrackerState::Idle && state.route_count == 0)
            .await
            .unwrap();
        drop(tx);
    };

    tokio::join!(widget.run(rx), driver);
    assert_eq!(device.active_watches(), 0);
    assert_eq!(widget.renderer().status(), &Status::Uninitialized);
}
