mod view;
pub use view::*;

use std::{rc::Rc, sync::Arc};

use futures_util::future::LocalBoxFuture;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::{
    config::Config,
    geocode::{Geocoder, SearchControl, SearchHit},
    map::{self, MapRenderer, MapSurface, SelectedLocation},
    poi::PointOfInterest,
    proximity::{Directions, ProximityBatch, ProximityEngine, RouteBatch, RouteCache, RouteRequest},
    shared::geo::Coordinate,
    tracker::{
        GeolocationError, GeolocationProvider, LocationTracker, TrackedPosition, TrackerEvent,
        TrackerState,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    StartTracking,
    StopTracking,
    /// Clears a location notice and tries again, re-enabling the toggle.
    RetryTracking,
    DismissNotice,
    RetryMap,
    Click(Coordinate),
    Search(String),
}

pub type CommandSender = mpsc::UnboundedSender<Command>;
pub type CommandReceiver = mpsc::UnboundedReceiver<Command>;

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::unbounded_channel()
}

enum Step {
    Command(Option<Command>),
    Tracker(TrackerEvent),
    Routes(RouteBatch),
}

/// Live map: renderer, tracker and proximity engine wired together on one
/// event loop.
///
/// Every fix bumps the generation. At most one route batch is in flight.
/// When it lands it is drawn unless a newer batch is already on the map, and
/// if fixes arrived meanwhile the next batch is planned from the latest one.
/// Slow directions therefore never starve the map and an older batch never
/// replaces a newer one.
pub struct Widget<S, G, C, D>
where
    S: MapSurface,
    G: GeolocationProvider,
    C: Geocoder,
    D: Directions + 'static,
{
    config: Config,
    renderer: MapRenderer<S>,
    tracker: LocationTracker<G>,
    engine: ProximityEngine,
    geocoder: C,
    directions: Rc<D>,
    search: SearchControl,
    points: Arc<[PointOfInterest]>,
    generation: u64,
    drawn_generation: u64,
    recenter_on_fix: bool,
    proximity: Option<ProximityBatch>,
    route_cache: RouteCache,
    in_flight: Option<LocalBoxFuture<'static, RouteBatch>>,
    notice: Option<GeolocationError>,
    toggle_enabled: bool,
    selected: Option<SelectedLocation>,
    last_search: Option<SearchHit>,
    view: watch::Sender<WidgetView>,
}

impl<S, G, C, D> Widget<S, G, C, D>
where
    S: MapSurface,
    G: GeolocationProvider,
    C: Geocoder,
    D: Directions + 'static,
{
    pub fn new(
        config: Config,
        surface: S,
        geolocation: G,
        geocoder: C,
        directions: D,
        points: impl Into<Arc<[PointOfInterest]>>,
    ) -> Self {
        let points: Arc<[PointOfInterest]> = points.into();
        let (view, _) = watch::channel(WidgetView::default());
        Self {
            renderer: MapRenderer::new(surface, config.tile_layer.clone()),
            tracker: LocationTracker::new(geolocation, config.initial_fix, config.watch),
            engine: ProximityEngine::new(config.speed),
            geocoder,
            directions: Rc::new(directions),
            search: SearchControl::new(points.clone()),
            points,
            generation: 0,
            drawn_generation: 0,
            recenter_on_fix: false,
            proximity: None,
            route_cache: RouteCache::new(),
            in_flight: None,
            notice: None,
            toggle_enabled: true,
            selected: None,
            last_search: None,
            view,
            config,
        }
    }

    pub fn renderer(&self) -> &MapRenderer<S> {
        &self.renderer
    }

    pub fn tracker(&self) -> &LocationTracker<G> {
        &self.tracker
    }

    pub fn directions(&self) -> &D {
        &self.directions
    }

    pub fn proximity(&self) -> Option<&ProximityBatch> {
        self.proximity.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending_routes(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetView> {
        self.view.subscribe()
    }

    pub fn on_map_click<F>(&mut self, callback: F)
    where
        F: FnMut(&SelectedLocation) + 'static,
    {
        self.renderer.on_map_click(callback);
    }

    pub fn view(&self) -> WidgetView {
        let tracking = matches!(
            self.tracker.state(),
            TrackerState::Tracking | TrackerState::RequestingPermission
        );
        WidgetView {
            map: self.renderer.status().clone(),
            tracker: self.tracker.state(),
            toggle: Toggle {
                action: if tracking {
                    ToggleAction::Stop
                } else {
                    ToggleAction::Start
                },
                enabled: self.toggle_enabled,
            },
            notice: self.notice,
            user_position: self.tracker.last_position(),
            proximity: self.proximity.clone(),
            route_count: self.renderer.route_count(),
            selected: self.selected.clone(),
            search: self.last_search.clone(),
        }
    }

    fn publish(&self) {
        self.view.send_replace(self.view());
    }

    /// Draws the map and the point markers.
    pub fn mount(&mut self) -> Result<(), map::Error> {
        self.renderer.set_markers(self.points.clone());
        let result = self
            .renderer
            .initialize(&self.config.container, self.config.center, self.config.zoom);
        self.publish();
        result
    }

    /// Re-creates the map after a failed mount and redraws live overlays.
    pub fn retry_map(&mut self) -> Result<(), map::Error> {
        self.mount()?;
        if let Some(position) = self.tracker.last_position() {
            self.apply_position(position);
        }
        self.publish();
        Ok(())
    }

    pub fn unmount(&mut self) {
        self.tracker.stop();
        self.clear_results();
        self.renderer.teardown();
        self.publish();
        debug!("Widget unmounted");
    }

    /// Opens the permission prompt and returns right away. The first fix
    /// arrives as a tracker event.
    pub fn begin_tracking(&mut self) -> Result<TrackerState, GeolocationError> {
        if !self.toggle_enabled {
            debug!("Tracking toggle is disabled until retried");
            return Err(self.notice.unwrap_or(GeolocationError::PermissionDenied));
        }
        let result = self.tracker.request();
        match result {
            Ok(TrackerState::RequestingPermission) => self.recenter_on_fix = true,
            Ok(_) => {}
            Err(err) => self.location_failed(err),
        }
        self.publish();
        result
    }

    /// Like [`Widget::begin_tracking`] but waits for the first fix.
    pub async fn start_tracking(&mut self) -> Result<TrackerState, GeolocationError> {
        if self.begin_tracking()? != TrackerState::RequestingPermission {
            return Ok(self.tracker.state());
        }
        let event = self.tracker.next_event().await;
        self.handle_event(event);
        match self.tracker.state() {
            TrackerState::Error(err) => Err(err),
            state => Ok(state),
        }
    }

    pub fn stop_tracking(&mut self) {
        self.tracker.stop();
        self.clear_results();
        self.publish();
    }

    fn reset_toggle(&mut self) {
        self.toggle_enabled = true;
        self.notice = None;
    }

    pub async fn retry_tracking(&mut self) -> Result<TrackerState, GeolocationError> {
        self.reset_toggle();
        self.start_tracking().await
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
        self.publish();
    }

    pub async fn click(&mut self, position: Coordinate) -> SelectedLocation {
        let location = self.renderer.handle_click(position, &self.geocoder).await;
        self.selected = Some(location.clone());
        self.publish();
        location
    }

    pub async fn search(&mut self, query: &str) -> Option<SearchHit> {
        let hit = self.search.resolve(query, &self.geocoder).await;
        if let Some(hit) = &hit {
            self.renderer.set_view(hit.position(), self.config.focus_zoom);
        }
        self.last_search = hit.clone();
        self.publish();
        hit
    }

    fn location_failed(&mut self, err: GeolocationError) {
        self.notice = Some(err);
        if err == GeolocationError::PermissionDenied {
            self.toggle_enabled = false;
        }
        self.clear_results();
    }

    /// Recomputes everything for a new fix. Routes are planned right away
    /// unless a batch is still in flight, in which case the next batch is
    /// planned from the latest fix once that one lands.
    pub fn apply_position(&mut self, position: TrackedPosition) {
        self.generation += 1;
        let batch = self.engine.compute(&position, &self.points);
        self.renderer.show_user_marker(position.position);
        self.renderer.update_proximity(Some(&batch));
        self.proximity = Some(batch);
        if self.in_flight.is_none() {
            self.plan_routes();
        }
    }

    fn plan_routes(&mut self) {
        if !self.config.routes || self.points.is_empty() {
            return;
        }
        let Some(batch) = self.proximity.as_ref() else {
            return;
        };
        let request = RouteRequest::new(self.generation, batch, &self.points, &self.route_cache);
        let directions = Rc::clone(&self.directions);
        self.in_flight = Some(Box::pin(async move { request.run(&*directions).await }));
    }

    /// Puts a resolved route batch on the map. Returns false when tracking
    /// stopped or a newer batch is already drawn. Routes fetched by a
    /// discarded batch still go to the cache.
    pub fn apply_routes(&mut self, batch: RouteBatch) -> bool {
        if !self.tracker.is_tracking() {
            debug!("Discarding route batch {}, not tracking", batch.generation);
            return false;
        }
        self.route_cache.store(&batch);
        if batch.generation <= self.drawn_generation || batch.generation > self.generation {
            debug!(
                "Discarding route batch {} (drawn {}, current {})",
                batch.generation, self.drawn_generation, self.generation
            );
            return false;
        }
        self.renderer.set_route_overlays(&batch.overlays);
        self.drawn_generation = batch.generation;
        if batch.generation < self.generation && self.in_flight.is_none() {
            self.plan_routes();
        }
        true
    }

    /// Waits for the routes of the latest fix and applies them.
    pub async fn settle_routes(&mut self) -> bool {
        match self.in_flight.take() {
            Some(routes) => {
                let batch = routes.await;
                let applied = self.apply_routes(batch);
                self.publish();
                applied
            }
            None => false,
        }
    }

    fn clear_results(&mut self) {
        self.generation += 1;
        self.drawn_generation = self.generation;
        self.recenter_on_fix = false;
        self.in_flight = None;
        self.proximity = None;
        self.route_cache.clear();
        self.renderer.clear_user_marker();
        self.renderer.update_proximity(None);
        self.renderer.set_route_overlays(&[]);
    }

    pub fn handle_event(&mut self, event: TrackerEvent) {
        match event {
            TrackerEvent::Position(position) => {
                self.notice = None;
                if std::mem::take(&mut self.recenter_on_fix) {
                    self.renderer.set_view(position.position, self.config.focus_zoom);
                }
                self.apply_position(position);
            }
            TrackerEvent::Error(err) if !self.tracker.is_tracking() => self.location_failed(err),
            TrackerEvent::Error(err) => {
                debug!("Location glitch while tracking: {err}");
                self.notice = Some(err);
            }
            TrackerEvent::Stopped => self.clear_results(),
        }
        self.publish();
    }

    pub async fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartTracking => {
                let _ = self.begin_tracking();
            }
            Command::StopTracking => self.stop_tracking(),
            Command::RetryTracking => {
                self.reset_toggle();
                let _ = self.begin_tracking();
            }
            Command::DismissNotice => self.dismiss_notice(),
            Command::RetryMap => {
                let _ = self.retry_map();
            }
            Command::Click(position) => {
                self.click(position).await;
            }
            Command::Search(query) => {
                self.search(&query).await;
            }
        }
    }

    /// Event loop. Runs until every command sender is dropped, then
    /// unmounts.
    pub async fn run(&mut self, mut commands: CommandReceiver) {
        info!("Widget event loop started");
        loop {
            let step = tokio::select! {
                biased;
                command = commands.recv() => Step::Command(command),
                event = self.tracker.next_event() => Step::Tracker(event),
                batch = wait_routes(&mut self.in_flight) => Step::Routes(batch),
            };
            match step {
                Step::Command(None) => break,
                Step::Command(Some(command)) => self.handle_command(command).await,
                Step::Tracker(event) => self.handle_event(event),
                Step::Routes(batch) => {
                    self.apply_routes(batch);
                    self.publish();
                }
            }
        }
        self.unmount();
        info!("Widget event loop finished");
    }
}

async fn wait_routes(in_flight: &mut Option<LocalBoxFuture<'static, RouteBatch>>) -> RouteBatch {
    match in_flight.as_mut() {
        Some(routes) => {
            let batch = routes.await;
            *in_flight = None;
            batch
        }
        None => std::future::pending().await,
    }
}
