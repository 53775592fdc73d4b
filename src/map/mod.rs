mod headless;
mod layer;
mod surface;

pub use headless::*;
pub use layer::*;
pub use surface::*;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    geocode::Geocoder,
    poi::PointOfInterest,
    proximity::{ProximityBatch, RouteOverlay},
    shared::geo::Coordinate,
};

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum Error {
    #[error("Map container is missing")]
    MissingContainer,
    #[error("Map library failed to load: {0}")]
    LibraryUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum Status {
    #[default]
    Uninitialized,
    Ready,
    Failed(Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedLocation {
    pub position: Coordinate,
    pub address: String,
}

pub type ClickHandler = Box<dyn FnMut(&SelectedLocation)>;

/// Owns a map surface and every overlay drawn on it.
///
/// Layer handles for markers, the user marker and route lines are tracked
/// here so each update replaces the previous set instead of piling up.
pub struct MapRenderer<S: MapSurface> {
    surface: S,
    tile_layer: TileLayer,
    status: Status,
    view: Option<(Coordinate, f64)>,
    tile: Option<LayerId>,
    points: Arc<[PointOfInterest]>,
    proximity: Option<ProximityBatch>,
    markers: Vec<LayerId>,
    user_marker: Option<LayerId>,
    routes: Vec<LayerId>,
    on_click: Option<ClickHandler>,
}

impl<S: MapSurface> MapRenderer<S> {
    pub fn new(surface: S, tile_layer: TileLayer) -> Self {
        Self {
            surface,
            tile_layer,
            status: Status::Uninitialized,
            view: None,
            tile: None,
            points: Arc::from(Vec::new()),
            proximity: None,
            markers: Vec::new(),
            user_marker: None,
            routes: Vec::new(),
            on_click: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == Status::Ready
    }

    /// Attaches the surface and draws tiles and point markers.
    /// Any previous surface is released first.
    pub fn initialize(&mut self, container: &str, center: Coordinate, zoom: f64) -> Result<(), Error> {
        self.release();
        if container.trim().is_empty() {
            return Err(self.fail(Error::MissingContainer));
        }
        if let Err(err) = self.surface.attach(container, center, zoom) {
            return Err(self.fail(err));
        }
        self.view = Some((center, zoom));
        self.tile = Some(self.surface.add_layer(Layer::Tile(self.tile_layer.clone())));
        self.status = Status::Ready;
        self.draw_markers();
        if self.on_click.is_some() {
            self.surface.listen_clicks(true);
        }
        debug!("Map initialized in {container} at {center} zoom {zoom}");
        Ok(())
    }

    fn fail(&mut self, err: Error) -> Error {
        warn!("Map initialization failed: {err}");
        self.status = Status::Failed(err.clone());
        err
    }

    /// Removes every layer and listener and detaches the surface.
    /// Safe to call repeatedly or before `initialize`.
    pub fn teardown(&mut self) {
        self.release();
        self.on_click = None;
        self.status = Status::Uninitialized;
    }

    fn release(&mut self) {
        if !self.surface.is_attached() {
            self.clear_handles();
            return;
        }
        let layers = self
            .routes
            .drain(..)
            .chain(self.markers.drain(..))
            .chain(self.user_marker.take())
            .chain(self.tile.take())
            .collect::<Vec<_>>();
        for id in layers {
            self.surface.remove_layer(id);
        }
        self.surface.listen_clicks(false);
        self.surface.detach();
        self.view = None;
        debug!("Map surface released");
    }

    fn clear_handles(&mut self) {
        self.routes.clear();
        self.markers.clear();
        self.user_marker = None;
        self.tile = None;
        self.view = None;
    }

    pub fn set_view(&mut self, center: Coordinate, zoom: f64) {
        if self.is_ready() {
            self.surface.set_view(center, zoom);
            self.view = Some((center, zoom));
        }
    }

    pub fn view(&self) -> Option<(Coordinate, f64)> {
        self.view
    }

    /// Replaces all point markers.
    pub fn set_markers(&mut self, points: impl Into<Arc<[PointOfInterest]>>) {
        self.points = points.into();
        if self.is_ready() {
            self.draw_markers();
        }
    }

    fn draw_markers(&mut self) {
        for id in self.markers.drain(..) {
            self.surface.remove_layer(id);
        }
        let batch = Self::matching_proximity(&self.proximity, &self.points);
        for (idx, point) in self.points.iter().enumerate() {
            let proximity = batch.and_then(|batch| batch.results.get(idx));
            let id = self
                .surface
                .add_layer(Layer::Marker(Marker::for_point(point, proximity)));
            self.markers.push(id);
        }
    }

    /// Refreshes marker popups with distance and time, or clears them.
    pub fn update_proximity(&mut self, batch: Option<&ProximityBatch>) {
        self.proximity = batch.cloned();
        if !self.is_ready() {
            return;
        }
        let batch = Self::matching_proximity(&self.proximity, &self.points);
        for (idx, (point, id)) in self.points.iter().zip(self.markers.iter()).enumerate() {
            let proximity = batch.and_then(|batch| batch.results.get(idx));
            self.surface.set_popup(*id, point_popup(point, proximity));
        }
    }

    /// The current batch, if it was computed for the current point list.
    /// Results line up with points by index.
    fn matching_proximity<'a>(
        proximity: &'a Option<ProximityBatch>,
        points: &[PointOfInterest],
    ) -> Option<&'a ProximityBatch> {
        proximity
            .as_ref()
            .filter(|batch| batch.len() == points.len())
    }

    pub fn show_user_marker(&mut self, position: Coordinate) {
        self.clear_user_marker();
        if self.is_ready() {
            let id = self
                .surface
                .add_layer(Layer::Marker(Marker::for_user(position)));
            self.user_marker = Some(id);
        }
    }

    pub fn clear_user_marker(&mut self) {
        if let Some(id) = self.user_marker.take() {
            self.surface.remove_layer(id);
        }
    }

    pub fn has_user_marker(&self) -> bool {
        self.user_marker.is_some()
    }

    /// Swaps the full set of route lines for `routes`.
    pub fn set_route_overlays(&mut self, routes: &[RouteOverlay]) {
        for id in self.routes.drain(..) {
            self.surface.remove_layer(id);
        }
        if !self.is_ready() {
            return;
        }
        for route in routes {
            let id = self.surface.add_layer(Layer::Polyline(route.into()));
            self.routes.push(id);
        }
        debug!("Drew {} route overlays", self.routes.len());
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn on_map_click<F>(&mut self, callback: F)
    where
        F: FnMut(&SelectedLocation) + 'static,
    {
        self.on_click = Some(Box::new(callback));
        if self.is_ready() {
            self.surface.listen_clicks(true);
        }
    }

    /// Resolves a click on empty map space to an address and hands it to the
    /// click callback. Falls back to `"{lat}, {lng}"` when geocoding fails.
    pub async fn handle_click<G: Geocoder>(
        &mut self,
        position: Coordinate,
        geocoder: &G,
    ) -> SelectedLocation {
        let address = match geocoder.reverse(position).await {
            Ok(address) => address,
            Err(err) => {
                warn!("Reverse geocoding {position} failed: {err}");
                position.to_string()
            }
        };
        let location = SelectedLocation { position, address };
        if let Some(callback) = self.on_click.as_mut() {
            callback(&location);
        }
        location
    }
}
