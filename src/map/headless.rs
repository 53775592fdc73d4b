use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    map::{Error, Layer, LayerId, MapSurface},
    shared::geo::Coordinate,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewport {
    pub container: String,
    pub center: Coordinate,
    pub zoom: f64,
}

/// In-memory surface that keeps layers without drawing anything.
/// Used for server side snapshots and tests.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    viewport: Option<Viewport>,
    layers: BTreeMap<LayerId, Layer>,
    next_id: u64,
    listening: bool,
    unavailable: Option<String>,
    attach_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub viewport: Option<Viewport>,
    pub layers: Vec<(LayerId, Layer)>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Default::default()
    }

    /// Surface whose library failed to load; every attach fails with `reason`.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            unavailable: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn set_available(&mut self) {
        self.unavailable = None;
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn layers(&self) -> impl Iterator<Item = (&LayerId, &Layer)> {
        self.layers.iter()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn polyline_count(&self) -> usize {
        self.layers
            .values()
            .filter(|layer| matches!(layer, Layer::Polyline(_)))
            .count()
    }

    pub fn marker_count(&self) -> usize {
        self.layers
            .values()
            .filter(|layer| matches!(layer, Layer::Marker(_)))
            .count()
    }

    pub fn user_marker_count(&self) -> usize {
        self.layers
            .values()
            .filter(|layer| {
                matches!(layer, Layer::Marker(marker) if marker.role == crate::map::MarkerRole::User)
            })
            .count()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Number of successful attaches over the surface lifetime.
    pub fn attach_count(&self) -> usize {
        self.attach_count
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            viewport: self.viewport.clone(),
            layers: self
                .layers
                .iter()
                .map(|(id, layer)| (*id, layer.clone()))
                .collect(),
        }
    }
}

impl MapSurface for HeadlessSurface {
    fn attach(&mut self, container: &str, center: Coordinate, zoom: f64) -> Result<(), Error> {
        if let Some(reason) = &self.unavailable {
            return Err(Error::LibraryUnavailable(reason.clone()));
        }
        if self.viewport.is_some() {
            self.detach();
        }
        self.viewport = Some(Viewport {
            container: container.to_string(),
            center,
            zoom,
        });
        self.attach_count += 1;
        Ok(())
    }

    fn detach(&mut self) {
        self.layers.clear();
        self.listening = false;
        self.viewport = None;
    }

    fn is_attached(&self) -> bool {
        self.viewport.is_some()
    }

    fn set_view(&mut self, center: Coordinate, zoom: f64) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.center = center;
            viewport.zoom = zoom;
        }
    }

    fn add_layer(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(id, layer);
        id
    }

    fn remove_layer(&mut self, id: LayerId) -> bool {
        self.layers.remove(&id).is_some()
    }

    fn set_popup(&mut self, id: LayerId, popup: String) -> bool {
        match self.layers.get_mut(&id) {
            Some(Layer::Marker(marker)) => {
                marker.popup = popup;
                true
            }
            _ => false,
        }
    }

    fn listen_clicks(&mut self, enabled: bool) {
        self.listening = enabled && self.viewport.is_some();
    }
}
