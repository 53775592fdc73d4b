use crate::{
    map::{Error, Layer, LayerId},
    shared::geo::Coordinate,
};

/// Drawing surface of a map library. The renderer is the only writer.
///
/// Implementations hand out a fresh [`LayerId`] for every layer added and
/// must forget a layer once it is removed or the surface is detached.
pub trait MapSurface {
    /// Binds the surface to `container`. Fails when the container does not
    /// exist or the map library could not be loaded.
    fn attach(&mut self, container: &str, center: Coordinate, zoom: f64) -> Result<(), Error>;

    /// Drops every layer and listener and unbinds from the container.
    fn detach(&mut self);

    fn is_attached(&self) -> bool;

    fn set_view(&mut self, center: Coordinate, zoom: f64);

    fn add_layer(&mut self, layer: Layer) -> LayerId;

    /// Returns false when `id` is not on the surface.
    fn remove_layer(&mut self, id: LayerId) -> bool;

    fn set_popup(&mut self, id: LayerId, popup: String) -> bool;

    /// Enables or disables delivery of clicks on empty map space.
    fn listen_clicks(&mut self, enabled: bool);
}
