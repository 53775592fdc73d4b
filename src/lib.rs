//! Live location tracking and proximity for equipment rental maps.
//!
//! The crate is split the same way the widget is: [`map`] owns the drawing
//! surface, [`tracker`] owns device location, [`proximity`] turns a position
//! and a list of points into distances, times and routes, and [`widget`]
//! wires the three together on a single event loop.

pub mod config;
pub mod geocode;
pub mod map;
pub mod poi;
pub mod proximity;
pub mod shared;
pub mod tracker;
pub mod widget;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::geocode::{Geocoder, SearchControl, SearchHit};
    pub use crate::map::{HeadlessSurface, MapRenderer, MapSurface, SelectedLocation};
    pub use crate::poi::{PoiKind, PointOfInterest};
    pub use crate::proximity::{
        Directions, ProximityBatch, ProximityEngine, ProximityResult, RouteOverlay,
    };
    pub use crate::shared::{Coordinate, Distance, Duration, Speed};
    pub use crate::tracker::{
        GeolocationError, GeolocationProvider, LocationTracker, SimulatedGeolocation,
        TrackedPosition, TrackerState,
    };
    pub use crate::widget::{Command, Widget, WidgetView};
}
