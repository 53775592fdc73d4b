use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    map::TileLayer,
    shared::{geo::Coordinate, time::Speed},
    tracker::PositionOptions,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Element the map surface attaches to.
    pub container: String,
    pub center: Coordinate,
    pub zoom: f64,
    /// Zoom used when the view jumps to the first fix or a search hit.
    pub focus_zoom: f64,
    pub tile_layer: TileLayer,
    pub speed: Speed,
    /// One-shot request made when tracking starts.
    pub initial_fix: PositionOptions,
    pub watch: PositionOptions,
    /// Fetch a driving route per point on every fix.
    pub routes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            container: "map".into(),
            center: Coordinate::new(12.9716, 77.5946),
            zoom: 12.0,
            focus_zoom: 15.0,
            tile_layer: TileLayer::default(),
            speed: Speed::CITY_DRIVING,
            initial_fix: PositionOptions {
                enable_high_accuracy: true,
                timeout: Duration::from_secs(10),
                maximum_age: Duration::from_secs(60),
            },
            watch: PositionOptions {
                enable_high_accuracy: true,
                timeout: Duration::from_secs(10),
                maximum_age: Duration::from_secs(30),
            },
            routes: true,
        }
    }
}

impl Config {
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.tile_layer = TileLayer::locationiq(key);
        self
    }
}
