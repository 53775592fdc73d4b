use std::{fmt::Display, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    poi::PointOfInterest,
    proximity::{ProximityResult, RouteOverlay},
    shared::geo::Coordinate,
};

pub const USER_MARKER_COLOR: &str = "#4285F4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LayerId(pub(crate) u64);

impl Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// Url with `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            attribution: "© OpenStreetMap".into(),
            max_zoom: 18,
        }
    }
}

impl TileLayer {
    pub fn locationiq(key: &str) -> Self {
        Self {
            url_template: format!("https://tiles.locationiq.com/v3/streets/r/{{z}}/{{x}}/{{y}}.png?key={key}"),
            attribution: "© LocationIQ © OpenStreetMap".into(),
            max_zoom: 18,
        }
    }

    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerRole {
    Point { id: Arc<str> },
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub role: MarkerRole,
    pub position: Coordinate,
    pub color: &'static str,
    pub popup: String,
}

impl Marker {
    pub fn for_point(point: &PointOfInterest, proximity: Option<&ProximityResult>) -> Self {
        Self {
            role: MarkerRole::Point {
                id: point.id.clone(),
            },
            position: point.position,
            color: point.kind.marker_color(),
            popup: point_popup(point, proximity),
        }
    }

    pub fn for_user(position: Coordinate) -> Self {
        Self {
            role: MarkerRole::User,
            position,
            color: USER_MARKER_COLOR,
            popup: "Your location\nLive tracking active".into(),
        }
    }
}

pub(crate) fn point_popup(point: &PointOfInterest, proximity: Option<&ProximityResult>) -> String {
    let mut popup = format!("{}\nType: {}", point.label, point.kind);
    if let Some(result) = proximity {
        popup.push_str(&format!("\n{} • {}", result.distance, result.eta));
        if result.is_nearest {
            popup.push_str("\nNearest");
        }
    }
    popup
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: f32,
    pub opacity: f32,
}

impl LineStyle {
    pub const NEAREST: LineStyle = LineStyle {
        color: "#16A34A",
        weight: 6.0,
        opacity: 0.9,
    };
    pub const ROUTE: LineStyle = LineStyle {
        color: "#3B82F6",
        weight: 4.0,
        opacity: 0.6,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub point_id: Arc<str>,
    pub points: Arc<[Coordinate]>,
    pub style: LineStyle,
}

impl From<&RouteOverlay> for Polyline {
    fn from(value: &RouteOverlay) -> Self {
        Self {
            point_id: value.point_id.clone(),
            points: value.points.clone(),
            style: if value.emphasis {
                LineStyle::NEAREST
            } else {
                LineStyle::ROUTE
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum Layer {
    Tile(TileLayer),
    Marker(Marker),
    Polyline(Polyline),
}

#[test]
fn tile_url_substitution() {
    let layer = TileLayer::locationiq("pk.test");
    assert_eq!(
        layer.tile_url(12, 2931, 1898),
        "https://tiles.locationiq.com/v3/streets/r/12/2931/1898.png?key=pk.test"
    );
}
