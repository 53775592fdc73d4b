use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    geocode::Geocoder,
    poi::PointOfInterest,
    shared::{self, geo::Coordinate},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SearchHit {
    /// A point on the map whose label matched.
    Point { id: Arc<str>, position: Coordinate },
    /// A place found by the geocoder.
    Place { position: Coordinate },
}

impl SearchHit {
    pub fn position(&self) -> Coordinate {
        match self {
            SearchHit::Point { position, .. } => *position,
            SearchHit::Place { position } => *position,
        }
    }
}

/// Search bar backend: matches point labels first and asks the geocoder
/// only when nothing on the map fits.
pub struct SearchControl {
    points: Arc<[PointOfInterest]>,
}

impl SearchControl {
    pub fn new(points: impl Into<Arc<[PointOfInterest]>>) -> Self {
        Self {
            points: points.into(),
        }
    }

    pub fn set_points(&mut self, points: impl Into<Arc<[PointOfInterest]>>) {
        self.points = points.into();
    }

    pub fn matching_points(&self, query: &str) -> Vec<&PointOfInterest> {
        shared::search(query, &self.points[..])
    }

    pub async fn resolve<G: Geocoder>(&self, query: &str, geocoder: &G) -> Option<SearchHit> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        if let Some(point) = self.matching_points(query).first() {
            debug!("Search {query:?} matched point {}", point.id);
            return Some(SearchHit::Point {
                id: point.id.clone(),
                position: point.position,
            });
        }
        match geocoder.forward(query).await {
            Ok(position) => Some(SearchHit::Place { position }),
            Err(err) => {
                warn!("Forward geocoding {query:?} failed: {err}");
                None
            }
        }
    }
}
