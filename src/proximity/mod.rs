pub mod route;
pub use route::{Directions, RouteBatch, RouteCache, RouteOverlay, RouteRequest};

use std::sync::Arc;

use serde::Serialize;

use crate::{
    poi::PointOfInterest,
    shared::{
        geo::Distance,
        time::{Duration, Speed},
    },
    tracker::TrackedPosition,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityResult {
    pub point_id: Arc<str>,
    pub distance: Distance,
    /// Straight-line time at a fixed speed. Not a routed estimate.
    pub eta: Duration,
    pub is_nearest: bool,
}

/// Results for every point against one tracked position, in point order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityBatch {
    pub origin: TrackedPosition,
    pub results: Vec<ProximityResult>,
    nearest: Option<usize>,
}

impl ProximityBatch {
    pub fn get(&self, id: &str) -> Option<&ProximityResult> {
        self.results.iter().find(|result| &*result.point_id == id)
    }

    /// Position of the nearest result, which is also the nearest point's
    /// index in the list the batch was computed from.
    pub fn nearest_index(&self) -> Option<usize> {
        self.nearest
    }

    pub fn nearest(&self) -> Option<&ProximityResult> {
        self.nearest.map(|idx| &self.results[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProximityResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityEngine {
    speed: Speed,
}

impl ProximityEngine {
    pub fn new(speed: Speed) -> Self {
        Self { speed }
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Full recompute of distance, time and nearest flag for `points`.
    pub fn compute(&self, origin: &TrackedPosition, points: &[PointOfInterest]) -> ProximityBatch {
        let mut results: Vec<ProximityResult> = points
            .iter()
            .map(|point| {
                let distance = origin.position.distance(&point.position);
                ProximityResult {
                    point_id: point.id.clone(),
                    distance,
                    eta: self.speed.time_for(distance),
                    is_nearest: false,
                }
            })
            .collect();

        let nearest = nearest_index(results.iter().map(|result| result.distance));
        if let Some(idx) = nearest {
            results[idx].is_nearest = true;
        }
        ProximityBatch {
            origin: *origin,
            results,
            nearest,
        }
    }
}

/// Index of the smallest distance. The first one wins on ties.
pub fn nearest_index<I>(distances: I) -> Option<usize>
where
    I: IntoIterator<Item = Distance>,
{
    let mut best: Option<(usize, Distance)> = None;
    for (idx, distance) in distances.into_iter().enumerate() {
        match best {
            Some((_, current)) if distance.total_cmp(&current).is_ge() => {}
            _ => best = Some((idx, distance)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[test]
fn nearest_first_tie_wins() {
    let distances = [3.0, 1.0, 1.0, 2.0].map(Distance::from_meters);
    assert_eq!(nearest_index(distances), Some(1));
}

#[test]
fn nearest_empty() {
    assert_eq!(nearest_index(Vec::<Distance>::new()), None);
}

#[test]
fn nearest_skips_nan() {
    let distances = [f64::NAN, 5.0, 4.0].map(Distance::from_meters);
    assert_eq!(nearest_index(distances), Some(2));
}
