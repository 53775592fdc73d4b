use std::{collections::HashMap, future::Future, sync::Arc};

use futures_util::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    poi::PointOfInterest,
    proximity::ProximityBatch,
    shared::geo::{Coordinate, GRID_CELL},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Directions request failed: {0}")]
    Request(String),
    #[error("No route between the points")]
    NoRoute,
    #[error("Directions response could not be read: {0}")]
    InvalidResponse(String),
}

/// Driving directions service.
pub trait Directions {
    /// Ordered path vertices from `origin` to `destination`.
    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<Vec<Coordinate>, Error>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteOverlay {
    pub point_id: Arc<str>,
    pub points: Arc<[Coordinate]>,
    /// Set on the route to the nearest point.
    pub emphasis: bool,
}

/// Routes fetched for the grid cell the user was last in.
/// Moving to another cell drops everything.
#[derive(Debug, Default)]
pub struct RouteCache {
    cell: Option<(i32, i32)>,
    routes: HashMap<Arc<str>, Arc<[Coordinate]>>,
}

impl RouteCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, cell: (i32, i32), point_id: &str) -> Option<Arc<[Coordinate]>> {
        if self.cell != Some(cell) {
            return None;
        }
        self.routes.get(point_id).cloned()
    }

    pub fn store(&mut self, batch: &RouteBatch) {
        if self.cell != Some(batch.cell) {
            self.routes.clear();
            self.cell = Some(batch.cell);
        }
        for (id, points) in batch.fetched.iter() {
            self.routes.insert(id.clone(), points.clone());
        }
    }

    pub fn clear(&mut self) {
        self.cell = None;
        self.routes.clear();
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Leg {
    point_id: Arc<str>,
    destination: Coordinate,
    emphasis: bool,
    cached: Option<Arc<[Coordinate]>>,
}

/// Route lookups for one proximity batch. Owns everything it needs so it
/// can be awaited apart from the widget that planned it.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    generation: u64,
    origin: Coordinate,
    cell: (i32, i32),
    legs: Vec<Leg>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteBatch {
    pub generation: u64,
    pub cell: (i32, i32),
    /// One overlay per point whose route resolved, in point order.
    pub overlays: Vec<RouteOverlay>,
    fetched: Vec<(Arc<str>, Arc<[Coordinate]>)>,
}

impl RouteBatch {
    /// Number of routes that came from the provider rather than the cache.
    pub fn fetched_count(&self) -> usize {
        self.fetched.len()
    }
}

impl RouteRequest {
    pub fn new(
        generation: u64,
        batch: &ProximityBatch,
        points: &[PointOfInterest],
        cache: &RouteCache,
    ) -> Self {
        let origin = batch.origin.position;
        let cell = origin.to_grid(GRID_CELL);
        let nearest = batch.nearest_index().filter(|_| batch.len() == points.len());
        let legs = points
            .iter()
            .enumerate()
            .map(|(idx, point)| Leg {
                point_id: point.id.clone(),
                destination: point.position,
                emphasis: nearest == Some(idx),
                cached: cache.get(cell, &point.id),
            })
            .collect();
        Self {
            generation,
            origin,
            cell,
            legs,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolves every leg concurrently. A failing leg is logged and left out,
    /// it never fails the others.
    pub async fn run<D: Directions>(self, directions: &D) -> RouteBatch {
        let origin = self.origin;
        let lookups = self.legs.iter().map(|leg| async move {
            if let Some(points) = &leg.cached {
                return Some((points.clone(), false));
            }
            match directions.route(origin, leg.destination).await {
                Ok(points) if points.len() >= 2 => Some((Arc::from(points), true)),
                Ok(_) => {
                    warn!("Route to {} came back without a path", leg.point_id);
                    None
                }
                Err(err) => {
                    warn!("Route to {} failed: {err}", leg.point_id);
                    None
                }
            }
        });
        let resolved = join_all(lookups).await;

        let mut overlays = Vec::with_capacity(self.legs.len());
        let mut fetched = Vec::new();
        for (leg, result) in self.legs.into_iter().zip(resolved) {
            let Some((points, is_fresh)) = result else {
                continue;
            };
            if is_fresh {
                fetched.push((leg.point_id.clone(), points.clone()));
            }
            overlays.push(RouteOverlay {
                point_id: leg.point_id,
                points,
                emphasis: leg.emphasis,
            });
        }
        debug!(
            "Route batch {} resolved {} overlays ({} fetched)",
            self.generation,
            overlays.len(),
            fetched.len()
        );
        RouteBatch {
            generation: self.generation,
            cell: self.cell,
            overlays,
            fetched,
        }
    }
}
