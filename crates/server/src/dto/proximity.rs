use haulmap::prelude::*;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct ProximityDto {
    pub id: Arc<str>,
    pub label: Arc<str>,
    pub kind: PoiKind,
    pub coordinate: Coordinate,
    pub distance_meters: f64,
    pub distance: String,
    pub eta_seconds: f64,
    pub eta: String,
    pub nearest: bool,
}

impl ProximityDto {
    pub fn from(point: &PointOfInterest, result: &ProximityResult) -> Self {
        Self {
            id: point.id.clone(),
            label: point.label.clone(),
            kind: point.kind,
            coordinate: point.position,
            distance_meters: result.distance.as_meters(),
            distance: result.distance.to_string(),
            eta_seconds: result.eta.as_seconds(),
            eta: result.eta.to_string(),
            nearest: result.is_nearest,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NearDto {
    pub origin: Coordinate,
    pub points: Vec<ProximityDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteOverlay>>,
}

impl NearDto {
    pub fn from(batch: &ProximityBatch, points: &[PointOfInterest]) -> Self {
        let points = points
            .iter()
            .zip(batch.iter())
            .map(|(point, result)| ProximityDto::from(point, result))
            .collect();
        Self {
            origin: batch.origin.position,
            points,
            routes: None,
        }
    }
}
