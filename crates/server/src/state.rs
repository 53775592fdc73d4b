use std::sync::Arc;

use haulmap::prelude::*;

use crate::locationiq::LocationIq;

pub struct AppState {
    pub points: Arc<[PointOfInterest]>,
    pub engine: ProximityEngine,
    pub search: SearchControl,
    pub locationiq: LocationIq,
    pub map_config: Config,
}

impl AppState {
    pub fn new(points: Vec<PointOfInterest>, locationiq: LocationIq, map_config: Config) -> Self {
        let points: Arc<[PointOfInterest]> = points.into();
        Self {
            engine: ProximityEngine::new(map_config.speed),
            search: SearchControl::new(points.clone()),
            points,
            locationiq,
            map_config,
        }
    }
}
