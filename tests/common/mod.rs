#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    time::Duration,
};

use haulmap::{
    geocode::{self, Geocoder},
    poi::{PoiKind, PointOfInterest},
    proximity::route::{self, Directions},
    shared::Coordinate,
};

pub fn bangalore_points() -> Vec<PointOfInterest> {
    vec![
        PointOfInterest::new(
            "1",
            Coordinate::new(12.9716, 77.5946),
            "JCB 3DX Super - Available",
            PoiKind::Provider,
        ),
        PointOfInterest::new(
            "2",
            Coordinate::new(12.9700, 77.5950),
            "JCB 3CX Eco - Available",
            PoiKind::Provider,
        ),
        PointOfInterest::new(
            "3",
            Coordinate::new(12.9680, 77.5920),
            "Excavation Project - Active Job",
            PoiKind::Request,
        ),
    ]
}

/// Straight two-point routes, failing for the listed destinations.
#[derive(Default)]
pub struct LineDirections {
    pub failing: Vec<Coordinate>,
    pub calls: Cell<usize>,
}

impl LineDirections {
    pub fn failing_for(destinations: &[Coordinate]) -> Self {
        Self {
            failing: destinations.to_vec(),
            calls: Cell::new(0),
        }
    }
}

impl Directions for LineDirections {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<Coordinate>, route::Error> {
        self.calls.set(self.calls.get() + 1);
        if self.failing.contains(&destination) {
            Err(route::Error::Request("upstream 502".into()))
        } else {
            Ok(vec![origin, destination])
        }
    }
}

/// Straight two-point routes that take `delay` to arrive.
pub struct SlowDirections {
    pub delay: Duration,
    pub calls: Cell<usize>,
}

impl SlowDirections {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: Cell::new(0),
        }
    }
}

impl Directions for SlowDirections {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<Coordinate>, route::Error> {
        self.calls.set(self.calls.get() + 1);
        tokio::time::sleep(self.delay).await;
        Ok(vec![origin, destination])
    }
}

/// Geocoder with canned answers. `None` makes the call fail.
pub struct CannedGeocoder {
    pub address: Option<String>,
    pub place: Option<Coordinate>,
    pub forward_queries: RefCell<Vec<String>>,
}

impl CannedGeocoder {
    pub fn offline() -> Self {
        Self {
            address: None,
            place: None,
            forward_queries: RefCell::new(Vec::new()),
        }
    }

    pub fn answering(address: &str, place: Coordinate) -> Self {
        Self {
            address: Some(address.to_string()),
            place: Some(place),
            forward_queries: RefCell::new(Vec::new()),
        }
    }
}

impl Geocoder for CannedGeocoder {
    async fn reverse(&self, _position: Coordinate) -> Result<String, geocode::Error> {
        self.address
            .clone()
            .ok_or(geocode::Error::Request("connection refused".into()))
    }

    async fn forward(&self, query: &str) -> Result<Coordinate, geocode::Error> {
        self.forward_queries.borrow_mut().push(query.to_string());
        self.place.ok_or(geocode::Error::NoResult)
    }
}
