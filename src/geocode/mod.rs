mod search;
pub use search::*;

use std::future::Future;

use thiserror::Error;

use crate::shared::geo::Coordinate;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Geocoding request failed: {0}")]
    Request(String),
    #[error("Geocoding returned no result")]
    NoResult,
    #[error("Geocoding response could not be read: {0}")]
    InvalidResponse(String),
}

/// Address lookup service.
pub trait Geocoder {
    /// Coordinate to a human readable address.
    fn reverse(&self, position: Coordinate) -> impl Future<Output = Result<String, Error>>;

    /// Free text query to the best matching coordinate.
    fn forward(&self, query: &str) -> impl Future<Output = Result<Coordinate, Error>>;
}
