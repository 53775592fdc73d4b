mod geocode;
mod near;
mod overlay;

pub use geocode::*;
pub use near::*;
pub use overlay::*;

use axum::http::StatusCode;
use haulmap::shared::Coordinate;
use std::collections::HashMap;

fn coordinate_from_params(params: &HashMap<String, String>) -> Result<Coordinate, StatusCode> {
    let latitude: f64 = params
        .get("lat")
        .ok_or(StatusCode::BAD_REQUEST)?
        .parse()
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let longitude: f64 = params
        .get("lng")
        .ok_or(StatusCode::BAD_REQUEST)?
        .parse()
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let coordinate = Coordinate::new(latitude, longitude);
    if coordinate.is_valid() {
        Ok(coordinate)
    } else {
        Err(StatusCode::BAD_REQUEST)
    }
}

fn flag(params: &HashMap<String, String>, name: &str) -> bool {
    params
        .get(name)
        .map(|value| value == "true" || value == "1")
        .unwrap_or(false)
}
