use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use haulmap::{geocode::Geocoder, map::SelectedLocation};
use tracing::warn;

use crate::{api::coordinate_from_params, state::AppState};

/// Address for a coordinate. Always answers, falling back to the
/// coordinate itself when the geocoder fails.
pub async fn reverse(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let position = coordinate_from_params(&params)?;
    let address = match state.locationiq.reverse(position).await {
        Ok(address) => address,
        Err(err) => {
            warn!("Reverse geocoding {position} failed: {err}");
            position.to_string()
        }
    };
    Ok(Json(SelectedLocation { position, address }).into_response())
}

pub async fn search(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    if let Some(query) = params.get("q") {
        match state.search.resolve(query, &state.locationiq).await {
            Some(hit) => Ok(Json(hit).into_response()),
            None => Err(StatusCode::NOT_FOUND),
        }
    } else {
        Err(StatusCode::BAD_REQUEST)
    }
}
