use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use haulmap::{
    proximity::{RouteCache, RouteRequest},
    tracker::TrackedPosition,
};

use crate::{
    api::{coordinate_from_params, flag},
    dto::NearDto,
    state::AppState,
};

pub async fn near(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let origin = TrackedPosition::from(coordinate_from_params(&params)?);
    let batch = state.engine.compute(&origin, &state.points);
    let mut dto = NearDto::from(&batch, &state.points);

    if flag(&params, "routes") {
        let request = RouteRequest::new(0, &batch, &state.points, &RouteCache::new());
        let routes = request.run(&state.locationiq).await;
        dto.routes = Some(routes.overlays);
    }
    Ok(Json(dto).into_response())
}
