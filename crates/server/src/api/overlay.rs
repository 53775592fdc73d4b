use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use haulmap::{
    map::{HeadlessSurface, MapRenderer},
    proximity::{RouteCache, RouteRequest},
    tracker::TrackedPosition,
};
use tracing::error;

use crate::{
    api::{coordinate_from_params, flag},
    state::AppState,
};

/// Every layer the map would show for a user standing at `lat,lng`.
pub async fn overlay(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let origin = TrackedPosition::from(coordinate_from_params(&params)?);
    let batch = state.engine.compute(&origin, &state.points);
    let routes = if flag(&params, "routes") {
        RouteRequest::new(0, &batch, &state.points, &RouteCache::new())
            .run(&state.locationiq)
            .await
            .overlays
    } else {
        Vec::new()
    };

    let config = &state.map_config;
    let mut renderer = MapRenderer::new(HeadlessSurface::new(), config.tile_layer.clone());
    renderer.set_markers(state.points.clone());
    renderer
        .initialize(&config.container, origin.position, config.focus_zoom)
        .map_err(|err| {
            error!("Failed to render overlay: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    renderer.show_user_marker(origin.position);
    renderer.update_proximity(Some(&batch));
    renderer.set_route_overlays(&routes);
    Ok(Json(renderer.surface().snapshot()).into_response())
}
