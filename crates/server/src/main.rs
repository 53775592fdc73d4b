mod api;
mod config;
mod dto;
mod locationiq;
mod state;

use crate::{config::Config, locationiq::LocationIq, state::AppState};
use axum::routing::get;
use std::{sync::Arc, time::Instant};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let args: Vec<_> = std::env::args().collect();
    if args.len() < 2 {
        error!("Missing points csv");
        std::process::exit(1);
    }
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };
    if config.locationiq_key.is_empty() {
        warn!("LOCATIONIQ_KEY is empty, geocoding and routes will fall back");
    }

    info!("Loading points...");
    let now = Instant::now();
    let points = match haulmap::poi::load_csv(&args[1]) {
        Ok(points) => points,
        Err(err) => {
            error!("Failed to load points from {}: {err}", args[1]);
            std::process::exit(1);
        }
    };
    info!("Loaded {} points in {:?}", points.len(), now.elapsed());

    let locationiq = LocationIq::new(&config.locationiq_url, &config.locationiq_key);
    let map_config = haulmap::config::Config::default().with_api_key(&config.locationiq_key);
    let state = Arc::new(AppState::new(points, locationiq, map_config));

    let app = axum::Router::new()
        .route("/near", get(api::near))
        .route("/reverse", get(api::reverse))
        .route("/search", get(api::search))
        .route("/overlay", get(api::overlay))
        .with_state(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {}: {err}", config.port);
            std::process::exit(1);
        }
    };
    info!("Listening to port {}", config.port);
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
    }
}
