pub mod health_routes;
pub mod stats_routes;
pub mod task_routes;

use std::time::Duration;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{app_state::SharedState, settings::Settings};

pub const API_PREFIX: &str = "/api";

pub fn map_routes(app_state: SharedState) -> Router {
    Router::new()
        .merge(health_routes::get_router(app_state.clone()))
        .merge(task_routes::get_router(app_state.clone()))
        .merge(stats_routes::get_router(app_state))
}

/// The routes plus request tracing, the per-request timeout and open CORS.
pub fn build_app(app_state: SharedState, settings: &Settings) -> Router {
    map_routes(app_state)
        .layer(TimeoutLayer::new(Duration::from_secs(settings.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
