use axum::{routing::get, Router};

use super::API_PREFIX;
use crate::{app_state::SharedState, health_controller::HealthController};

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route(API_PREFIX, get(HealthController::root))
        .route(format!("{}/", API_PREFIX).as_str(), get(HealthController::root))
        .route(format!("{}/health", API_PREFIX).as_str(), get(HealthController::check))
        .with_state(app_state)
}
