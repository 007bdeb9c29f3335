use axum::{routing::get, Router};

use super::API_PREFIX;
use crate::{app_state::SharedState, stats_controller::StatsController};

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route(format!("{}/stats", API_PREFIX).as_str(), get(StatsController::stats))
        .route(
            format!("{}/analytics/productivity", API_PREFIX).as_str(),
            get(StatsController::productivity),
        )
        .with_state(app_state)
}
