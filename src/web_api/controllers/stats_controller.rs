use axum::{extract::State, Json};

use crate::{
    api_error::ApiError,
    app_state::SharedState,
    stats_response::{ProductivityResponse, StatsResponse},
};

pub struct StatsController {}

impl StatsController {
    pub async fn stats(State(state): State<SharedState>) -> Result<Json<StatsResponse>, ApiError> {
        Ok(Json(state.analytics.stats()?))
    }

    pub async fn productivity(
        State(state): State<SharedState>) -> Result<Json<ProductivityResponse>, ApiError> {
        Ok(Json(state.analytics.productivity()?))
    }
}
