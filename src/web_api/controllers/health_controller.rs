use axum::{extract::State, Json};

use crate::{
    api_error::ApiError,
    app_state::SharedState,
    health_response::{HealthResponse, RootResponse},
    iso_timestamp::IsoTimestamp,
};

pub struct HealthController {}

impl HealthController {
    pub async fn root() -> Json<RootResponse> {
        Json(RootResponse::default())
    }

    pub async fn check(State(state): State<SharedState>) -> Result<Json<HealthResponse>, ApiError> {
        if let Err(e) = state.store.ping() {
            tracing::warn!(error = %e, "health check failed");
            return Err(ApiError::Unavailable(format!("Database connection failed: {e}")));
        }
        Ok(Json(HealthResponse::healthy(IsoTimestamp::from_naive(state.clock.now()))))
    }
}
