use axum::extract::FromRequest;

use super::api_error::ApiError;

/// `axum::Json`, but a body that fails to parse comes back as a 422
/// `ApiError` instead of axum's plain-text rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ValidJson<T>(pub T);
