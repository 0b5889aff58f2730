use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::auth::{LoginRequest, RegisterRequest},
    utils::ValidatedJson,
    AppState,
};

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.auth_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.auth_service.login(req).await?;
    Ok((StatusCode::OK, Json(res)))
}
