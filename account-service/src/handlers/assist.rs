use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::assist::{RecommendationRequest, RecommendationResponse},
    middleware::AuthUser,
    services::{AccessGuard, AccessPolicy, ServiceError},
    utils::ValidatedJson,
    AppState,
};

const SYSTEM_PROMPT: &str = "You are an assistant that recommends competitions to enter.";

/// Forward a recommendation request to the chat-completion provider.
pub async fn recommendation(
    State(state): State<AppState>,
    caller: AuthUser,
    ValidatedJson(req): ValidatedJson<RecommendationRequest>,
) -> Result<impl IntoResponse, AppError> {
    AccessGuard::authorize(Some(&caller.0), AccessPolicy::AdminOnly, None)
        .map_err(ServiceError::from)?;

    let prompt = format!(
        "Recommend competitions for gender {} and category {}.",
        req.gender, req.category
    );

    let data = state
        .completion
        .complete(SYSTEM_PROMPT, &prompt)
        .await
        .map_err(ServiceError::Completion)?;

    Ok(Json(RecommendationResponse {
        status: "success".to_string(),
        data,
    }))
}
