use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::user::UpdateUserRequest,
    middleware::AuthUser,
    models::{UserResponse, UserUpdate},
    services::{AccessGuard, AccessPolicy, ServiceError},
    utils::{Password, ValidatedJson},
    AppState,
};

pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let users = state
        .store
        .list_users()
        .await
        .map_err(ServiceError::Database)?;

    let response: Vec<UserResponse> = users.iter().map(|u| u.sanitized()).collect();
    Ok(Json(response))
}

pub async fn get_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store
        .find_user_by_id(id)
        .await
        .map_err(ServiceError::Database)?
        .ok_or(ServiceError::UserNotFound)?;

    Ok(Json(user.sanitized()))
}

pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    AccessGuard::authorize(Some(&caller.0), AccessPolicy::SelfOrAdmin, Some(id))
        .map_err(ServiceError::from)?;

    let existing = state
        .store
        .find_user_by_id(id)
        .await
        .map_err(ServiceError::Database)?
        .ok_or(ServiceError::UserNotFound)?;

    if let Some(ref new_email) = req.email {
        if new_email != &existing.email
            && state
                .store
                .email_exists(new_email, Some(id))
                .await
                .map_err(ServiceError::Database)?
        {
            return Err(ServiceError::EmailAlreadyInUse.into());
        }
    }

    // A new password replaces the stored digest wholesale; absence keeps it.
    let password_hash = match req.password {
        Some(new_password) => {
            let hasher = state.hasher.clone();
            let password = Password::new(new_password);
            let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
                .await
                .map_err(|e| {
                    ServiceError::Internal(anyhow::anyhow!("Hashing task failed: {}", e))
                })?
                .map_err(ServiceError::Internal)?;
            Some(hash.into_string())
        }
        None => None,
    };

    let updated = state
        .store
        .update_user(
            id,
            UserUpdate {
                name: req.name,
                email: req.email,
                password_hash,
            },
        )
        .await
        .map_err(ServiceError::Database)?
        .ok_or(ServiceError::UserNotFound)?;

    tracing::info!(user_id = %id, actor = %caller.0.sub, "User updated");

    Ok(Json(updated.sanitized()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    AccessGuard::authorize(Some(&caller.0), AccessPolicy::AdminOnly, Some(id))
        .map_err(ServiceError::from)?;

    let deleted = state
        .store
        .delete_user(id)
        .await
        .map_err(ServiceError::Database)?;

    if deleted == 0 {
        return Err(ServiceError::UserNotFound.into());
    }

    tracing::info!(user_id = %id, actor = %caller.0.sub, "User deleted");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "User deleted successfully"
        })),
    ))
}
