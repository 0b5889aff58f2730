use service_core::error::AppError;
use thiserror::Error;

use crate::services::completion::CompletionError;
use crate::services::guard::AccessDenied;
use crate::services::store::StoreError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Email already in use")]
    EmailAlreadyInUse,

    #[error("User not found")]
    UserNotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Completion provider error: {0}")]
    Completion(#[from] CompletionError),
}

impl From<AccessDenied> for ServiceError {
    fn from(_: AccessDenied) -> Self {
        ServiceError::PermissionDenied
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::anyhow!(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials => {
                AppError::AuthError(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::EmailAlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            }
            ServiceError::EmailAlreadyInUse => {
                AppError::Conflict(anyhow::anyhow!("Email already in use"))
            }
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::PermissionDenied => {
                AppError::Forbidden(anyhow::anyhow!("Permission denied"))
            }
            ServiceError::Completion(e) => AppError::BadGateway(e.to_string()),
        }
    }
}
