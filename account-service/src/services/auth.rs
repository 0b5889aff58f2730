use chrono::Utc;
use std::sync::Arc;

use crate::{
    dtos::auth::{LoginRequest, LoginResponse, RegisterRequest},
    models::{NewUser, Role, UserResponse},
    services::{RecordStore, ServiceError, TokenService},
    utils::{CredentialHasher, Password, PasswordHashString},
};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn RecordStore>,
    hasher: CredentialHasher,
    jwt: TokenService,
}

impl AuthService {
    pub fn new(store: Arc<dyn RecordStore>, hasher: CredentialHasher, jwt: TokenService) -> Self {
        Self { store, hasher, jwt }
    }

    /// Register a new account with role `user`.
    ///
    /// No token is issued on registration; the caller logs in afterwards.
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, ServiceError> {
        if self.store.email_exists(&req.email, None).await? {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        // Hashing is deliberately expensive; keep it off the async runtime.
        let hasher = self.hasher.clone();
        let password = Password::new(req.password);
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Hashing task failed: {}", e))??;

        let user = self
            .store
            .create_user(NewUser {
                name: req.name,
                email: req.email,
                password_hash: password_hash.into_string(),
                role: Role::User,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user.sanitized())
    }

    /// Authenticate by email and password and issue an identity token.
    ///
    /// Unknown email and wrong password collapse to the same
    /// `InvalidCredentials` outcome so the response does not reveal which
    /// check failed.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let user = self
            .store
            .find_user_by_email(&req.email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let hasher = self.hasher.clone();
        let password = Password::new(req.password);
        let digest = PasswordHashString::new(user.password_hash.clone());
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| anyhow::anyhow!("Verification task failed: {}", e))?;

        if !verified {
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.jwt.issue(user.id, &user.name, user.role, Utc::now())?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            email: user.email,
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.ttl_seconds(),
        })
    }
}
