pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    rate_limit::{ip_rate_limit_middleware, IpRateLimiter},
    security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AccountConfig;
use crate::services::{AuthService, CompletionProvider, RecordStore, TokenService};
use crate::utils::CredentialHasher;

#[derive(Clone)]
pub struct AppState {
    pub config: AccountConfig,
    pub store: Arc<dyn RecordStore>,
    pub hasher: CredentialHasher,
    pub jwt: TokenService,
    pub auth_service: AuthService,
    pub completion: Arc<dyn CompletionProvider>,
    pub login_rate_limiter: IpRateLimiter,
    pub register_rate_limiter: IpRateLimiter,
    pub ip_rate_limiter: IpRateLimiter,
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    // Create login route with rate limiting
    let login_limiter = state.login_rate_limiter.clone();
    let login_route = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .layer(from_fn_with_state(login_limiter, ip_rate_limit_middleware));

    // Create register route with rate limiting
    let register_limiter = state.register_rate_limiter.clone();
    let register_route = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .layer(from_fn_with_state(
            register_limiter,
            ip_rate_limit_middleware,
        ));

    // Create global IP rate limiter
    let ip_limiter = state.ip_rate_limiter.clone();

    let app = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        .merge(login_route)
        .merge(register_route)
        // Routes below require a valid bearer token
        .merge(
            Router::new()
                .route("/users", get(handlers::user::list_users))
                .route(
                    "/users/:id",
                    get(handlers::user::get_user)
                        .put(handlers::user::update_user)
                        .delete(handlers::user::delete_user),
                )
                .route(
                    "/assist/recommendation",
                    post(handlers::assist::recommendation),
                )
                .layer(from_fn_with_state(
                    state.clone(),
                    middleware::auth_middleware,
                )),
        )
        .fallback(not_found)
        .with_state(state.clone())
        // Global IP rate limiting
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        // Add CORS layer
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .map(|o| {
                            o.parse::<axum::http::HeaderValue>().unwrap_or_else(|e| {
                                tracing::error!(
                                    "Invalid CORS origin '{}': {}. Using fallback.",
                                    o,
                                    e
                                );
                                axum::http::HeaderValue::from_static("*")
                            })
                        })
                        .collect::<Vec<axum::http::HeaderValue>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                ]),
        );

    Ok(app)
}

pub async fn welcome() -> &'static str {
    "Welcome to the Account Service API"
}

pub async fn not_found() -> impl axum::response::IntoResponse {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Resource not found" })),
    )
}

/// Service health check
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Record store health check failed");
        AppError::DatabaseError(anyhow::anyhow!(e))
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "database": "up"
        }
    })))
}
