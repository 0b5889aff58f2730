use account_service::{
    build_router,
    config::AccountConfig,
    services::{AuthService, OpenAiProvider, PgStore, RecordStore, TokenService},
    utils::CredentialHasher,
    AppState,
};
use service_core::error::AppError;
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use service_core::observability::logging::init_tracing;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = AccountConfig::from_env()?;

    // Initialize tracing/logging using shared logic
    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting account service"
    );

    // Initialize database connection
    tracing::info!("Initializing database connection");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
    tracing::info!("Database initialized successfully");

    let store: Arc<dyn RecordStore> = Arc::new(PgStore::new(pool));

    // Initialize credential hasher
    let hasher = CredentialHasher::new(&config.hash).map_err(AppError::ConfigError)?;
    tracing::info!("Credential hasher initialized");

    // Initialize token service
    let jwt = TokenService::new(&config.jwt).map_err(AppError::ConfigError)?;
    tracing::info!("Token service initialized");

    // Initialize completion provider
    let completion = Arc::new(OpenAiProvider::new(config.completion.clone()));
    tracing::info!("Completion provider initialized");

    // Initialize rate limiters using shared logic
    let login_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.login_attempts,
        config.rate_limit.login_window_seconds,
    );
    let register_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.register_attempts,
        config.rate_limit.register_window_seconds,
    );
    let ip_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.global_ip_limit,
        config.rate_limit.global_ip_window_seconds,
    );
    tracing::info!("Rate limiters initialized: Login, Register, and Global IP");

    // Initialize services
    let auth_service = AuthService::new(store.clone(), hasher.clone(), jwt.clone());

    // Create application state
    let state = AppState {
        config: config.clone(),
        store,
        hasher,
        jwt,
        auth_service,
        completion,
        login_rate_limiter,
        register_rate_limiter,
        ip_rate_limiter,
    };

    // Build application router
    let app = build_router(state).await?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
