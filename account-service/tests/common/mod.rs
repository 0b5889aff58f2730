use account_service::{
    build_router,
    config::{
        AccountConfig, CompletionConfig, DatabaseConfig, Environment, HashConfig, JwtConfig,
        RateLimitConfig, SecurityConfig,
    },
    models::{NewUser, Role},
    services::{
        AuthService, CompletionProvider, MemoryStore, MockProvider, RecordStore, TokenService,
    },
    utils::{CredentialHasher, Password},
    AppState,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const MOCK_REPLY: &str = "Try the regional robotics challenge.";

pub fn test_config() -> AccountConfig {
    AccountConfig {
        common: service_core::config::Config { port: 8080 },
        environment: Environment::Dev,
        service_name: "account-service-test".to_string(),
        service_version: "0.0.0".to_string(),
        log_level: "error".to_string(),
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "test-signing-secret".to_string(),
            ttl_hours: 24,
        },
        hash: HashConfig {
            // Low cost keeps the test suite fast
            memory_kib: 8192,
            time_cost: 1,
        },
        completion: CompletionConfig {
            api_key: String::new(),
            model: "mock".to_string(),
            base_url: "http://localhost".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rate_limit: RateLimitConfig {
            login_attempts: 1000,
            login_window_seconds: 60,
            register_attempts: 1000,
            register_window_seconds: 60,
            global_ip_limit: 10000,
            global_ip_window_seconds: 60,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub jwt: TokenService,
    pub hasher: CredentialHasher,
}

pub async fn spawn_app() -> TestApp {
    let config = test_config();

    let store = Arc::new(MemoryStore::new());
    let record_store: Arc<dyn RecordStore> = store.clone();
    let hasher = CredentialHasher::new(&config.hash).expect("Failed to create hasher");
    let jwt = TokenService::new(&config.jwt).expect("Failed to create token service");
    let completion: Arc<dyn CompletionProvider> = Arc::new(MockProvider::new(MOCK_REPLY));

    let auth_service = AuthService::new(record_store.clone(), hasher.clone(), jwt.clone());

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

    let state = AppState {
        config,
        store: record_store,
        hasher: hasher.clone(),
        jwt: jwt.clone(),
        auth_service,
        completion,
        login_rate_limiter,
        register_rate_limiter,
        ip_rate_limiter,
    };

    let router = build_router(state).await.expect("Failed to build router");

    TestApp {
        router,
        store,
        jwt,
        hasher,
    }
}

/// Seed a user directly in the store, bypassing the registration endpoint.
pub async fn seed_user(app: &TestApp, name: &str, email: &str, password: &str, role: Role) -> i64 {
    let hash = app
        .hasher
        .hash(&Password::new(password.to_string()))
        .expect("Failed to hash password");

    let user = app
        .store
        .create_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash.into_string(),
            role,
        })
        .await
        .expect("Failed to seed user");

    user.id
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .extension(axum::extract::ConnectInfo(SocketAddr::from((
            [127, 0, 0, 1],
            8080,
        ))));

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .extension(axum::extract::ConnectInfo(SocketAddr::from((
            [127, 0, 0, 1],
            8080,
        ))));

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Register through the API and return the response body.
pub async fn register(
    app: &TestApp,
    name: &str,
    email: &str,
    password: &str,
) -> serde_json::Value {
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            None,
            serde_json::json!({ "name": name, "email": email, "password": password }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Login through the API and return the issued token.
pub async fn login_token(app: &TestApp, email: &str, password: &str) -> String {
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            serde_json::json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["token"].as_str().expect("No token in response").to_string()
}
