use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub hash: HashConfig,
    pub completion: CompletionConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub time_cost: u32,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_attempts: u32,
    pub login_window_seconds: u64,
    pub register_attempts: u32,
    pub register_window_seconds: u64,
    pub global_ip_limit: u32,
    pub global_ip_window_seconds: u64,
}

impl AccountConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = AccountConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("account-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: get_env("DATABASE_MAX_CONNECTIONS", Some("5"), is_prod)?
                    .parse()
                    .unwrap_or(5),
            },
            jwt: JwtConfig {
                // The signing secret has no default in any environment:
                // operating with an empty or guessable secret must never happen.
                secret: get_env("JWT_SECRET", None, true)?,
                ttl_hours: get_env("JWT_TTL_HOURS", Some("24"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
            },
            hash: HashConfig {
                memory_kib: get_env("HASH_MEMORY_KIB", Some("19456"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
                time_cost: get_env("HASH_TIME_COST", Some("2"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
            },
            completion: CompletionConfig {
                api_key: get_env("OPENAI_API_KEY", Some(""), is_prod)?,
                model: get_env("OPENAI_MODEL", Some("gpt-3.5-turbo"), is_prod)?,
                base_url: get_env("OPENAI_BASE_URL", Some("https://api.openai.com/v1"), is_prod)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            },
            rate_limit: RateLimitConfig {
                login_attempts: get_env("RATE_LIMIT_LOGIN_ATTEMPTS", Some("5"), is_prod)?
                    .parse()
                    .unwrap_or(5),
                login_window_seconds: get_env(
                    "RATE_LIMIT_LOGIN_WINDOW_SECONDS",
                    Some("900"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(900),
                register_attempts: get_env("RATE_LIMIT_REGISTER_ATTEMPTS", Some("3"), is_prod)?
                    .parse()
                    .unwrap_or(3),
                register_window_seconds: get_env(
                    "RATE_LIMIT_REGISTER_WINDOW_SECONDS",
                    Some("3600"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(3600),
                global_ip_limit: get_env("RATE_LIMIT_GLOBAL_IP_LIMIT", Some("100"), is_prod)?
                    .parse()
                    .unwrap_or(100),
                global_ip_window_seconds: get_env(
                    "RATE_LIMIT_GLOBAL_IP_WINDOW_SECONDS",
                    Some("60"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(60),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.jwt.secret.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET must not be empty"
            )));
        }

        if self.jwt.ttl_hours <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_TTL_HOURS must be positive"
            )));
        }

        if self.hash.time_cost == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "HASH_TIME_COST must be positive"
            )));
        }

        // In production, ensure stricter validation
        if self.environment == Environment::Prod {
            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.completion.api_key.is_empty() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "OPENAI_API_KEY is required in production"
                )));
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
