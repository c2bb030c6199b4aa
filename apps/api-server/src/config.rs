//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConfig;
use quill_infra::{DEFAULT_JWT_SECRET, JwtConfig, RateLimitConfig};

/// Credentials of the administrator ensured at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Limits applied to `/api/auth`.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub limits: RateLimitConfig,
    /// Selects the shared Redis limiter when set.
    pub redis_url: Option<String>,
    pub key_prefix: String,
}

/// Application configuration. Built once at startup and handed to
/// constructors; nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitSettings,
    pub admin: Option<AdminBootstrap>,
    pub seed_default_categories: bool,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 100),
            min_connections: parsed("DB_MIN_CONNECTIONS", 10),
        });

        let admin = match (
            env::var("ADMIN_USERNAME"),
            env::var("ADMIN_EMAIL"),
            env::var("ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => Some(AdminBootstrap {
                username,
                email,
                password,
            }),
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            #[cfg(feature = "postgres")]
            database,
            jwt: Self::jwt_from_env(),
            rate_limit: RateLimitSettings {
                limits: RateLimitConfig {
                    max_requests: parsed("RATE_LIMIT_MAX_REQUESTS", 20),
                    window: Duration::from_secs(parsed("RATE_LIMIT_WINDOW_SECS", 60)),
                },
                redis_url: env::var("REDIS_URL").ok(),
                key_prefix: env::var("RATE_LIMIT_KEY_PREFIX")
                    .unwrap_or_else(|_| "quill:ratelimit".to_string()),
            },
            admin,
            seed_default_categories: flag("SEED_DEFAULT_CATEGORIES", true),
        }
    }

    fn jwt_from_env() -> JwtConfig {
        let defaults = JwtConfig::default();
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

        // Warn if using default secret in production
        if secret == DEFAULT_JWT_SECRET {
            let is_production = env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        JwtConfig {
            secret,
            expiration_days: parsed("JWT_EXPIRATION_DAYS", defaults.expiration_days),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}
