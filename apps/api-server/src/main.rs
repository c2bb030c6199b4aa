//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::io;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use quill_core::ports::RateLimiter;
use quill_infra::InMemoryRateLimiter;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;


use config::{AppConfig, RateLimitSettings};
use middleware::error::route_not_found;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry);

    let config = AppConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Starting Quill API Server");

    let state = AppState::new(&config).await;
    if let Err(e) = state.bootstrap(&config).await {
        tracing::error!(error = %e, "Startup bootstrap failed");
        return Err(io::Error::other(e));
    }

    let limiter = build_limiter(&config.rate_limit).await?;
    let data = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(data.clone())
            .configure(handlers::configure_routes(limiter.clone()))
            .default_service(web::to(route_not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Shared Redis limiter when configured and reachable, otherwise one
/// in-process limiter shared by every worker.
async fn build_limiter(settings: &RateLimitSettings) -> io::Result<Arc<dyn RateLimiter>> {
    #[cfg(feature = "redis")]
    if let Some(url) = &settings.redis_url {
        use quill_infra::{RedisConfig, RedisRateLimitConfig, RedisRateLimiter};

        let redis_config = RedisRateLimitConfig {
            redis: RedisConfig {
                url: url.clone(),
                ..RedisConfig::default()
            },
            max_requests: settings.limits.max_requests,
            window: settings.limits.window,
            key_prefix: settings.key_prefix.clone(),
        };
        match RedisRateLimiter::new(redis_config).await {
            Ok(limiter) => {
                tracing::info!("Using Redis rate limiter");
                return Ok(Arc::new(limiter));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, using in-memory rate limiter");
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    if settings.redis_url.is_some() {
        tracing::warn!("REDIS_URL is set but the redis feature is disabled");
    }

    let limiter = InMemoryRateLimiter::new(settings.limits.clone()).map_err(io::Error::other)?;
    Ok(Arc::new(limiter))
}
