//! Redis rate limiter implementation using fixed window counters.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};

use quill_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Redis rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RedisRateLimitConfig {
    pub redis: RedisConfig,
    /// Maximum requests per window
    pub max_requests: u32,
    pub window: Duration,
    /// Key prefix for rate limit keys
    pub key_prefix: String,
}

impl Default for RedisRateLimitConfig {
    fn default() -> Self {
        Self {
            redis: RedisConfig::default(),
            max_requests: 20,
            window: Duration::from_secs(60),
            key_prefix: "quill:ratelimit".to_string(),
        }
    }
}

/// Redis-backed rate limiter shared by every API instance.
pub struct RedisRateLimiter {
    conn: ConnectionManager,
    config: RedisRateLimitConfig,
    /// Atomic increment with expiry on first hit.
    script: Script,
}

impl RedisRateLimiter {
    pub async fn new(config: RedisRateLimitConfig) -> Result<Self, RateLimitError> {
        let client = Client::open(config.redis.url.as_str())
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        let conn = tokio::time::timeout(
            config.redis.connect_timeout,
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| RateLimitError::Backend("Connection timed out".to_string()))?
        .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        // Returns: [current_count, ttl_remaining]
        let script = Script::new(
            r#"
            local current = redis.call('INCR', KEYS[1])
            if current == 1 then
                redis.call('EXPIRE', KEYS[1], ARGV[1])
            end
            return {current, redis.call('TTL', KEYS[1])}
            "#,
        );

        tracing::info!(url = %config.redis.url, "Connected to Redis rate limiter");

        Ok(Self {
            conn,
            config,
            script,
        })
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.config.key_prefix, key)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let mut conn = self.conn.clone();

        let result: Vec<i64> = self
            .script
            .key(self.make_key(key))
            .arg(self.config.window.as_secs().max(1))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;

        let current = result.first().copied().unwrap_or(1).max(0) as u32;
        let ttl_secs = result
            .get(1)
            .copied()
            .unwrap_or(self.config.window.as_secs() as i64)
            .max(1) as u64;

        Ok(RateLimitResult {
            allowed: current <= self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(current),
            reset_after: Duration::from_secs(ttl_secs),
        })
    }
}
