//! Configuration module
//!
//! Environment-driven configuration for the processing service: base URLs for the
//! AI and metadata dependencies, the per-call timeout, and circuit breaker
//! thresholds. All values have defaults suitable for local development.

use std::env;
use std::time::Duration;

// Defaults
const DEFAULT_AI_SERVICE_URL: &str = "http://localhost:8082";
const DEFAULT_METADATA_SERVICE_URL: &str = "http://localhost:8085";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FAILURE_RATE_THRESHOLD: f64 = 0.5;
const DEFAULT_WINDOW_SIZE: usize = 10;
const DEFAULT_OPEN_COOLDOWN_SECS: u64 = 30;
const DEFAULT_HALF_OPEN_MAX_CALLS: u32 = 3;
const DEFAULT_MAX_CONCURRENT_EVENTS: usize = 16;

/// Circuit breaker thresholds for the AI enrichment dependency.
#[derive(Clone, Debug)]
pub struct BreakerConfig {
    /// Failure rate in (0, 1] over the sliding window that trips the breaker.
    pub failure_rate_threshold: f64,
    /// Number of most recent call outcomes considered.
    pub window_size: usize,
    /// How long the breaker stays OPEN before probing recovery.
    pub open_cooldown: Duration,
    /// Trial calls admitted while HALF_OPEN.
    pub half_open_max_calls: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: DEFAULT_FAILURE_RATE_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
            open_cooldown: Duration::from_secs(DEFAULT_OPEN_COOLDOWN_SECS),
            half_open_max_calls: DEFAULT_HALF_OPEN_MAX_CALLS,
        }
    }
}

/// Processing service configuration.
#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    pub ai_service_url: String,
    pub metadata_service_url: String,
    pub request_timeout: Duration,
    pub breaker: BreakerConfig,
    /// Upper bound on concurrently processed events in the worker.
    pub max_concurrent_events: usize,
}

impl ProcessingConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let config = Self {
            ai_service_url: env::var("AI_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_AI_SERVICE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            metadata_service_url: env::var("METADATA_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_METADATA_SERVICE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
                    .parse()?,
            ),
            breaker: BreakerConfig {
                failure_rate_threshold: env::var("BREAKER_FAILURE_RATE_THRESHOLD")
                    .unwrap_or_else(|_| DEFAULT_FAILURE_RATE_THRESHOLD.to_string())
                    .parse()?,
                window_size: env::var("BREAKER_WINDOW_SIZE")
                    .unwrap_or_else(|_| DEFAULT_WINDOW_SIZE.to_string())
                    .parse()?,
                open_cooldown: Duration::from_secs(
                    env::var("BREAKER_OPEN_COOLDOWN_SECS")
                        .unwrap_or_else(|_| DEFAULT_OPEN_COOLDOWN_SECS.to_string())
                        .parse()?,
                ),
                half_open_max_calls: env::var("BREAKER_HALF_OPEN_MAX_CALLS")
                    .unwrap_or_else(|_| DEFAULT_HALF_OPEN_MAX_CALLS.to_string())
                    .parse()?,
            },
            max_concurrent_events: env::var("MAX_CONCURRENT_EVENTS")
                .unwrap_or_else(|_| DEFAULT_MAX_CONCURRENT_EVENTS.to_string())
                .parse()?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.ai_service_url.is_empty() {
            anyhow::bail!("AI_SERVICE_URL must not be empty");
        }
        if self.metadata_service_url.is_empty() {
            anyhow::bail!("METADATA_SERVICE_URL must not be empty");
        }
        if !(self.breaker.failure_rate_threshold > 0.0
            && self.breaker.failure_rate_threshold <= 1.0)
        {
            anyhow::bail!(
                "BREAKER_FAILURE_RATE_THRESHOLD must be in (0, 1], got {}",
                self.breaker.failure_rate_threshold
            );
        }
        if self.breaker.window_size == 0 {
            anyhow::bail!("BREAKER_WINDOW_SIZE must be greater than zero");
        }
        if self.breaker.half_open_max_calls == 0 {
            anyhow::bail!("BREAKER_HALF_OPEN_MAX_CALLS must be greater than zero");
        }
        if self.max_concurrent_events == 0 {
            anyhow::bail!("MAX_CONCURRENT_EVENTS must be greater than zero");
        }
        Ok(())
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            ai_service_url: DEFAULT_AI_SERVICE_URL.to_string(),
            metadata_service_url: DEFAULT_METADATA_SERVICE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            breaker: BreakerConfig::default(),
            max_concurrent_events: DEFAULT_MAX_CONCURRENT_EVENTS,
        }
    }
}
