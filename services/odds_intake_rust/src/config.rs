//! Intake service configuration, loaded from environment variables with
//! defaults.

use sea_rust_core::models::{ANALYZED_CHANNEL, COMMAND_CHANNEL, DEFAULT_QUEUE_KEY, UPLOAD_CHANNEL};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub redis_url: String,

    pub upload_channel: String,
    pub command_channel: String,
    pub analyzed_channel: String,

    /// Redis hash holding queue records
    pub queue_key: String,

    /// PENDING records older than this are expired (default: 24h)
    pub pending_ttl_hours: i64,
    /// How often the expiry sweep runs (default: 300s)
    pub sweep_interval: Duration,
}

impl IntakeConfig {
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            upload_channel: env::var("ODDS_UPLOAD_CHANNEL")
                .unwrap_or_else(|_| UPLOAD_CHANNEL.to_string()),
            command_channel: env::var("ODDS_COMMAND_CHANNEL")
                .unwrap_or_else(|_| COMMAND_CHANNEL.to_string()),
            analyzed_channel: env::var("ODDS_ANALYZED_CHANNEL")
                .unwrap_or_else(|_| ANALYZED_CHANNEL.to_string()),

            queue_key: env::var("ODDS_QUEUE_KEY").unwrap_or_else(|_| DEFAULT_QUEUE_KEY.to_string()),

            pending_ttl_hours: env::var("PENDING_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|hours: &i64| *hours > 0)
                .unwrap_or(24),
            sweep_interval: Duration::from_secs(
                env::var("EXPIRY_SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs: &u64| *secs > 0)
                    .unwrap_or(300),
            ),
        }
    }

    pub fn pending_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.pending_ttl_hours)
    }
}
