//! Pub/sub subscription that survives dropped Redis connections.
//!
//! A background task owns the subscriber connection. When the message
//! stream ends or the connection cannot be opened, it waits with exponential
//! backoff and subscribes again to the same channels.

use anyhow::{Context, Result};
use futures_util::stream::{Stream, StreamExt};
use redis::{aio::PubSub, Client, Msg};
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Backoff between resubscribe attempts
#[derive(Clone, Debug)]
pub struct ReconnectConfig {
    /// First retry delay (default: 1000ms)
    pub base_delay_ms: u64,
    /// Delay cap (default: 60000ms)
    pub max_delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 60_000,
        }
    }
}

impl ReconnectConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_delay_ms: std::env::var("REDIS_RECONNECT_BASE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.base_delay_ms),
            max_delay_ms: std::env::var("REDIS_RECONNECT_MAX_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_delay_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based), doubling up to the cap.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let ms = self
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Default)]
pub struct ReconnectStats {
    pub successful_subscribes: AtomicU64,
    pub consecutive_failures: AtomicU32,
}

impl ReconnectStats {
    pub fn record_success(&self) {
        self.successful_subscribes.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    /// Returns the new consecutive failure count.
    pub fn record_failure(&self) -> u32 {
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Channels to keep subscribed, and how to get back to them
#[derive(Clone)]
pub struct ReconnectingPubSub {
    client: Client,
    channels: Vec<String>,
    config: ReconnectConfig,
    stats: Arc<ReconnectStats>,
}

impl ReconnectingPubSub {
    pub fn new(client: Client, channels: Vec<String>, config: ReconnectConfig) -> Self {
        Self {
            client,
            channels,
            config,
            stats: Arc::new(ReconnectStats::default()),
        }
    }

    pub fn stats(&self) -> &Arc<ReconnectStats> {
        &self.stats
    }

    /// Spawn the subscriber task and hand back its message stream.
    pub fn into_message_stream(self) -> ReconnectingMessageStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            self.run(sender).await;
        });
        ReconnectingMessageStream { receiver }
    }

    async fn connect_and_subscribe(&self) -> Result<PubSub> {
        let conn = self
            .client
            .get_async_connection()
            .await
            .context("Failed to open pub/sub connection")?;
        let mut pubsub = conn.into_pubsub();
        for channel in &self.channels {
            pubsub
                .subscribe(channel)
                .await
                .with_context(|| format!("Failed to subscribe to {}", channel))?;
        }
        info!("Subscribed to {:?}", self.channels);
        Ok(pubsub)
    }

    async fn run(self, sender: mpsc::UnboundedSender<Msg>) {
        loop {
            match self.connect_and_subscribe().await {
                Ok(mut pubsub) => {
                    self.stats.record_success();
                    let mut stream = pubsub.on_message();
                    while let Some(msg) = stream.next().await {
                        if sender.send(msg).is_err() {
                            info!("Subscriber dropped, stopping pub/sub task");
                            return;
                        }
                    }
                    warn!("Pub/sub stream ended, resubscribing");
                    self.stats.record_failure();
                }
                Err(e) => {
                    let attempt = self.stats.record_failure();
                    let delay = self.config.delay_for(attempt);
                    error!(
                        "Subscribe attempt {} failed: {:#}. Retrying in {:?}",
                        attempt, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
            if sender.is_closed() {
                return;
            }
        }
    }
}

/// Messages from every subscription the task has held, in arrival order
pub struct ReconnectingMessageStream {
    receiver: mpsc::UnboundedReceiver<Msg>,
}

impl Stream for ReconnectingMessageStream {
    type Item = Msg;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let config = ReconnectConfig {
            base_delay_ms: 500,
            max_delay_ms: 5000,
        };
        assert_eq!(config.delay_for(1), Duration::from_millis(500));
        assert_eq!(config.delay_for(2), Duration::from_millis(1000));
        assert_eq!(config.delay_for(4), Duration::from_millis(4000));
        assert_eq!(config.delay_for(5), Duration::from_millis(5000));
        assert_eq!(config.delay_for(u32::MAX), Duration::from_millis(5000));
    }

    #[test]
    fn test_stats_reset_on_success() {
        let stats = ReconnectStats::default();
        assert_eq!(stats.record_failure(), 1);
        assert_eq!(stats.record_failure(), 2);
        stats.record_success();
        assert_eq!(stats.consecutive_failures.load(Ordering::Relaxed), 0);
        assert_eq!(stats.successful_subscribes.load(Ordering::Relaxed), 1);
        assert_eq!(stats.record_failure(), 1);
    }
}
