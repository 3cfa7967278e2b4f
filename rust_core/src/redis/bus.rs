use anyhow::{Context, Result};
use redis::{aio::Connection, AsyncCommands, Client};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::pubsub_reconnect::{ReconnectConfig, ReconnectingMessageStream, ReconnectingPubSub};

/// Shared publish connection plus on-demand subscriber connections.
#[derive(Clone)]
pub struct RedisBus {
    client: Client,
    connection: Arc<Mutex<Connection>>,
}

impl RedisBus {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .with_context(|| format!("Invalid Redis URL {}", redis_url))?;
        let connection = client
            .get_async_connection()
            .await
            .context("Failed to connect to Redis")?;

        Ok(Self {
            client,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Publish `message` as JSON. Returns the number of receivers.
    pub async fn publish<T: Serialize>(&self, channel: &str, message: &T) -> Result<usize> {
        let payload = serde_json::to_string(message)?;
        let mut conn = self.connection.lock().await;
        let receivers: usize = conn
            .publish(channel, payload)
            .await
            .context("Failed to publish message")?;
        debug!("Published to {} ({} receivers)", channel, receivers);
        Ok(receivers)
    }

    /// Subscription that resubscribes on its own after the connection drops.
    pub fn subscribe_reconnecting(
        &self,
        channels: &[&str],
        config: ReconnectConfig,
    ) -> ReconnectingMessageStream {
        let channels = channels.iter().map(|c| c.to_string()).collect();
        ReconnectingPubSub::new(self.client.clone(), channels, config).into_message_stream()
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Fresh connection for callers that need their own, e.g. a queue store.
    pub async fn connection(&self) -> Result<Connection> {
        Ok(self.client.get_async_connection().await?)
    }
}
