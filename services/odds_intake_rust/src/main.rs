use anyhow::{Context, Result};
use dotenv::dotenv;
use futures_util::StreamExt;
use odds_intake_rust::{run_expiry_sweeper, Intake, IntakeConfig};
use sea_rust_core::redis::{ReconnectConfig, RedisBus};
use sea_rust_core::{QueueStore, RedisQueueStore, SignalEngine};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Odds Intake Service...");

    let config = IntakeConfig::from_env();
    let engine = SignalEngine::from_env();
    info!(
        "Config: uploads={} commands={} analyzed={} queue={} ttl={}h sweep={}s threshold={} min_high={} bonus={}",
        config.upload_channel,
        config.command_channel,
        config.analyzed_channel,
        config.queue_key,
        config.pending_ttl_hours,
        config.sweep_interval.as_secs(),
        engine.config().high_confidence_threshold,
        engine.config().min_high_confidence_signals,
        engine.config().corroboration_bonus,
    );

    let bus = RedisBus::connect(&config.redis_url).await?;
    info!("Connected to Redis");

    let store: Arc<dyn QueueStore> = Arc::new(RedisQueueStore::from_connection(
        bus.connection()
            .await
            .context("Failed to open queue store connection")?,
        &config.queue_key,
    ));

    match store.pending_count().await {
        Ok(pending) => info!("Queue {} has {} pending records", config.queue_key, pending),
        Err(e) => warn!("Could not count pending records: {}", e),
    }

    // Start expiry sweeper
    {
        let store_sweep = store.clone();
        let ttl = config.pending_ttl();
        let interval = config.sweep_interval;
        tokio::spawn(async move {
            run_expiry_sweeper(store_sweep, ttl, interval).await;
        });
    }

    let intake = Intake::new(engine, store);

    let mut stream = bus.subscribe_reconnecting(
        &[config.upload_channel.as_str(), config.command_channel.as_str()],
        ReconnectConfig::from_env(),
    );
    info!(
        "Listening on {} and {}",
        config.upload_channel, config.command_channel
    );

    while let Some(msg) = stream.next().await {
        let channel = msg.get_channel_name().to_string();

        let payload: Vec<u8> = match msg.get_payload::<Vec<u8>>() {
            Ok(p) => p,
            Err(e) => {
                warn!("{}: failed to read payload: {}", channel, e);
                continue;
            }
        };

        if channel == config.upload_channel {
            let started = Instant::now();
            match intake.handle_upload(&payload).await {
                Ok(records) => {
                    for record in &records {
                        if let Err(e) = bus.publish(&config.analyzed_channel, record).await {
                            error!("Failed to publish record {}: {}", record.id, e);
                        }
                    }
                    info!(
                        "Processed upload: {} records in {:?}",
                        records.len(),
                        started.elapsed()
                    );
                }
                Err(e) => {
                    let preview = String::from_utf8_lossy(&payload);
                    let preview: String = preview.chars().take(100).collect();
                    warn!("Rejected upload: {:#} (payload: {})", e, preview);
                }
            }
        } else if channel == config.command_channel {
            if let Err(e) = intake.handle_command(&payload).await {
                warn!("Command failed: {:#}", e);
            }
        } else {
            warn!("Unknown channel: {}", channel);
        }
    }

    error!("Pub/sub task stopped, shutting down");
    Ok(())
}
