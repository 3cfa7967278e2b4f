//! Upload and command handling.
//!
//! Uploads are analyzed and stored as PENDING queue records; commands move
//! records through their lifecycle. Both handlers are transport-agnostic and
//! take raw payload bytes.

use anyhow::{bail, Context, Result};
use sea_rust_core::models::{QueueRecord, QueueStatus};
use sea_rust_core::{MarketEntry, QueueStore, SignalEngine};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One entry, or a whole parsed screenshot
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UploadPayload {
    Batch(Vec<MarketEntry>),
    Single(MarketEntry),
}

impl UploadPayload {
    pub fn into_entries(self) -> Vec<MarketEntry> {
        match self {
            UploadPayload::Batch(entries) => entries,
            UploadPayload::Single(entry) => vec![entry],
        }
    }
}

/// Operator command against the queue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum QueueCommand {
    Merge { id: String },
    Delete { id: String },
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Merged(QueueRecord),
    Deleted { id: String, existed: bool },
    Cleared(usize),
}

fn has_teams(entry: &MarketEntry) -> bool {
    !entry.team_a.trim().is_empty() && !entry.team_b.trim().is_empty()
}

pub struct Intake {
    engine: SignalEngine,
    store: Arc<dyn QueueStore>,
}

impl Intake {
    pub fn new(engine: SignalEngine, store: Arc<dyn QueueStore>) -> Self {
        Self { engine, store }
    }

    pub fn store(&self) -> &Arc<dyn QueueStore> {
        &self.store
    }

    /// Analyze an upload and save one PENDING record per usable entry.
    ///
    /// Entries missing either team name are skipped; an upload with no
    /// usable entry is an error and stores nothing. A failed save drops only
    /// that entry; the upload errors only when nothing was saved.
    pub async fn handle_upload(&self, payload: &[u8]) -> Result<Vec<QueueRecord>> {
        let upload: UploadPayload =
            serde_json::from_slice(payload).context("Upload is not a market entry or array of entries")?;

        let mut entries = upload.into_entries();
        let received = entries.len();
        entries.retain(has_teams);
        if entries.len() < received {
            warn!(
                "Skipped {} of {} uploaded entries without both team names",
                received - entries.len(),
                received
            );
        }
        if entries.is_empty() {
            bail!("Upload contained no entries with both team names");
        }

        let analyses = self.engine.analyze_batch(&entries);

        let mut saved = Vec::with_capacity(entries.len());
        let mut last_error = None;
        for (entry, analysis) in entries.into_iter().zip(analyses) {
            let record = QueueRecord::new(entry, analysis);
            if let Err(e) = self.store.save(&record).await {
                error!(
                    "Failed to save queue record {} ({} vs {}): {}",
                    record.id, record.entry.team_a, record.entry.team_b, e
                );
                last_error = Some(e);
                continue;
            }
            info!(
                "Queued {} vs {}: score {:.1}, {} signals, {}",
                record.entry.team_a,
                record.entry.team_b,
                record.analysis.overall_score,
                record.analysis.signals.len(),
                record.analysis.recommendation
            );
            saved.push(record);
        }

        // Records already saved must still reach the caller for publishing
        match last_error {
            Some(e) if saved.is_empty() => {
                Err(anyhow::Error::new(e).context("Failed to save any uploaded entry"))
            }
            _ => Ok(saved),
        }
    }

    pub async fn handle_command(&self, payload: &[u8]) -> Result<CommandOutcome> {
        let command: QueueCommand =
            serde_json::from_slice(payload).context("Unrecognized queue command")?;

        match command {
            QueueCommand::Merge { id } => {
                let record = self.store.update_status(&id, QueueStatus::Merged).await?;
                info!("Merged queue record {}", id);
                Ok(CommandOutcome::Merged(record))
            }
            QueueCommand::Delete { id } => {
                let existed = self.store.delete(&id).await?;
                if existed {
                    info!("Deleted queue record {}", id);
                } else {
                    warn!("Delete requested for unknown queue record {}", id);
                }
                Ok(CommandOutcome::Deleted { id, existed })
            }
            QueueCommand::Clear => {
                let removed = self.store.clear().await?;
                info!("Cleared {} queue records", removed);
                Ok(CommandOutcome::Cleared(removed))
            }
        }
    }
}
