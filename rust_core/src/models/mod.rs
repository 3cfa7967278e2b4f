// Shared models for SEA services
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::{AnalysisResult, MarketEntry};

// ============================================================================
// Pub/Sub Channels
// ============================================================================

/// Uploaded market entries (one entry or an array)
pub const UPLOAD_CHANNEL: &str = "odds:uploads";
/// Operator commands against the queue
pub const COMMAND_CHANNEL: &str = "odds:commands";
/// Every freshly analyzed queue record
pub const ANALYZED_CHANNEL: &str = "odds:analyzed";
/// Redis hash holding queue records by id
pub const DEFAULT_QUEUE_KEY: &str = "sea:odds_queue";

// ============================================================================
// Queue Records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueueStatus {
    /// Awaiting live-market fusion
    Pending,
    /// Reconciled with live odds
    Merged,
    /// Aged out before being merged
    Expired,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "PENDING",
            QueueStatus::Merged => "MERGED",
            QueueStatus::Expired => "EXPIRED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, QueueStatus::Pending)
    }

    /// Only PENDING moves, and only forward. Staying put is always allowed.
    pub fn can_transition_to(&self, next: QueueStatus) -> bool {
        *self == next || (*self == QueueStatus::Pending && next.is_terminal())
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analyzed upload awaiting (or past) live fusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    pub id: String,
    pub entry: MarketEntry,
    pub analysis: AnalysisResult,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueueRecord {
    pub fn new(entry: MarketEntry, analysis: AnalysisResult) -> Self {
        Self::new_at(entry, analysis, Utc::now())
    }

    pub fn new_at(entry: MarketEntry, analysis: AnalysisResult, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entry,
            analysis,
            status: QueueStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == QueueStatus::Pending
    }

    /// Apply a status change. Returns whether anything changed; `Err` carries
    /// the current status when the move is not allowed.
    pub fn transition(&mut self, next: QueueStatus, now: DateTime<Utc>) -> Result<bool, QueueStatus> {
        if !self.status.can_transition_to(next) {
            return Err(self.status);
        }
        if self.status == next {
            return Ok(false);
        }
        self.status = next;
        self.updated_at = now;
        Ok(true)
    }
}
