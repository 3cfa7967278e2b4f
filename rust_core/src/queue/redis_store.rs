//! Redis-backed queue store: one hash, field = record id, value = record JSON.

use super::{sort_newest_first, QueueError, QueueResult, QueueStore};
use crate::models::{QueueRecord, QueueStatus, DEFAULT_QUEUE_KEY};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{aio::Connection, AsyncCommands, Client};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct RedisQueueStore {
    connection: Arc<Mutex<Connection>>,
    key: String,
}

impl RedisQueueStore {
    pub async fn connect(redis_url: &str, key: Option<&str>) -> QueueResult<Self> {
        let client = Client::open(redis_url)?;
        let connection = client.get_async_connection().await?;
        Ok(Self::from_connection(
            connection,
            key.unwrap_or(DEFAULT_QUEUE_KEY),
        ))
    }

    pub fn from_connection(connection: Connection, key: &str) -> Self {
        Self {
            connection: Arc::new(Mutex::new(connection)),
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Decode stored hash values, skipping entries that no longer parse.
fn decode_records(raw: HashMap<String, String>) -> Vec<QueueRecord> {
    raw.into_iter()
        .filter_map(|(id, json)| match serde_json::from_str::<QueueRecord>(&json) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping unreadable queue record {}: {}", id, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl QueueStore for RedisQueueStore {
    async fn save(&self, record: &QueueRecord) -> QueueResult<()> {
        let payload = serde_json::to_string(record)?;
        let mut conn = self.connection.lock().await;
        conn.hset::<_, _, _, ()>(&self.key, &record.id, payload)
            .await?;
        Ok(())
    }

    async fn list(&self) -> QueueResult<Vec<QueueRecord>> {
        let raw: HashMap<String, String> = {
            let mut conn = self.connection.lock().await;
            conn.hgetall(&self.key).await?
        };
        let mut records = decode_records(raw);
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: &str) -> QueueResult<Option<QueueRecord>> {
        let raw: Option<String> = {
            let mut conn = self.connection.lock().await;
            conn.hget(&self.key, id).await?
        };
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn update_status_at(
        &self,
        id: &str,
        status: QueueStatus,
        now: DateTime<Utc>,
    ) -> QueueResult<QueueRecord> {
        let mut conn = self.connection.lock().await;
        let raw: Option<String> = conn.hget(&self.key, id).await?;
        let mut record: QueueRecord = match raw {
            Some(json) => serde_json::from_str(&json)?,
            None => return Err(QueueError::NotFound { id: id.to_string() }),
        };

        let changed = record
            .transition(status, now)
            .map_err(|from| QueueError::InvalidTransition {
                id: id.to_string(),
                from,
                to: status,
            })?;
        if changed {
            let payload = serde_json::to_string(&record)?;
            conn.hset::<_, _, _, ()>(&self.key, id, payload).await?;
            debug!("Queue record {} -> {} ({})", id, status, self.key);
        }
        Ok(record)
    }

    async fn delete(&self, id: &str) -> QueueResult<bool> {
        let mut conn = self.connection.lock().await;
        let removed: i64 = conn.hdel(&self.key, id).await?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> QueueResult<usize> {
        let mut conn = self.connection.lock().await;
        let count: usize = conn.hlen(&self.key).await?;
        conn.del::<_, ()>(&self.key).await?;
        Ok(count)
    }

    fn store_name(&self) -> &str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyze;
    use crate::types::MarketEntry;

    fn record() -> QueueRecord {
        let entry = MarketEntry::new("Celtics", "Pistons").with_spreads("-9", "+9");
        let analysis = analyze(&entry);
        QueueRecord::new(entry, analysis)
    }

    #[test]
    fn test_decode_skips_corrupt_entries() {
        let good = record();
        let mut raw = HashMap::new();
        raw.insert(good.id.clone(), serde_json::to_string(&good).unwrap());
        raw.insert("broken".to_string(), "{not json".to_string());

        let decoded = decode_records(raw);
        assert_eq!(decoded, vec![good]);
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis at REDIS_URL
    async fn test_redis_round_trip() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let store = RedisQueueStore::connect(&url, Some("sea:odds_queue:test"))
            .await
            .unwrap();
        store.clear().await.unwrap();

        let rec = record();
        store.save(&rec).await.unwrap();
        assert_eq!(store.get(&rec.id).await.unwrap(), Some(rec.clone()));

        let merged = store.update_status(&rec.id, QueueStatus::Merged).await.unwrap();
        assert_eq!(merged.status, QueueStatus::Merged);
        assert_eq!(store.list().await.unwrap().len(), 1);

        assert!(store.delete(&rec.id).await.unwrap());
        assert_eq!(store.clear().await.unwrap(), 0);
    }
}
