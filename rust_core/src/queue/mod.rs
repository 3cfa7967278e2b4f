//! Persistence for analyzed uploads awaiting live-market fusion.
//!
//! The engine never touches storage; services hold a `dyn QueueStore` and
//! decide where records live.

pub mod redis_store;

pub use redis_store::RedisQueueStore;

use crate::models::{QueueRecord, QueueStatus};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("queue record {id} not found")]
    NotFound { id: String },

    #[error("queue record {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: QueueStatus,
        to: QueueStatus,
    },

    #[error("queue record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type QueueResult<T> = Result<T, QueueError>;

/// Keyed store of queue records
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Insert or overwrite a record by id
    async fn save(&self, record: &QueueRecord) -> QueueResult<()>;

    /// All records, newest first
    async fn list(&self) -> QueueResult<Vec<QueueRecord>>;

    async fn get(&self, id: &str) -> QueueResult<Option<QueueRecord>>;

    /// Move a record to `status`, stamping `updated_at` with `now`.
    /// Re-applying the current status is a no-op.
    async fn update_status_at(
        &self,
        id: &str,
        status: QueueStatus,
        now: DateTime<Utc>,
    ) -> QueueResult<QueueRecord>;

    /// Remove a record. Returns whether it existed.
    async fn delete(&self, id: &str) -> QueueResult<bool>;

    /// Remove every record. Returns how many were removed.
    async fn clear(&self) -> QueueResult<usize>;

    /// Store name for logging
    fn store_name(&self) -> &str;

    async fn update_status(&self, id: &str, status: QueueStatus) -> QueueResult<QueueRecord> {
        self.update_status_at(id, status, Utc::now()).await
    }

    async fn pending_count(&self) -> QueueResult<usize> {
        Ok(self.list().await?.iter().filter(|r| r.is_pending()).count())
    }

    /// Expire PENDING records created more than `max_age` before `now`.
    /// Returns how many records changed.
    async fn expire_stale(&self, max_age: Duration, now: DateTime<Utc>) -> QueueResult<usize> {
        let cutoff = now - max_age;
        let mut expired = 0;
        for record in self.list().await? {
            if !record.is_pending() || record.created_at >= cutoff {
                continue;
            }
            // Records merged or deleted since the listing are skipped
            match self
                .update_status_at(&record.id, QueueStatus::Expired, now)
                .await
            {
                Ok(updated) if updated.updated_at == now => expired += 1,
                Ok(_) => {}
                Err(QueueError::NotFound { id }) => {
                    debug!("{}: record {} gone before expiry", self.store_name(), id);
                }
                Err(QueueError::InvalidTransition { id, from, .. }) => {
                    debug!(
                        "{}: record {} already {} before expiry",
                        self.store_name(),
                        id,
                        from
                    );
                }
                Err(e) => return Err(e),
            }
        }
        if expired > 0 {
            info!(
                "{}: expired {} pending records older than {}h",
                self.store_name(),
                expired,
                max_age.num_hours()
            );
        }
        Ok(expired)
    }
}

/// Newest first; id breaks ties so listing is deterministic.
pub(crate) fn sort_newest_first(records: &mut [QueueRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Process-local store, for tests and single-instance deployments
#[derive(Default)]
pub struct InMemoryQueueStore {
    records: RwLock<HashMap<String, QueueRecord>>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn save(&self, record: &QueueRecord) -> QueueResult<()> {
        self.records
            .write()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn list(&self) -> QueueResult<Vec<QueueRecord>> {
        let mut records: Vec<QueueRecord> = self.records.read().values().cloned().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: &str) -> QueueResult<Option<QueueRecord>> {
        Ok(self.records.read().get(id).cloned())
    }

    async fn update_status_at(
        &self,
        id: &str,
        status: QueueStatus,
        now: DateTime<Utc>,
    ) -> QueueResult<QueueRecord> {
        let mut records = self.records.write();
        let record = records.get_mut(id).ok_or_else(|| QueueError::NotFound {
            id: id.to_string(),
        })?;
        let changed = record
            .transition(status, now)
            .map_err(|from| QueueError::InvalidTransition {
                id: id.to_string(),
                from,
                to: status,
            })?;
        if changed {
            debug!("Queue record {} -> {}", id, status);
        }
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> QueueResult<bool> {
        Ok(self.records.write().remove(id).is_some())
    }

    async fn clear(&self) -> QueueResult<usize> {
        let mut records = self.records.write();
        let removed = records.len();
        records.clear();
        Ok(removed)
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyze;
    use crate::types::MarketEntry;

    fn record_at(team: &str, created_at: DateTime<Utc>) -> QueueRecord {
        let entry = MarketEntry::new(team, "Pistons").with_spreads("-9", "+9");
        let analysis = analyze(&entry);
        QueueRecord::new_at(entry, analysis, created_at)
    }

    #[tokio::test]
    async fn test_save_get_delete() {
        let store = InMemoryQueueStore::new();
        let rec = record_at("Celtics", Utc::now());
        store.save(&rec).await.unwrap();

        assert_eq!(store.get(&rec.id).await.unwrap(), Some(rec.clone()));
        assert!(store.delete(&rec.id).await.unwrap());
        assert!(!store.delete(&rec.id).await.unwrap());
        assert!(store.get(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryQueueStore::new();
        let now = Utc::now();
        let old = record_at("Knicks", now - Duration::hours(2));
        let new = record_at("Celtics", now);
        store.save(&old).await.unwrap();
        store.save(&new).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![new.id, old.id]);
    }

    #[tokio::test]
    async fn test_update_status_rules() {
        let store = InMemoryQueueStore::new();
        let rec = record_at("Celtics", Utc::now());
        store.save(&rec).await.unwrap();

        let merged = store.update_status(&rec.id, QueueStatus::Merged).await.unwrap();
        assert_eq!(merged.status, QueueStatus::Merged);

        // Idempotent
        assert!(store.update_status(&rec.id, QueueStatus::Merged).await.is_ok());

        let err = store
            .update_status(&rec.id, QueueStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QueueError::InvalidTransition {
                from: QueueStatus::Merged,
                to: QueueStatus::Pending,
                ..
            }
        ));

        let missing = store.update_status("nope", QueueStatus::Merged).await;
        assert!(matches!(missing, Err(QueueError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_expire_stale_only_touches_old_pending() {
        let store = InMemoryQueueStore::new();
        let now = Utc::now();
        let stale = record_at("Knicks", now - Duration::hours(30));
        let fresh = record_at("Celtics", now - Duration::hours(1));
        let merged = record_at("Lakers", now - Duration::hours(48));
        for rec in [&stale, &fresh, &merged] {
            store.save(rec).await.unwrap();
        }
        store
            .update_status(&merged.id, QueueStatus::Merged)
            .await
            .unwrap();

        let expired = store.expire_stale(Duration::hours(24), now).await.unwrap();
        assert_eq!(expired, 1);

        for (id, expected) in [
            (&stale.id, QueueStatus::Expired),
            (&fresh.id, QueueStatus::Pending),
            (&merged.id, QueueStatus::Merged),
        ] {
            assert_eq!(store.get(id).await.unwrap().unwrap().status, expected);
        }
        assert_eq!(store.pending_count().await.unwrap(), 1);

        // Second sweep finds nothing new
        assert_eq!(store.expire_stale(Duration::hours(24), now).await.unwrap(), 0);
    }

    /// Hands out a listing taken before later updates landed
    struct StaleListing {
        inner: InMemoryQueueStore,
        snapshot: Vec<QueueRecord>,
    }

    #[async_trait]
    impl QueueStore for StaleListing {
        async fn save(&self, record: &QueueRecord) -> QueueResult<()> {
            self.inner.save(record).await
        }

        async fn list(&self) -> QueueResult<Vec<QueueRecord>> {
            Ok(self.snapshot.clone())
        }

        async fn get(&self, id: &str) -> QueueResult<Option<QueueRecord>> {
            self.inner.get(id).await
        }

        async fn update_status_at(
            &self,
            id: &str,
            status: QueueStatus,
            now: DateTime<Utc>,
        ) -> QueueResult<QueueRecord> {
            self.inner.update_status_at(id, status, now).await
        }

        async fn delete(&self, id: &str) -> QueueResult<bool> {
            self.inner.delete(id).await
        }

        async fn clear(&self) -> QueueResult<usize> {
            self.inner.clear().await
        }

        fn store_name(&self) -> &str {
            "stale-listing"
        }
    }

    #[tokio::test]
    async fn test_expire_stale_skips_records_changed_since_listing() {
        let now = Utc::now();
        let merged_meanwhile = record_at("Celtics", now - Duration::hours(30));
        let deleted_meanwhile = record_at("Lakers", now - Duration::hours(35));
        let older = record_at("Knicks", now - Duration::hours(40));

        let inner = InMemoryQueueStore::new();
        for rec in [&merged_meanwhile, &deleted_meanwhile, &older] {
            inner.save(rec).await.unwrap();
        }
        let snapshot = inner.list().await.unwrap();
        inner
            .update_status(&merged_meanwhile.id, QueueStatus::Merged)
            .await
            .unwrap();
        inner.delete(&deleted_meanwhile.id).await.unwrap();
        let store = StaleListing { inner, snapshot };

        let expired = store.expire_stale(Duration::hours(24), now).await.unwrap();

        assert_eq!(expired, 1);
        assert_eq!(
            store.get(&older.id).await.unwrap().unwrap().status,
            QueueStatus::Expired
        );
        assert_eq!(
            store.get(&merged_meanwhile.id).await.unwrap().unwrap().status,
            QueueStatus::Merged
        );
    }

    #[tokio::test]
    async fn test_expire_stale_does_not_count_already_expired() {
        let now = Utc::now();
        let rec = record_at("Knicks", now - Duration::hours(30));
        let inner = InMemoryQueueStore::new();
        inner.save(&rec).await.unwrap();
        let snapshot = inner.list().await.unwrap();
        inner
            .update_status_at(&rec.id, QueueStatus::Expired, now - Duration::minutes(5))
            .await
            .unwrap();
        let store = StaleListing { inner, snapshot };

        assert_eq!(store.expire_stale(Duration::hours(24), now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryQueueStore::new();
        store.save(&record_at("A", Utc::now())).await.unwrap();
        store.save(&record_at("B", Utc::now())).await.unwrap();
        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_is_object_safe() {
        let store: std::sync::Arc<dyn QueueStore> = std::sync::Arc::new(InMemoryQueueStore::new());
        assert_eq!(store.store_name(), "memory");
    }
}
