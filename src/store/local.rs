use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::EntityStore;
use crate::error::StoreError;
use crate::models::Record;

/// Artificial delay applied before each operation, standing in for a
/// network round trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Latency {
    pub get_all: Duration,
    pub get_by_id: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Latency {
    pub const fn simulated() -> Self {
        Latency {
            get_all: Duration::from_millis(300),
            get_by_id: Duration::from_millis(200),
            create: Duration::from_millis(400),
            update: Duration::from_millis(300),
            delete: Duration::from_millis(250),
        }
    }

    pub const fn none() -> Self {
        Latency {
            get_all: Duration::ZERO,
            get_by_id: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Latency::simulated()
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Records kept in a vector in insertion order. Deletes are permanent and
/// ids are never handed out twice.
pub struct LocalStore<R: Record> {
    records: RwLock<Vec<R>>,
    next_id: AtomicU64,
    latency: Latency,
}

impl<R: Record> LocalStore<R> {
    pub fn new(seed: Vec<R>, latency: Latency) -> Self {
        let next_id = seed.iter().map(Record::id).max().unwrap_or(0) + 1;
        LocalStore {
            records: RwLock::new(seed),
            next_id: AtomicU64::new(next_id),
            latency,
        }
    }

    fn not_found(id: u64) -> StoreError {
        StoreError::NotFound { kind: R::KIND, id }
    }
}

#[async_trait]
impl<R: Record> EntityStore<R> for LocalStore<R> {
    async fn get_all(&self) -> Result<Vec<R>, StoreError> {
        pause(self.latency.get_all).await;
        let records = self.records.read().await;
        debug!(kind = R::KIND, count = records.len(), "local get_all");
        Ok(records.clone())
    }

    async fn get_by_id(&self, id: u64) -> Result<R, StoreError> {
        pause(self.latency.get_by_id).await;
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        pause(self.latency.create).await;
        let mut records = self.records.write().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = R::from_draft(id, draft, Utc::now());
        records.push(record.clone());
        debug!(kind = R::KIND, id, "local create");
        Ok(record)
    }

    async fn update(&self, id: u64, patch: R::Patch) -> Result<R, StoreError> {
        pause(self.latency.update).await;
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.apply(&patch, Utc::now());
        debug!(kind = R::KIND, id, "local update");
        Ok(record.clone())
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        pause(self.latency.delete).await;
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        records.remove(index);
        debug!(kind = R::KIND, id, "local delete");
        Ok(true)
    }
}
