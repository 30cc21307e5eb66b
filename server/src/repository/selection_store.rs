//! Selection Store
//!
//! The authoritative record of every live selection. Each record sits behind
//! its own async mutex, so updates to the same selection are mutually
//! exclusive while different selections proceed in parallel. The outer map
//! lock is only ever held for a lookup or removal, never across a dataset
//! query.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    DomainError, DomainResult, Mode, PaymentFilter, Selection, SelectionDelta,
};

use super::traits::{BulkActionHandler, PaymentDataset};

/// Store tuning
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long an unapplied selection stays valid
    pub ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(4),
        }
    }
}

type Record = Arc<Mutex<Selection>>;

/// In-memory selection authority over a live dataset
pub struct SelectionStore {
    dataset: Arc<dyn PaymentDataset>,
    config: StoreConfig,
    records: Mutex<HashMap<Uuid, Record>>,
}

impl SelectionStore {
    pub fn new(dataset: Arc<dyn PaymentDataset>, config: StoreConfig) -> Self {
        Self {
            dataset,
            config,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate a new selection.
    ///
    /// Fails closed: if the universe cannot be counted, no record is created.
    pub async fn create(&self, filter: PaymentFilter, mode: Mode) -> DomainResult<(Uuid, u64)> {
        let universe = self.dataset.universe_count(&filter).await?;
        let selection = Selection::new(filter, mode, self.config.ttl);
        let id = selection.id;
        let count = match mode {
            Mode::All => universe,
            Mode::None => 0,
        };
        self.records
            .lock()
            .await
            .insert(id, Arc::new(Mutex::new(selection)));
        log::info!("selection {} created (mode {:?}, universe {})", id, mode, universe);
        Ok((id, count))
    }

    /// Apply one delta and return the fresh authoritative count.
    ///
    /// The record lock is held across the recount, so a later update for the
    /// same id always observes the full effect of earlier ones.
    pub async fn apply_update(&self, id: Uuid, delta: &SelectionDelta) -> DomainResult<u64> {
        let record = self.lookup(id).await?;
        let mut selection = record.lock().await;
        if !self.is_live(id).await || selection.is_expired(Utc::now()) {
            self.remove(id).await;
            return Err(DomainError::NotFound(format!("selection {}", id)));
        }

        selection.apply_delta(delta);
        if selection.repair_invariant() {
            log::warn!(
                "selection {}: include and exclude were both non-empty, repaired",
                id
            );
        }

        let universe = self.dataset.universe_count(&selection.filter).await?;
        if selection.count_is_clamped(universe) {
            log::warn!(
                "selection {}: exclude set ({}) exceeds universe ({}), count clamped to 0",
                id,
                selection.exclude.len(),
                universe
            );
        }
        Ok(selection.selected_count(universe))
    }

    /// Execute a bulk action and discard the record on success.
    ///
    /// The record lock is held across the action, so no update can slip in
    /// between the snapshot and its execution. On `Rejected` the record is
    /// kept so the caller may retry with the same id.
    pub async fn apply_action(
        &self,
        id: Uuid,
        action: &str,
        handler: &dyn BulkActionHandler,
    ) -> DomainResult<u64> {
        let record = self.lookup(id).await?;
        let selection = record.lock().await;
        if !self.is_live(id).await || selection.is_expired(Utc::now()) {
            self.remove(id).await;
            return Err(DomainError::NotFound(format!("selection {}", id)));
        }

        let snapshot = selection.snapshot();
        let affected = handler.execute(action, &snapshot).await?;
        drop(selection);
        self.remove(id).await;
        log::info!(
            "selection {} applied action '{}' to {} items and was discarded",
            id,
            action,
            affected
        );
        Ok(affected)
    }

    /// Remove a record. Discarding an unknown id is not an error.
    pub async fn discard(&self, id: Uuid) {
        if self.records.lock().await.remove(&id).is_some() {
            log::info!("selection {} discarded", id);
        }
    }

    /// Drop every expired record; returns how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let records: Vec<(Uuid, Record)> = {
            let map = self.records.lock().await;
            map.iter().map(|(id, rec)| (*id, rec.clone())).collect()
        };
        let now = Utc::now();
        let mut expired = Vec::new();
        for (id, record) in records {
            if record.lock().await.is_expired(now) {
                expired.push(id);
            }
        }
        let mut map = self.records.lock().await;
        let mut dropped = 0;
        for id in &expired {
            if map.remove(id).is_some() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::info!("purged {} expired selection(s)", dropped);
        }
        dropped
    }

    /// Number of live records
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    async fn lookup(&self, id: Uuid) -> DomainResult<Record> {
        self.records
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("selection {}", id)))
    }

    // A record Arc can outlive its map entry when an apply raced a discard;
    // re-checking membership after taking the record lock closes that window
    // (ids are never reused, so membership can only go one way).
    async fn is_live(&self, id: Uuid) -> bool {
        self.records.lock().await.contains_key(&id)
    }

    async fn remove(&self, id: Uuid) {
        self.records.lock().await.remove(&id);
    }
}
