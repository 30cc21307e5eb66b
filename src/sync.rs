//! Selection Sync Coordinator
//!
//! Bridges rapid local mutations to the backend without flooding it. Local
//! ops are coalesced into a single pending delta during a debounce window,
//! and at most one update request per selection is ever in flight; anything
//! scheduled mid-flight goes out immediately after the response lands. That
//! discipline, plus the backend's per-selection lock, is what keeps deltas
//! ordered end to end.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, Notify};

use crate::api::SelectionApi;
use crate::models::{DomainError, ItemId, Mode, SelectionDelta};
use crate::store::{DeltaOp, SelectionModel};

/// Coordinator tuning
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet window before a batch of local ops goes to the backend
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }
}

/// Observable sync state, published over a watch channel for render glue
#[derive(Debug, Clone, Default)]
pub struct SyncStatus {
    /// Last authoritative count
    pub selected_count: u64,
    /// Local intent not yet acknowledged by the backend
    pub dirty: bool,
    /// An update request is in flight
    pub syncing: bool,
    /// Error from the most recent failed update, until one succeeds
    pub last_error: Option<DomainError>,
}

/// Latest cumulative intent, not a log of every click.
///
/// Adding and removing the same id cancel out; a mode change supersedes all
/// pending id ops (the backend clears both sets on a mode change anyway).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingDelta {
    mode: Option<Mode>,
    add_include: BTreeSet<ItemId>,
    remove_include: BTreeSet<ItemId>,
    add_exclude: BTreeSet<ItemId>,
    remove_exclude: BTreeSet<ItemId>,
}

impl PendingDelta {
    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.add_include.is_empty()
            && self.remove_include.is_empty()
            && self.add_exclude.is_empty()
            && self.remove_exclude.is_empty()
    }

    /// Fold one more op into the intent
    pub fn push(&mut self, op: DeltaOp) {
        match op {
            DeltaOp::SetMode(mode) => {
                self.mode = Some(mode);
                self.add_include.clear();
                self.remove_include.clear();
                self.add_exclude.clear();
                self.remove_exclude.clear();
            }
            DeltaOp::AddInclude(id) => {
                self.remove_include.remove(&id);
                self.add_include.insert(id);
            }
            DeltaOp::RemoveInclude(id) => {
                self.add_include.remove(&id);
                self.remove_include.insert(id);
            }
            DeltaOp::AddExclude(id) => {
                self.remove_exclude.remove(&id);
                self.add_exclude.insert(id);
            }
            DeltaOp::RemoveExclude(id) => {
                self.add_exclude.remove(&id);
                self.remove_exclude.insert(id);
            }
        }
    }

    /// Fold a newer intent on top of this one (used when an update fails and
    /// its delta has to be retained under whatever accumulated since)
    pub fn absorb(&mut self, newer: PendingDelta) {
        if newer.mode.is_some() {
            *self = newer;
            return;
        }
        for id in newer.add_include {
            self.push(DeltaOp::AddInclude(id));
        }
        for id in newer.remove_include {
            self.push(DeltaOp::RemoveInclude(id));
        }
        for id in newer.add_exclude {
            self.push(DeltaOp::AddExclude(id));
        }
        for id in newer.remove_exclude {
            self.push(DeltaOp::RemoveExclude(id));
        }
    }

    /// Wire form
    pub fn into_delta(self) -> SelectionDelta {
        SelectionDelta {
            mode: self.mode,
            add_include: self.add_include.into_iter().collect(),
            remove_include: self.remove_include.into_iter().collect(),
            add_exclude: self.add_exclude.into_iter().collect(),
            remove_exclude: self.remove_exclude.into_iter().collect(),
        }
    }
}

struct SyncState {
    pending: PendingDelta,
    /// A worker task (debouncing or flushing) exists
    active: bool,
    last_error: Option<DomainError>,
}

struct SyncInner {
    api: Arc<dyn SelectionApi>,
    selection_id: String,
    model: Arc<Mutex<SelectionModel>>,
    config: SyncConfig,
    state: Mutex<SyncState>,
    /// Wakes a debouncing worker early (explicit flush)
    kick: Notify,
    status_tx: watch::Sender<SyncStatus>,
}

/// Debounced, single-flight update pump for one selection
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<SyncInner>,
}

impl SyncCoordinator {
    pub fn new(
        api: Arc<dyn SelectionApi>,
        selection_id: String,
        model: Arc<Mutex<SelectionModel>>,
        initial_count: u64,
        config: SyncConfig,
    ) -> (Self, watch::Receiver<SyncStatus>) {
        let (status_tx, status_rx) = watch::channel(SyncStatus {
            selected_count: initial_count,
            ..Default::default()
        });
        let inner = Arc::new(SyncInner {
            api,
            selection_id,
            model,
            config,
            state: Mutex::new(SyncState {
                pending: PendingDelta::default(),
                active: false,
                last_error: None,
            }),
            kick: Notify::new(),
            status_tx,
        });
        (Self { inner }, status_rx)
    }

    /// Record local ops as the most recent intent and arm the debounce
    /// window if no worker is already handling this selection
    pub async fn schedule(&self, ops: impl IntoIterator<Item = DeltaOp>) {
        let mut state = self.inner.state.lock().await;
        for op in ops {
            state.pending.push(op);
        }
        if state.pending.is_empty() {
            return;
        }
        self.inner.status_tx.send_modify(|s| s.dirty = true);
        if !state.active {
            state.active = true;
            tokio::spawn(worker(self.inner.clone(), true));
        }
    }

    /// Skip the rest of the debounce window, or restart the pump after a
    /// failure. No-op when there is nothing to send.
    pub async fn flush_now(&self) {
        let mut state = self.inner.state.lock().await;
        if state.active {
            self.inner.kick.notify_waiters();
        } else if !state.pending.is_empty() {
            state.active = true;
            tokio::spawn(worker(self.inner.clone(), false));
        }
    }

    /// Wait until the pump is quiescent. Ok when everything acknowledged;
    /// the last error when the pump stopped with unsent intent.
    pub async fn settle(&self) -> Result<(), DomainError> {
        // Every worker transition publishes a status value, so waiting on
        // the watch channel cannot miss the transition to quiescence
        let mut status = self.inner.status_tx.subscribe();
        loop {
            {
                let state = self.inner.state.lock().await;
                if !state.active {
                    return match (&state.last_error, state.pending.is_empty()) {
                        (Some(err), false) => Err(err.clone()),
                        _ => Ok(()),
                    };
                }
            }
            if status.changed().await.is_err() {
                // Sender gone; nothing will ever change again
                return Ok(());
            }
        }
    }

    /// Current status snapshot
    pub fn status(&self) -> SyncStatus {
        self.inner.status_tx.borrow().clone()
    }
}

async fn worker(inner: Arc<SyncInner>, debounce: bool) {
    if debounce {
        let sleep = tokio::time::sleep(inner.config.debounce);
        tokio::select! {
            _ = sleep => {}
            _ = inner.kick.notified() => {}
        }
    }
    loop {
        let delta = {
            let mut state = inner.state.lock().await;
            if state.pending.is_empty() {
                state.active = false;
                inner.status_tx.send_modify(|s| {
                    s.dirty = false;
                    s.syncing = false;
                });
                return;
            }
            std::mem::take(&mut state.pending)
        };
        inner.status_tx.send_modify(|s| s.syncing = true);

        let result = inner
            .api
            .update_selection(&inner.selection_id, delta.clone().into_delta())
            .await;
        match result {
            Ok(resp) => {
                // The backend owns the count; overwrite unconditionally,
                // even if this response is already superseded. The follow-up
                // request corrects it right away.
                inner.model.lock().await.reconcile_count(resp.selected_count);
                let mut state = inner.state.lock().await;
                state.last_error = None;
                let dirty = !state.pending.is_empty();
                inner.status_tx.send_modify(|s| {
                    s.selected_count = resp.selected_count;
                    s.dirty = dirty;
                    s.last_error = None;
                });
            }
            Err(err) => {
                log::warn!(
                    "selection {}: update failed, keeping local intent: {}",
                    inner.selection_id,
                    err
                );
                let mut state = inner.state.lock().await;
                // Keep the unacknowledged delta, with anything scheduled
                // since folded on top; the next mutation or an explicit
                // flush retries it
                let newer = std::mem::take(&mut state.pending);
                let mut restored = delta;
                restored.absorb(newer);
                state.pending = restored;
                state.last_error = Some(err.clone());
                state.active = false;
                inner.status_tx.send_modify(|s| {
                    s.syncing = false;
                    s.dirty = true;
                    s.last_error = Some(err);
                });
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_add_then_remove_cancels() {
        let mut pending = PendingDelta::default();
        pending.push(DeltaOp::AddInclude("a".to_string()));
        pending.push(DeltaOp::RemoveInclude("a".to_string()));
        let delta = pending.into_delta();
        assert!(delta.add_include.is_empty());
        assert_eq!(delta.remove_include, vec!["a".to_string()]);
    }

    #[test]
    fn test_pending_mode_change_supersedes_id_ops() {
        let mut pending = PendingDelta::default();
        pending.push(DeltaOp::AddInclude("a".to_string()));
        pending.push(DeltaOp::SetMode(Mode::All));
        pending.push(DeltaOp::AddExclude("b".to_string()));
        let delta = pending.into_delta();
        assert_eq!(delta.mode, Some(Mode::All));
        assert!(delta.add_include.is_empty());
        assert_eq!(delta.add_exclude, vec!["b".to_string()]);
    }

    #[test]
    fn test_absorb_keeps_newer_intent() {
        let mut failed = PendingDelta::default();
        failed.push(DeltaOp::AddInclude("a".to_string()));
        failed.push(DeltaOp::AddInclude("b".to_string()));

        let mut newer = PendingDelta::default();
        newer.push(DeltaOp::RemoveInclude("a".to_string()));

        failed.absorb(newer);
        let delta = failed.into_delta();
        // "a" was re-toggled off after the failure; only "b" is still added
        assert_eq!(delta.add_include, vec!["b".to_string()]);
        assert_eq!(delta.remove_include, vec!["a".to_string()]);
    }

    #[test]
    fn test_absorb_mode_change_wins() {
        let mut failed = PendingDelta::default();
        failed.push(DeltaOp::AddInclude("a".to_string()));

        let mut newer = PendingDelta::default();
        newer.push(DeltaOp::SetMode(Mode::None));

        failed.absorb(newer);
        let delta = failed.into_delta();
        assert_eq!(delta.mode, Some(Mode::None));
        assert!(delta.add_include.is_empty());
    }
}
