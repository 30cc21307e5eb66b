//! Selection Session
//!
//! Ties one selection's local model to its sync coordinator behind a single
//! handle the UI layer drives. Sessions are single-use: `apply` consumes the
//! handle, so a discarded selection id cannot be reused by construction.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::api::SelectionApi;
use crate::models::{
    ApplySelectionRequest, CreateSelectionRequest, DomainError, ItemId, Mode, PaymentFilter,
};
use crate::store::SelectionModel;
use crate::sync::{SyncConfig, SyncCoordinator, SyncStatus};

/// A failed apply hands the session back so the caller can retry with the
/// same selection id (the backend keeps the record on `Rejected`)
pub struct ApplyError {
    pub session: SelectionSession,
    pub error: DomainError,
}

impl std::fmt::Debug for ApplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplyError")
            .field("selection_id", &self.session.id())
            .field("error", &self.error)
            .finish()
    }
}

/// One live selection as the UI sees it
pub struct SelectionSession {
    api: Arc<dyn SelectionApi>,
    selection_id: String,
    model: Arc<Mutex<SelectionModel>>,
    coordinator: SyncCoordinator,
    status_rx: watch::Receiver<SyncStatus>,
}

impl SelectionSession {
    /// Ask the backend for a fresh selection over `filter` and wrap it.
    ///
    /// Fails closed: no session exists if the backend is unreachable.
    pub async fn create(
        api: Arc<dyn SelectionApi>,
        filter: PaymentFilter,
        mode: Mode,
        config: SyncConfig,
    ) -> Result<Self, DomainError> {
        let resp = api
            .create_selection(CreateSelectionRequest { filter, mode })
            .await?;
        let mut model = SelectionModel::new(mode);
        model.reconcile_count(resp.selected_count);
        let model = Arc::new(Mutex::new(model));
        let (coordinator, status_rx) = SyncCoordinator::new(
            api.clone(),
            resp.selection_id.clone(),
            model.clone(),
            resp.selected_count,
            config,
        );
        log::info!("selection session {} created", resp.selection_id);
        Ok(Self {
            api,
            selection_id: resp.selection_id,
            model,
            coordinator,
            status_rx,
        })
    }

    pub fn id(&self) -> &str {
        &self.selection_id
    }

    pub async fn is_selected(&self, id: &str) -> bool {
        self.model.lock().await.is_selected(id)
    }

    pub async fn mode(&self) -> Mode {
        self.model.lock().await.mode()
    }

    /// Last authoritative count
    pub async fn selected_count(&self) -> u64 {
        self.model.lock().await.selected_count()
    }

    /// Local count against a universe size the caller already knows
    pub async fn local_count(&self, universe: u64) -> u64 {
        self.model.lock().await.count(universe)
    }

    /// Flip one item
    pub async fn toggle(&self, id: &str) {
        let op = self.model.lock().await.toggle(id);
        self.coordinator.schedule([op]).await;
    }

    /// Select or deselect a page worth of ids
    pub async fn set_page_selected(&self, ids: &[ItemId], selected: bool) {
        let ops = self.model.lock().await.set_page_selected(ids, selected);
        self.coordinator.schedule(ops).await;
    }

    /// Select everything matching the filter, across all pages
    pub async fn select_all(&self) {
        let op = self.model.lock().await.select_all_global();
        self.coordinator.schedule([op]).await;
    }

    /// Clear the selection
    pub async fn deselect_all(&self) {
        let op = self.model.lock().await.deselect_all_global();
        self.coordinator.schedule([op]).await;
    }

    /// Observable sync status for render glue
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    /// Send any pending intent without waiting out the debounce window;
    /// also the explicit retry path after a failed update
    pub async fn flush_now(&self) {
        self.coordinator.flush_now().await;
    }

    /// Wait until no intent is pending and nothing is in flight
    pub async fn settle(&self) -> Result<(), DomainError> {
        self.coordinator.settle().await
    }

    /// Execute the bulk action for this selection.
    ///
    /// Outstanding local intent is flushed first so the backend acts on what
    /// the user sees. On success the backend has discarded the selection and
    /// the session is consumed with it; on failure the session comes back
    /// for a retry.
    pub async fn apply(self, action: &str) -> Result<(), ApplyError> {
        self.flush_now().await;
        if let Err(error) = self.settle().await {
            return Err(ApplyError {
                session: self,
                error,
            });
        }
        let req = ApplySelectionRequest {
            action: action.to_string(),
        };
        match self.api.apply_selection(&self.selection_id, req).await {
            Ok(()) => {
                log::info!(
                    "selection session {} applied '{}' and was released",
                    self.selection_id,
                    action
                );
                Ok(())
            }
            Err(error) => Err(ApplyError {
                session: self,
                error,
            }),
        }
    }
}
