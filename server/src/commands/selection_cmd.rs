//! Selection Commands
//!
//! create / update / apply, mirroring the lifecycle in the data model:
//! a selection is created against a filter, mutated by coalesced deltas,
//! and destroyed by its one successful apply.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult, Mode, PaymentFilter, SelectionDelta};
use crate::AppState;

/// Request body for `create_selection`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSelectionRequest {
    pub filter: PaymentFilter,
    pub mode: Mode,
}

/// Response for create and update: the id plus the authoritative count
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub selection_id: Uuid,
    pub selected_count: u64,
}

/// Request body for `apply_selection`; the action token is opaque here
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySelectionRequest {
    pub action: String,
}

fn parse_id(id: &str) -> DomainResult<Uuid> {
    // A malformed id can never name a live selection
    Uuid::parse_str(id).map_err(|_| DomainError::NotFound(format!("selection {}", id)))
}

/// Create a new selection session
pub async fn create_selection(
    state: &AppState,
    req: CreateSelectionRequest,
) -> DomainResult<SelectionResponse> {
    let (selection_id, selected_count) = state.store.create(req.filter, req.mode).await?;
    Ok(SelectionResponse {
        selection_id,
        selected_count,
    })
}

/// Apply one coalesced delta and return the fresh count
pub async fn update_selection(
    state: &AppState,
    id: &str,
    delta: SelectionDelta,
) -> DomainResult<SelectionResponse> {
    let selection_id = parse_id(id)?;
    log::debug!("selection {} update: {:?}", selection_id, delta);
    let selected_count = state.store.apply_update(selection_id, &delta).await?;
    Ok(SelectionResponse {
        selection_id,
        selected_count,
    })
}

/// Execute the bulk action for a selection; the record is discarded on
/// success and kept on `Rejected` so the caller may retry
pub async fn apply_selection(
    state: &AppState,
    id: &str,
    req: ApplySelectionRequest,
) -> DomainResult<()> {
    let selection_id = parse_id(id)?;
    state
        .store
        .apply_action(selection_id, &req.action, state.actions.as_ref())
        .await?;
    Ok(())
}
