//! In-Process Backend Bridge
//!
//! `SelectionApi` implemented directly over the backend crate. Requests and
//! responses cross the seam as JSON, exactly as they would over a real
//! transport, so the mirrored client models stay honest.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use payselect_server::AppState;

use crate::api::{ApiResult, SelectionApi};
use crate::models::{
    ApplySelectionRequest, CreateSelectionRequest, DomainError, PaymentFilter, PaymentPage,
    SelectionDelta, SelectionResponse, SortDir, SortKey,
};

/// Client-side handle to an in-process backend
pub struct InProcessApi {
    state: Arc<AppState>,
}

impl InProcessApi {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

/// JSON round-trip between the mirrored client types and the backend types
fn recode<T: Serialize, U: DeserializeOwned>(value: &T) -> Result<U, DomainError> {
    let wire = serde_json::to_value(value)
        .map_err(|e| DomainError::Internal(format!("encode: {}", e)))?;
    serde_json::from_value(wire).map_err(|e| DomainError::Internal(format!("decode: {}", e)))
}

fn recode_err(err: payselect_server::domain::DomainError) -> DomainError {
    recode(&err).unwrap_or_else(|fallback| fallback)
}

#[async_trait]
impl SelectionApi for InProcessApi {
    async fn create_selection(&self, req: CreateSelectionRequest) -> ApiResult<SelectionResponse> {
        let req = recode(&req)?;
        payselect_server::commands::create_selection(&self.state, req)
            .await
            .map_err(recode_err)
            .and_then(|resp| recode(&resp))
    }

    async fn update_selection(
        &self,
        id: &str,
        delta: SelectionDelta,
    ) -> ApiResult<SelectionResponse> {
        let delta = recode(&delta)?;
        payselect_server::commands::update_selection(&self.state, id, delta)
            .await
            .map_err(recode_err)
            .and_then(|resp| recode(&resp))
    }

    async fn apply_selection(&self, id: &str, req: ApplySelectionRequest) -> ApiResult<()> {
        let req = recode(&req)?;
        payselect_server::commands::apply_selection(&self.state, id, req)
            .await
            .map_err(recode_err)
    }

    async fn search_payments(
        &self,
        filter: PaymentFilter,
        page: u32,
        size: u32,
        sort: SortKey,
        dir: SortDir,
    ) -> ApiResult<PaymentPage> {
        let filter = recode(&filter)?;
        let sort = recode(&sort)?;
        let dir = recode(&dir)?;
        payselect_server::commands::search_payments(&self.state, filter, page, size, sort, dir)
            .await
            .map_err(recode_err)
            .and_then(|page| recode(&page))
    }

    async fn count_payments(&self, filter: PaymentFilter) -> ApiResult<u64> {
        let filter = recode(&filter)?;
        payselect_server::commands::count_payments(&self.state, filter)
            .await
            .map_err(recode_err)
    }
}
