//! Backend Command Bindings
//!
//! The transport seam between the client and the selection authority.
//! Everything the client needs from the backend goes through this trait, so
//! tests can script it and the demo can wire it straight to an in-process
//! backend.

use async_trait::async_trait;

use crate::models::{
    ApplySelectionRequest, CreateSelectionRequest, DomainError, PaymentFilter, PaymentPage,
    SelectionDelta, SelectionResponse, SortDir, SortKey,
};

pub type ApiResult<T> = Result<T, DomainError>;

/// Commands exposed by the backend
#[async_trait]
pub trait SelectionApi: Send + Sync {
    /// Allocate a new selection over a filter
    async fn create_selection(&self, req: CreateSelectionRequest) -> ApiResult<SelectionResponse>;

    /// Apply one coalesced delta; the returned count is authoritative
    async fn update_selection(
        &self,
        id: &str,
        delta: SelectionDelta,
    ) -> ApiResult<SelectionResponse>;

    /// Execute a bulk action; on success the backend discards the selection
    async fn apply_selection(&self, id: &str, req: ApplySelectionRequest) -> ApiResult<()>;

    /// One ordered page of payments for table rendering
    async fn search_payments(
        &self,
        filter: PaymentFilter,
        page: u32,
        size: u32,
        sort: SortKey,
        dir: SortDir,
    ) -> ApiResult<PaymentPage>;

    /// Live universe count for a filter
    async fn count_payments(&self, filter: PaymentFilter) -> ApiResult<u64>;
}
