//! Payment Commands
//!
//! Read-only dataset queries for table rendering and pagination. The
//! selection core consumes the same `PaymentDataset` trait; these handlers
//! just expose it to the client.

use crate::domain::{DomainResult, PaymentFilter, PaymentPage, SortDir, SortKey};
use crate::repository::PaymentDataset;
use crate::AppState;

/// One ordered page of payments matching the filter
pub async fn search_payments(
    state: &AppState,
    filter: PaymentFilter,
    page: u32,
    size: u32,
    sort: SortKey,
    dir: SortDir,
) -> DomainResult<PaymentPage> {
    state.payments.page(&filter, page, size, sort, dir).await
}

/// Live universe count for a filter
pub async fn count_payments(state: &AppState, filter: PaymentFilter) -> DomainResult<u64> {
    state.payments.universe_count(&filter).await
}
