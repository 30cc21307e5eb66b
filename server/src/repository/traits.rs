//! Repository Layer - Core Traits
//!
//! Abstract interfaces the selection core consumes. Implementations can use
//! SQLite, in-memory fixtures, etc.

use async_trait::async_trait;

use crate::domain::{
    DomainResult, PaymentFilter, PaymentPage, SelectionSnapshot, SortDir, SortKey,
};

/// Read access to the live, filtered payment dataset
///
/// The selection core never paginates or counts by itself; it asks this
/// trait, so the universe is always live rather than snapshotted.
#[async_trait]
pub trait PaymentDataset: Send + Sync {
    /// Number of payments matching the filter right now
    async fn universe_count(&self, filter: &PaymentFilter) -> DomainResult<u64>;

    /// One ordered page of matching payments
    async fn page(
        &self,
        filter: &PaymentFilter,
        page: u32,
        size: u32,
        sort: SortKey,
        dir: SortDir,
    ) -> DomainResult<PaymentPage>;
}

/// Executes an opaque bulk-action token against a selection snapshot
///
/// The selection core passes the token through unvalidated; the handler
/// decides what "PAY" means and refuses tokens it does not know with
/// `DomainError::Rejected`.
#[async_trait]
pub trait BulkActionHandler: Send + Sync {
    /// Returns the number of affected items
    async fn execute(&self, action: &str, target: &SelectionSnapshot) -> DomainResult<u64>;
}
