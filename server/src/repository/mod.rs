//! Repository Layer
//!
//! Data access abstractions and implementations:
//! - db: SQLite connection and migrations
//! - payment_repo: SQL-backed dataset queries and bulk actions
//! - selection_store: the in-memory selection authority

pub mod db;
mod payment_repo;
mod seed;
mod selection_store;
mod traits;

#[cfg(test)]
mod tests;

pub use db::{open_file, open_memory, SharedConnection};
pub use payment_repo::PaymentRepository;
pub use seed::seed_demo_payments;
pub use selection_store::{SelectionStore, StoreConfig};
pub use traits::{BulkActionHandler, PaymentDataset};
