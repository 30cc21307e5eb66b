//! Payselect Backend
//!
//! Layered architecture:
//! - domain: core entities and selection semantics
//! - repository: data access (SQLite payments, in-memory selection store)
//! - commands: the protocol surface the client talks to

use std::path::Path;
use std::sync::Arc;

pub mod commands;
pub mod domain;
pub mod repository;

use domain::DomainResult;
use repository::{
    BulkActionHandler, PaymentRepository, SelectionStore, SharedConnection, StoreConfig,
};

/// Application state shared across commands
pub struct AppState {
    pub store: SelectionStore,
    pub payments: Arc<PaymentRepository>,
    pub actions: Arc<dyn BulkActionHandler>,
    pub conn: SharedConnection,
}

impl AppState {
    /// Wire the store and repositories over an open connection
    pub fn new(conn: SharedConnection, config: StoreConfig) -> Self {
        let payments = Arc::new(PaymentRepository::new(conn.clone()));
        let store = SelectionStore::new(payments.clone(), config);
        Self {
            store,
            payments: payments.clone(),
            actions: payments,
            conn,
        }
    }
}

/// Backend over an in-memory database (tests, demo)
pub fn init_memory() -> DomainResult<AppState> {
    let conn = repository::open_memory()?;
    Ok(AppState::new(conn, StoreConfig::default()))
}

/// Backend over a database file
pub fn init_with_path(path: &Path) -> DomainResult<AppState> {
    let conn = repository::open_file(path)?;
    Ok(AppState::new(conn, StoreConfig::default()))
}
