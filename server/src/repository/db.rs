//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations. The connection is shared
//! behind an async mutex; statements themselves run synchronously and fast.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Connection handle shared between repositories
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Open an in-memory database (tests, demo)
pub fn open_memory() -> DomainResult<SharedConnection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| DomainError::Unavailable(format!("open in-memory db: {}", e)))?;
    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Open (or create) a database file
pub fn open_file(path: &Path) -> DomainResult<SharedConnection> {
    let conn = Connection::open(path)
        .map_err(|e| DomainError::Unavailable(format!("open {}: {}", path.display(), e)))?;
    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let mut stmt = match conn.prepare(&query) {
        Ok(stmt) => stmt,
        Err(_) => return false,
    };
    let names = stmt.query_map([], |row| row.get::<_, String>(1));
    match names {
        Ok(rows) => rows.flatten().any(|name| name == column),
        Err(_) => false,
    }
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            description TEXT NOT NULL,
            amount REAL NOT NULL DEFAULT 0,
            due_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING'
        )",
        [],
    )
    .map_err(internal)?;

    // Older demo databases predate the amount column
    if !column_exists(conn, "payments", "amount") {
        conn.execute("ALTER TABLE payments ADD COLUMN amount REAL NOT NULL DEFAULT 0", [])
            .map_err(internal)?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_status ON payments(status)",
        [],
    )
    .map_err(internal)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_due ON payments(due_date)",
        [],
    )
    .map_err(internal)?;

    Ok(())
}

fn internal(e: rusqlite::Error) -> DomainError {
    DomainError::Internal(e.to_string())
}
