//! Payment Repository
//!
//! SQL-backed implementation of the dataset traits: filtered counts, ordered
//! pages, and the bulk PAY/CANCEL actions a selection is applied with.

use async_trait::async_trait;
use rusqlite::{params_from_iter, Row};

use crate::domain::{
    DomainError, DomainResult, Mode, Payment, PaymentFilter, PaymentPage, PaymentStatus,
    SelectionSnapshot, SortDir, SortKey,
};

use super::db::SharedConnection;
use super::traits::{BulkActionHandler, PaymentDataset};

/// SQLite implementation of the payment dataset
pub struct PaymentRepository {
    conn: SharedConnection,
}

impl PaymentRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

/// WHERE fragment + positional params for a filter
fn filter_clause(filter: &PaymentFilter) -> (String, Vec<String>) {
    let mut conds = Vec::new();
    let mut params = Vec::new();
    if let Some(status) = filter.status {
        conds.push("status = ?".to_string());
        params.push(status.as_str().to_string());
    }
    if let Some(due) = filter.due_before {
        conds.push("due_date <= ?".to_string());
        params.push(due.format("%Y-%m-%d").to_string());
    }
    if conds.is_empty() {
        ("1=1".to_string(), params)
    } else {
        (conds.join(" AND "), params)
    }
}

/// "?,?,?" with one placeholder per element
fn placeholders(n: usize) -> String {
    let mut s = String::with_capacity(n * 2);
    for i in 0..n {
        if i > 0 {
            s.push(',');
        }
        s.push('?');
    }
    s
}

fn row_to_payment(row: &Row<'_>) -> rusqlite::Result<Payment> {
    let due: String = row.get(3)?;
    let status: String = row.get(4)?;
    Ok(Payment {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        due_date: due.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        status: PaymentStatus::from_str(&status),
    })
}

fn internal(e: rusqlite::Error) -> DomainError {
    DomainError::Internal(e.to_string())
}

#[async_trait]
impl PaymentDataset for PaymentRepository {
    async fn universe_count(&self, filter: &PaymentFilter) -> DomainResult<u64> {
        let conn = self.conn.lock().await;
        let (clause, params) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM payments WHERE {}", clause);
        let count: i64 = conn
            .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))
            .map_err(internal)?;
        Ok(count as u64)
    }

    async fn page(
        &self,
        filter: &PaymentFilter,
        page: u32,
        size: u32,
        sort: SortKey,
        dir: SortDir,
    ) -> DomainResult<PaymentPage> {
        let size = size.max(1);
        let conn = self.conn.lock().await;
        let (clause, params) = filter_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM payments WHERE {}", clause);
        let total: i64 = conn
            .query_row(&count_sql, params_from_iter(params.iter()), |row| row.get(0))
            .map_err(internal)?;

        let sql = format!(
            "SELECT id, description, amount, due_date, status FROM payments
             WHERE {} ORDER BY {} {} LIMIT {} OFFSET {}",
            clause,
            sort.as_column(),
            dir.as_sql(),
            size,
            page as u64 * size as u64,
        );
        let mut stmt = conn.prepare(&sql).map_err(internal)?;
        let content = stmt
            .query_map(params_from_iter(params.iter()), row_to_payment)
            .map_err(internal)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(internal)?;

        let total = total as u64;
        Ok(PaymentPage {
            content,
            total_elements: total,
            total_pages: total.div_ceil(size as u64) as u32,
            page,
            size,
        })
    }
}

impl PaymentRepository {
    /// Settle or void the payments a snapshot designates.
    ///
    /// Only PENDING payments are touched; a payment paid or cancelled since
    /// the selection was made is silently skipped rather than re-processed.
    async fn bulk_set_status(
        &self,
        target: &SelectionSnapshot,
        to: PaymentStatus,
    ) -> DomainResult<u64> {
        let conn = self.conn.lock().await;
        let affected = match target.mode {
            Mode::All => {
                let (clause, mut params) = filter_clause(&target.filter);
                let mut sql = format!(
                    "UPDATE payments SET status = ? WHERE {} AND status = ?",
                    clause
                );
                params.insert(0, to.as_str().to_string());
                params.push(PaymentStatus::Pending.as_str().to_string());
                if !target.exclude.is_empty() {
                    sql.push_str(&format!(
                        " AND id NOT IN ({})",
                        placeholders(target.exclude.len())
                    ));
                    params.extend(target.exclude.iter().cloned());
                }
                conn.execute(&sql, params_from_iter(params.iter()))
                    .map_err(internal)?
            }
            Mode::None => {
                if target.include.is_empty() {
                    return Ok(0);
                }
                let sql = format!(
                    "UPDATE payments SET status = ? WHERE status = ? AND id IN ({})",
                    placeholders(target.include.len())
                );
                let mut params = vec![
                    to.as_str().to_string(),
                    PaymentStatus::Pending.as_str().to_string(),
                ];
                params.extend(target.include.iter().cloned());
                conn.execute(&sql, params_from_iter(params.iter()))
                    .map_err(internal)?
            }
        };
        Ok(affected as u64)
    }
}

#[async_trait]
impl BulkActionHandler for PaymentRepository {
    async fn execute(&self, action: &str, target: &SelectionSnapshot) -> DomainResult<u64> {
        match action {
            "PAY" => self.bulk_set_status(target, PaymentStatus::Paid).await,
            "CANCEL" => self.bulk_set_status(target, PaymentStatus::Cancelled).await,
            other => Err(DomainError::Rejected(format!(
                "unknown bulk action '{}'",
                other
            ))),
        }
    }
}
