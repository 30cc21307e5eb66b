//! Demo Dataset Seeding
//!
//! Deterministic generator for a payment table of arbitrary size, used by
//! the demo binary and tests.

use chrono::NaiveDate;

use crate::domain::{DomainError, DomainResult, PaymentStatus};

use super::db::SharedConnection;

const DESCRIPTIONS: &[&str] = &[
    "Electricity invoice",
    "Cloud server rental",
    "CRM software subscription",
    "Equipment maintenance",
    "IT consulting services",
    "Office supplies",
    "Corporate antivirus license",
    "Digital marketing campaign",
    "New module development",
    "Travel expense reimbursement",
];

/// Insert `count` payments with ids `item-1` .. `item-<count>`.
///
/// Roughly one in ten payments is already PAID and one in twenty CANCELLED,
/// so status filters have something to bite on. Due dates walk forward one
/// day at a time from `start_date`.
pub async fn seed_demo_payments(
    conn: &SharedConnection,
    count: u32,
    start_date: NaiveDate,
) -> DomainResult<()> {
    let conn = conn.lock().await;
    let mut stmt = conn
        .prepare(
            "INSERT OR REPLACE INTO payments (id, description, amount, due_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    for i in 1..=count {
        let status = if i % 10 == 0 {
            PaymentStatus::Paid
        } else if i % 20 == 3 {
            PaymentStatus::Cancelled
        } else {
            PaymentStatus::Pending
        };
        let due = start_date + chrono::Duration::days((i % 90) as i64);
        let amount = 50.0 + f64::from(i % 400) * 12.5;
        stmt.execute(rusqlite::params![
            format!("item-{}", i),
            DESCRIPTIONS[(i as usize - 1) % DESCRIPTIONS.len()],
            amount,
            due.format("%Y-%m-%d").to_string(),
            status.as_str(),
        ])
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    }
    Ok(())
}
