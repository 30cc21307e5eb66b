//! Payment Entity
//!
//! The dataset being selected over. The selection core never inspects
//! payments directly; it sees them through the `PaymentDataset` trait.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque item identifier as it travels over the wire
pub type ItemId = String;

/// Payment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Awaiting payment
    #[default]
    Pending,
    /// Settled by a bulk PAY action
    Paid,
    /// Voided by a bulk CANCEL action
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "PAID" => PaymentStatus::Paid,
            "CANCELLED" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }
}

/// A payable item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: ItemId,
    pub description: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
}

/// One page of payments, with the totals pagination UIs need
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPage {
    pub content: Vec<Payment>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub page: u32,
    pub size: u32,
}
