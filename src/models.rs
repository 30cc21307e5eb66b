//! Client Models
//!
//! Wire data structures matching backend entities. Field names serialize
//! camelCase, matching what the backend command layer expects.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque item identifier
pub type ItemId = String;

/// Selection mode (matches backend)
///
/// ALL: everything matching the filter is selected unless excluded
/// NONE: nothing is selected unless included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    All,
    None,
}

/// Payment lifecycle status (matches backend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
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
}

/// Payment row (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: ItemId,
    pub description: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
}

/// One page of payments with pagination totals (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPage {
    pub content: Vec<Payment>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub page: u32,
    pub size: u32,
}

/// Universe predicate a selection is created against (matches backend)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_before: Option<NaiveDate>,
}

/// Sortable columns (closed set, matches backend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Id,
    Description,
    Amount,
    DueDate,
    Status,
}

/// Sort direction (matches backend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// Request body for creating a selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSelectionRequest {
    pub filter: PaymentFilter,
    pub mode: Mode,
}

/// One coalesced update; absent fields mean "no change to that aspect"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_include: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove_include: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_exclude: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove_exclude: Vec<ItemId>,
}

/// Response to create/update: the id plus the authoritative count
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub selection_id: String,
    pub selected_count: u64,
}

/// Request body for applying a selection; the token is opaque to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySelectionRequest {
    pub action: String,
}

/// Backend errors as they come over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainError {
    Unavailable(String),
    NotFound(String),
    Rejected(String),
    Internal(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Rejected(msg) => write!(f, "Rejected: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
