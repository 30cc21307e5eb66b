//! Filter and Sort Descriptors
//!
//! `PaymentFilter` defines the candidate universe of a selection. The
//! selection core treats it as an opaque value: it is stored on the record
//! at creation time and handed back to the dataset for every recount.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::payment::PaymentStatus;

/// Predicate over the payment dataset
///
/// Immutable once a selection has been created from it. Absent fields do
/// not constrain the universe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    /// Keep payments due on or before this date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_before: Option<NaiveDate>,
}

/// Closed whitelist of sortable columns
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

impl SortKey {
    /// Column name used in ORDER BY; the enum is the whitelist, so this
    /// never interpolates caller input
    pub fn as_column(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Description => "description",
            SortKey::Amount => "amount",
            SortKey::DueDate => "due_date",
            SortKey::Status => "status",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}
