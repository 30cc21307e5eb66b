//! Selection Entity
//!
//! The authoritative record of "which payments are selected" under
//! set-complement semantics: in `None` mode the `include` set enumerates the
//! selection, in `All` mode everything matching the filter is selected
//! except the `exclude` set.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::filter::PaymentFilter;
use super::payment::ItemId;

/// Selection mode
///
/// ALL: every item matching the filter is selected by default
/// NONE: no item is selected by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    All,
    None,
}

/// A live selection session
#[derive(Debug, Clone)]
pub struct Selection {
    pub id: Uuid,
    pub filter: PaymentFilter,
    pub mode: Mode,
    pub include: HashSet<ItemId>,
    pub exclude: HashSet<ItemId>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// One update to a selection, as received from a client
///
/// Absent fields mean "no change to that aspect". A mode change clears both
/// id sets. Id lists that do not apply to the current mode are ignored, so
/// a stale client request degrades to a no-op instead of an error.
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

impl SelectionDelta {
    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.add_include.is_empty()
            && self.remove_include.is_empty()
            && self.add_exclude.is_empty()
            && self.remove_exclude.is_empty()
    }
}

/// Immutable view handed to bulk-action handlers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub id: Uuid,
    pub filter: PaymentFilter,
    pub mode: Mode,
    pub include: Vec<ItemId>,
    pub exclude: Vec<ItemId>,
}

impl Selection {
    /// Fresh record; `ttl` bounds how long an unapplied selection stays valid
    pub fn new(filter: PaymentFilter, mode: Mode, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filter,
            mode,
            include: HashSet::new(),
            exclude: HashSet::new(),
            version: 0,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Apply one delta in a fixed order: mode change first (clearing both
    /// sets), then the four id lists. Lists for the opposite mode are no-ops.
    pub fn apply_delta(&mut self, delta: &SelectionDelta) {
        if let Some(mode) = delta.mode {
            self.mode = mode;
            self.include.clear();
            self.exclude.clear();
        }
        match self.mode {
            Mode::None => {
                self.include.extend(delta.add_include.iter().cloned());
                for id in &delta.remove_include {
                    self.include.remove(id);
                }
            }
            Mode::All => {
                self.exclude.extend(delta.add_exclude.iter().cloned());
                for id in &delta.remove_exclude {
                    self.exclude.remove(id);
                }
            }
        }
        if !delta.is_empty() {
            self.version += 1;
        }
    }

    /// Count against a live universe size. Never negative: an exclude set
    /// larger than the universe clamps to 0 (the caller logs the fault).
    pub fn selected_count(&self, universe: u64) -> u64 {
        match self.mode {
            Mode::None => self.include.len() as u64,
            Mode::All => universe.saturating_sub(self.exclude.len() as u64),
        }
    }

    /// True when the exclude set exceeds the live universe (a consistency
    /// fault: the count was clamped)
    pub fn count_is_clamped(&self, universe: u64) -> bool {
        self.mode == Mode::All && (self.exclude.len() as u64) > universe
    }

    /// Repair the sets if both are somehow non-empty; the set that the
    /// current mode does not consult is dropped. Returns true if repaired.
    pub fn repair_invariant(&mut self) -> bool {
        if self.include.is_empty() || self.exclude.is_empty() {
            return false;
        }
        match self.mode {
            Mode::None => self.exclude.clear(),
            Mode::All => self.include.clear(),
        }
        true
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        let mut include: Vec<ItemId> = self.include.iter().cloned().collect();
        let mut exclude: Vec<ItemId> = self.exclude.iter().cloned().collect();
        include.sort();
        exclude.sort();
        SelectionSnapshot {
            id: self.id,
            filter: self.filter.clone(),
            mode: self.mode,
            include,
            exclude,
        }
    }
}
