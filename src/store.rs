//! Selection State Store
//!
//! The render-facing approximation of a selection: mode plus the include and
//! exclude sets, with membership and counting rules. One owned instance per
//! active selection; nothing here is global.

use std::collections::HashSet;

use crate::models::{ItemId, Mode};

/// One primitive change to the selection, in the order it happened.
///
/// These feed the sync coordinator, which coalesces them into the latest
/// cumulative intent before anything goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaOp {
    SetMode(Mode),
    AddInclude(ItemId),
    RemoveInclude(ItemId),
    AddExclude(ItemId),
    RemoveExclude(ItemId),
}

/// Local selection state
#[derive(Debug, Clone)]
pub struct SelectionModel {
    mode: Mode,
    include: HashSet<ItemId>,
    exclude: HashSet<ItemId>,
    /// Last authoritative count reported by the backend
    selected_count: u64,
}

impl SelectionModel {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            include: HashSet::new(),
            exclude: HashSet::new(),
            selected_count: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Membership is determined purely by (mode, include, exclude)
    pub fn is_selected(&self, id: &str) -> bool {
        match self.mode {
            Mode::All => !self.exclude.contains(id),
            Mode::None => self.include.contains(id),
        }
    }

    /// Flip one item's membership. Never changes the mode: toggling the last
    /// excluded item under ALL yields a full selection that is still ALL.
    pub fn toggle(&mut self, id: &str) -> DeltaOp {
        let op = match self.mode {
            Mode::None => {
                if self.include.remove(id) {
                    DeltaOp::RemoveInclude(id.to_string())
                } else {
                    self.include.insert(id.to_string());
                    DeltaOp::AddInclude(id.to_string())
                }
            }
            Mode::All => {
                if self.exclude.remove(id) {
                    DeltaOp::RemoveExclude(id.to_string())
                } else {
                    self.exclude.insert(id.to_string());
                    DeltaOp::AddExclude(id.to_string())
                }
            }
        };
        self.repair_invariant();
        op
    }

    /// Select or deselect a page worth of ids, idempotently per id: items
    /// already in the requested state are left alone.
    pub fn set_page_selected(&mut self, ids: &[ItemId], selected: bool) -> Vec<DeltaOp> {
        let mut ops = Vec::new();
        for id in ids {
            if self.is_selected(id) == selected {
                continue;
            }
            ops.push(self.toggle(id));
        }
        ops
    }

    /// Select everything the filter matches, across all pages
    pub fn select_all_global(&mut self) -> DeltaOp {
        self.mode = Mode::All;
        self.include.clear();
        self.exclude.clear();
        DeltaOp::SetMode(Mode::All)
    }

    /// Clear the selection entirely; also the reset path after an apply
    pub fn deselect_all_global(&mut self) -> DeltaOp {
        self.mode = Mode::None;
        self.include.clear();
        self.exclude.clear();
        DeltaOp::SetMode(Mode::None)
    }

    /// Count against a universe size. Clamped at zero; an oversized exclude
    /// set is a consistency fault worth logging, not a crash.
    pub fn count(&self, universe: u64) -> u64 {
        match self.mode {
            Mode::None => self.include.len() as u64,
            Mode::All => {
                let excluded = self.exclude.len() as u64;
                if excluded > universe {
                    log::warn!(
                        "exclude set ({}) exceeds universe ({}), clamping count to 0",
                        excluded,
                        universe
                    );
                    0
                } else {
                    universe - excluded
                }
            }
        }
    }

    /// Overwrite the cached authoritative count (the backend owns it)
    pub fn reconcile_count(&mut self, count: u64) {
        self.selected_count = count;
    }

    /// Last authoritative count
    pub fn selected_count(&self) -> u64 {
        self.selected_count
    }

    /// True when at least one item is explicitly or implicitly selected
    /// according to the cached count
    pub fn has_selection(&self) -> bool {
        self.selected_count > 0
    }

    // include and exclude must never be both non-empty; mutations above
    // cannot violate this, so a hit here means corrupted state that is
    // dropped rather than propagated
    fn repair_invariant(&mut self) {
        if !self.include.is_empty() && !self.exclude.is_empty() {
            log::warn!("include and exclude both non-empty, repairing");
            match self.mode {
                Mode::None => self.exclude.clear(),
                Mode::All => self.include.clear(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<ItemId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_toggle_parity_none_mode() {
        let mut model = SelectionModel::new(Mode::None);
        for round in 1..=5 {
            model.toggle("item-1");
            // Odd number of toggles from the NONE default: selected
            assert_eq!(model.is_selected("item-1"), round % 2 == 1);
        }
    }

    #[test]
    fn test_toggle_parity_all_mode() {
        let mut model = SelectionModel::new(Mode::All);
        assert!(model.is_selected("item-1"));
        for round in 1..=5 {
            model.toggle("item-1");
            // Odd number of toggles from the ALL default: deselected
            assert_eq!(model.is_selected("item-1"), round % 2 == 0);
        }
        assert_eq!(model.mode(), Mode::All);
    }

    #[test]
    fn test_set_page_selected_is_idempotent() {
        let mut model = SelectionModel::new(Mode::None);
        let page = ids(&["a", "b", "c"]);

        let ops = model.set_page_selected(&page, true);
        assert_eq!(ops.len(), 3);
        let snapshot = model.clone();

        // A second pass changes nothing and emits nothing
        let ops = model.set_page_selected(&page, true);
        assert!(ops.is_empty());
        assert_eq!(model.count(10), snapshot.count(10));
        for id in &page {
            assert!(model.is_selected(id));
        }
    }

    #[test]
    fn test_set_page_selected_all_mode() {
        let mut model = SelectionModel::new(Mode::All);
        let page = ids(&["a", "b", "c"]);

        let ops = model.set_page_selected(&page, false);
        assert_eq!(ops.len(), 3);
        assert_eq!(model.count(10), 7);

        // Re-selecting the page lifts the exclusions, no mode change
        let ops = model.set_page_selected(&page, true);
        assert_eq!(ops.len(), 3);
        assert_eq!(model.count(10), 10);
        assert_eq!(model.mode(), Mode::All);
    }

    #[test]
    fn test_global_roundtrip_matches_fresh_model() {
        let mut model = SelectionModel::new(Mode::None);
        model.toggle("a");
        model.toggle("b");
        model.select_all_global();
        model.toggle("c");
        model.deselect_all_global();

        let fresh = SelectionModel::new(Mode::None);
        assert_eq!(model.mode(), fresh.mode());
        assert_eq!(model.count(100), fresh.count(100));
        assert!(!model.is_selected("a"));
        assert!(!model.is_selected("c"));
    }

    #[test]
    fn test_sets_never_both_nonempty() {
        let mut model = SelectionModel::new(Mode::None);
        model.toggle("a");
        model.select_all_global();
        model.toggle("b");
        model.toggle("c");
        model.deselect_all_global();
        model.toggle("d");
        // Walked through every mutation; the invariant held throughout
        // (violations would have been repaired and logged)
        assert!(model.include.is_empty() || model.exclude.is_empty());
    }

    #[test]
    fn test_count_fixtures() {
        let mut all = SelectionModel::new(Mode::All);
        all.toggle("3");
        all.toggle("7");
        assert_eq!(all.count(20), 18);

        let mut none = SelectionModel::new(Mode::None);
        none.toggle("1");
        none.toggle("2");
        none.toggle("9");
        assert_eq!(none.count(20), 3);
    }

    #[test]
    fn test_count_clamps_to_zero() {
        let mut model = SelectionModel::new(Mode::All);
        model.toggle("a");
        model.toggle("b");
        model.toggle("c");
        assert_eq!(model.count(2), 0);
    }

    #[test]
    fn test_full_exclusion_stays_all_mode() {
        let mut model = SelectionModel::new(Mode::All);
        model.toggle("a");
        model.toggle("b");
        assert_eq!(model.count(2), 0);
        // No automatic collapse back to NONE
        assert_eq!(model.mode(), Mode::All);
        // And toggling one back re-includes it without a mode change
        model.toggle("a");
        assert_eq!(model.count(2), 1);
        assert_eq!(model.mode(), Mode::All);
    }

    #[test]
    fn test_reconcile_overwrites_count() {
        let mut model = SelectionModel::new(Mode::None);
        model.toggle("a");
        model.reconcile_count(41);
        assert_eq!(model.selected_count(), 41);
        model.reconcile_count(1);
        assert_eq!(model.selected_count(), 1);
    }
}
