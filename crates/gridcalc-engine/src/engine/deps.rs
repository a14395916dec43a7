//! Reverse dependency index.
//!
//! Maps each referenced cell to the formula cells that read it:
//!
//! ```text
//! A1 -> {B1, C4}   means  B1 and C4 both read A1
//! ```
//!
//! The graph is kept equal to the inverse of every cell's `references` set.
//! It is updated from the difference between a cell's old and new references,
//! so a write only touches the edges that actually changed. Empty dependent
//! sets are removed rather than stored.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

use super::cell_ref::CellRef;

#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    dependents: FxHashMap<CellRef, FxHashSet<CellRef>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `cell` now reads `new` instead of `old`.
    pub fn on_cell_written(
        &mut self,
        cell: CellRef,
        old: &BTreeSet<CellRef>,
        new: &BTreeSet<CellRef>,
    ) {
        for gone in old.difference(new) {
            if let Some(readers) = self.dependents.get_mut(gone) {
                readers.remove(&cell);
                if readers.is_empty() {
                    self.dependents.remove(gone);
                }
            }
        }
        for added in new.difference(old) {
            self.dependents.entry(*added).or_default().insert(cell);
        }
    }

    /// Cells whose formulas read `cell` directly, in row-major order.
    pub fn dependents_of(&self, cell: &CellRef) -> BTreeSet<CellRef> {
        self.dependents
            .get(cell)
            .map(|readers| readers.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.dependents.clear();
    }
}
