//! Recalculation: recomputing single formulas and propagating changes.

use super::{CellSnapshot, Document};
use gridcalc_engine::engine::{CellRef, FormulaError, Value, evaluate_with_options};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// One step of the iterative depth-first walk over dependents.
enum Step {
    /// Visit a cell and schedule its dependents.
    Enter(CellRef),
    /// Every dependent reachable through this cell has been ordered.
    Exit(CellRef),
}

impl Document {
    /// Snapshot of the cell at (row, col). Absent cells read as empty.
    pub fn read_cell(&self, row: usize, col: usize) -> CellSnapshot {
        self.cells
            .get(&CellRef::new(row, col))
            .map(CellSnapshot::of)
            .unwrap_or_default()
    }

    /// Display string for a cell, as used by CSV export.
    pub fn display_value(&self, at: &CellRef) -> String {
        self.cells
            .get(at)
            .map(|cell| cell.value.display())
            .unwrap_or_default()
    }

    /// Re-evaluate the formula stored at `at` against the current store and
    /// bring its value, references and graph edges up to date. Non-formula
    /// cells are left alone.
    pub(crate) fn recompute(&mut self, at: CellRef) -> Result<(), FormulaError> {
        let Some(formula) = self.cells.get(&at).and_then(|c| c.formula.clone()) else {
            return Ok(());
        };
        let evaluation = evaluate_with_options(&formula, &at, &self.cells, &self.options);
        let references: BTreeSet<CellRef> = evaluation.references.iter().copied().collect();

        let Some(cell) = self.cells.get_mut(&at) else {
            return Ok(());
        };
        let old_references = std::mem::replace(&mut cell.references, references);
        self.graph
            .on_cell_written(at, &old_references, &cell.references);

        match evaluation.value {
            Ok(value) => {
                cell.value = value;
                Ok(())
            }
            Err(e) => {
                cell.value = Value::Error;
                Err(e)
            }
        }
    }

    /// Recompute every cell that transitively depends on `changed`.
    ///
    /// The changed cells must already hold their new values; they are not
    /// recomputed themselves. Failures are stored as error values and do not
    /// stop the pass.
    pub(crate) fn propagate(&mut self, changed: &[CellRef]) {
        let order = self.evaluation_order(changed, false);
        if order.is_empty() {
            return;
        }
        let failed = order
            .into_iter()
            .filter(|cell| self.recompute(*cell).is_err())
            .count();
        log::debug!(
            "propagated {} change(s), {} dependent(s) failed",
            changed.len(),
            failed
        );
    }

    /// Recompute every formula in the store from its text.
    ///
    /// Used after structural edits: the graph is rebuilt from scratch in a
    /// first pass, then every formula is evaluated again in dependency order so
    /// each one sees freshly computed inputs.
    pub(crate) fn reevaluate_all(&mut self) {
        self.graph.clear();
        for cell in self.cells.values_mut() {
            cell.references.clear();
        }

        let mut formulas: Vec<CellRef> = self
            .cells
            .iter()
            .filter(|(_, cell)| cell.is_formula())
            .map(|(at, _)| *at)
            .collect();
        formulas.sort();

        for at in &formulas {
            // Errors here are provisional; the ordered pass below settles them.
            let _ = self.recompute(*at);
        }

        let order = self.evaluation_order(&formulas, true);
        let failed = order
            .into_iter()
            .filter(|cell| self.recompute(*cell).is_err())
            .count();
        log::debug!("re-evaluated {} formula(s), {} failed", formulas.len(), failed);
    }

    /// Cells reachable from `roots` through the dependency graph, ordered so
    /// that every cell comes after the cells it reads (reverse post-order of
    /// an iterative depth-first walk). Each cell appears once, so cycles
    /// terminate; the cells on a cycle are ordered arbitrarily.
    pub(crate) fn evaluation_order(&self, roots: &[CellRef], include_roots: bool) -> Vec<CellRef> {
        let mut visited: FxHashSet<CellRef> = FxHashSet::default();
        let mut on_path: FxHashSet<CellRef> = FxHashSet::default();
        let mut postorder = Vec::new();
        let mut stack: Vec<Step> = roots.iter().rev().map(|root| Step::Enter(*root)).collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(cell) => {
                    if !visited.insert(cell) {
                        continue;
                    }
                    on_path.insert(cell);
                    stack.push(Step::Exit(cell));
                    for dependent in self.graph.dependents_of(&cell).into_iter().rev() {
                        if on_path.contains(&dependent) {
                            log::warn!("circular dependency between {} and {}", cell, dependent);
                        } else if !visited.contains(&dependent) {
                            stack.push(Step::Enter(dependent));
                        }
                    }
                }
                Step::Exit(cell) => {
                    on_path.remove(&cell);
                    postorder.push(cell);
                }
            }
        }

        postorder.reverse();
        if !include_roots {
            let roots: FxHashSet<CellRef> = roots.iter().copied().collect();
            postorder.retain(|cell| !roots.contains(cell));
        }
        postorder
    }
}
