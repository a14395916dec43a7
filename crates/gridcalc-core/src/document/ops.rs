use super::{CellSnapshot, Document};
use gridcalc_engine::engine::{
    Cell, CellRef, FormulaError, RangeRef, Style, Value, evaluate_with_options, translate_formula,
};
use std::collections::BTreeSet;

/// Dimension for row/column operations
#[derive(Copy, Clone, Debug)]
enum Dimension {
    Row,
    Column,
}

impl Dimension {
    /// Get the coordinate value from a CellRef for this dimension
    fn get_coord(&self, cell_ref: &CellRef) -> usize {
        match self {
            Dimension::Row => cell_ref.row,
            Dimension::Column => cell_ref.col,
        }
    }

    /// Create a new CellRef with modified coordinate in this dimension
    fn new_cell_ref(&self, cell_ref: &CellRef, new_coord: usize) -> CellRef {
        match self {
            Dimension::Row => CellRef::new(new_coord, cell_ref.col),
            Dimension::Column => CellRef::new(cell_ref.row, new_coord),
        }
    }
}

impl Document {
    /// Set cell contents from user input and recompute everything downstream.
    ///
    /// A formula that reads its own cell is rejected and the store is left
    /// untouched. Any other formula failure still stores the cell, with an
    /// error value and the references read before the failure, and the error
    /// is returned after dependents have been updated. Styling is kept.
    pub fn write_cell(
        &mut self,
        row: usize,
        col: usize,
        raw: &str,
    ) -> Result<CellSnapshot, FormulaError> {
        let at = CellRef::new(row, col);
        let mut cell = Cell::from_input(raw);
        let mut outcome = Ok(());

        if let Some(formula) = &cell.formula {
            let evaluation = evaluate_with_options(formula, &at, &self.cells, &self.options);
            cell.references = evaluation.references.iter().copied().collect();
            match evaluation.value {
                Ok(value) => cell.value = value,
                Err(e @ FormulaError::CircularReference(_)) => {
                    log::warn!("rejected ={} at {}: {}", formula, at, e);
                    return Err(e);
                }
                Err(e) => {
                    cell.value = Value::Error;
                    outcome = Err(e);
                }
            }
        }

        let old_references = match self.cells.get(&at) {
            Some(old) => {
                cell.style = old.style.clone();
                old.references.clone()
            }
            None => BTreeSet::new(),
        };
        self.graph.on_cell_written(at, &old_references, &cell.references);
        self.cells.insert(at, cell);
        self.modified = true;

        self.propagate(&[at]);
        outcome.map(|()| self.read_cell(row, col))
    }

    /// Clear the specified cell, dropping its content and styling.
    pub fn clear_cell(&mut self, row: usize, col: usize) {
        let at = CellRef::new(row, col);
        if let Some(old) = self.cells.remove(&at) {
            self.graph.on_cell_written(at, &old.references, &BTreeSet::new());
            self.modified = true;
            self.propagate(&[at]);
        }
    }

    /// Generic insert operation for row or column
    fn insert_dimension(&mut self, dim: Dimension, at: usize) {
        let to_move: Vec<CellRef> = self
            .cells
            .keys()
            .filter(|cell_ref| dim.get_coord(cell_ref) >= at)
            .copied()
            .collect();

        let moved: Vec<(CellRef, Cell)> = to_move
            .into_iter()
            .filter_map(|cell_ref| {
                let cell = self.cells.remove(&cell_ref)?;
                let coord = dim.get_coord(&cell_ref);
                Some((dim.new_cell_ref(&cell_ref, coord + 1), cell))
            })
            .collect();

        log::info!("inserted {:?} at {}, {} record(s) moved", dim, at, moved.len());
        self.cells.extend(moved);
        self.reevaluate_all();
        self.modified = true;
    }

    /// Generic delete operation for row or column
    fn delete_dimension(&mut self, dim: Dimension, at: usize) {
        self.cells.retain(|cell_ref, _| dim.get_coord(cell_ref) != at);

        let to_move: Vec<CellRef> = self
            .cells
            .keys()
            .filter(|cell_ref| dim.get_coord(cell_ref) > at)
            .copied()
            .collect();

        let moved: Vec<(CellRef, Cell)> = to_move
            .into_iter()
            .filter_map(|cell_ref| {
                let cell = self.cells.remove(&cell_ref)?;
                let coord = dim.get_coord(&cell_ref);
                Some((dim.new_cell_ref(&cell_ref, coord - 1), cell))
            })
            .collect();

        log::info!("deleted {:?} at {}, {} record(s) moved", dim, at, moved.len());
        self.cells.extend(moved);
        self.reevaluate_all();
        self.modified = true;
    }

    /// Insert a row above the specified row
    pub fn insert_row(&mut self, at_row: usize) {
        self.insert_dimension(Dimension::Row, at_row);
    }

    /// Delete the specified row
    pub fn delete_row(&mut self, at_row: usize) {
        self.delete_dimension(Dimension::Row, at_row);
    }

    /// Insert a column left of the specified column
    pub fn insert_column(&mut self, at_col: usize) {
        self.insert_dimension(Dimension::Column, at_col);
    }

    /// Delete the specified column
    pub fn delete_column(&mut self, at_col: usize) {
        self.delete_dimension(Dimension::Column, at_col);
    }

    /// Input that reproduces the source cell at `to`: formulas get their
    /// relative references shifted by the distance moved, anything else is
    /// copied verbatim. `None` when the source holds no content.
    fn relocated_input(&self, from: &CellRef, to: &CellRef) -> Option<String> {
        let source = self.cells.get(from)?;
        match &source.formula {
            Some(formula) => {
                let delta_row = to.row as isize - from.row as isize;
                let delta_col = to.col as isize - from.col as isize;
                Some(format!("={}", translate_formula(formula, delta_row, delta_col)))
            }
            None => source.raw_input.clone(),
        }
    }

    /// Write the content of (from_row, from_col) into (to_row, to_col),
    /// translating relative references. An empty source clears the destination.
    pub fn move_formula(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
    ) -> Result<CellSnapshot, FormulaError> {
        let from = CellRef::new(from_row, from_col);
        let to = CellRef::new(to_row, to_col);
        match self.relocated_input(&from, &to) {
            Some(input) => self.write_cell(to_row, to_col, &input),
            None => {
                self.clear_cell(to_row, to_col);
                Ok(self.read_cell(to_row, to_col))
            }
        }
    }

    /// Fill every cell of `target` except `source` itself with the source
    /// content, translated per cell, and the source styling.
    ///
    /// Cells that fail keep going; the failures are returned.
    pub fn fill(&mut self, source: CellRef, target: &RangeRef) -> Vec<(CellRef, FormulaError)> {
        let style = self
            .cells
            .get(&source)
            .map(|cell| cell.style.clone())
            .unwrap_or_default();

        let mut failures = Vec::new();
        for cell in target.cells() {
            if cell == source {
                continue;
            }
            let input = self.relocated_input(&source, &cell);
            if let Err(e) = self.place(cell, input.as_deref(), &style) {
                failures.push((cell, e));
            }
        }
        log::debug!(
            "filled {} from {}, {} failure(s)",
            target,
            source,
            failures.len()
        );
        failures
    }

    /// Write `input` (or clear, for `None`) at `at` and give it `style`.
    /// A rejected write leaves the destination untouched, styling included.
    pub(crate) fn place(
        &mut self,
        at: CellRef,
        input: Option<&str>,
        style: &Style,
    ) -> Result<(), FormulaError> {
        let written = match input {
            Some(input) => self.write_cell(at.row, at.col, input).map(|_| ()),
            None => {
                self.clear_cell(at.row, at.col);
                Ok(())
            }
        };
        if matches!(written, Err(FormulaError::CircularReference(_))) {
            return written;
        }
        self.update_style(at.row, at.col, |s| *s = style.clone());
        written
    }
}
