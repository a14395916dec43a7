use gridcalc_engine::engine::{
    Cell, CellRef, DependencyGraph, EvalOptions, Grid, Style, ValueType,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// What the presentation layer sees of one cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CellSnapshot {
    pub display_value: String,
    /// Formula text including its leading `=`, for formula cells.
    pub formula_text: Option<String>,
    pub value_type: ValueType,
    pub styling: Style,
}

impl CellSnapshot {
    pub(crate) fn of(cell: &Cell) -> Self {
        CellSnapshot {
            display_value: cell.value.display(),
            formula_text: cell.formula.as_ref().map(|f| format!("={}", f)),
            value_type: cell.value.value_type(),
            styling: cell.style.clone(),
        }
    }
}

/// UI-agnostic document state for the spreadsheet.
///
/// Every mutation takes `&mut self` and completes before returning; callers
/// sharing a document across threads wrap the whole value in one lock.
pub struct Document {
    /// Sparse cell store. An absent record is an empty, unstyled cell.
    pub(crate) cells: Grid,
    /// Reverse dependency map: cell -> cells whose formulas read it
    pub(crate) graph: DependencyGraph,
    pub(crate) options: EvalOptions,
    /// Last copied or cut cell
    pub(crate) clipboard: Option<Cell>,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the document has been modified since the last load or save
    pub modified: bool,
}

impl Document {
    /// Create a new, empty document.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_options(EvalOptions::default())
    }

    pub fn with_options(options: EvalOptions) -> Self {
        Document {
            cells: Grid::default(),
            graph: DependencyGraph::new(),
            options,
            clipboard: None,
            file_path: None,
            modified: false,
        }
    }

    /// Drop every record, the dependency graph and the clipboard.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.graph.clear();
        self.clipboard = None;
        self.modified = true;
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Coordinates of every stored record, in row-major order.
    pub fn used_cells(&self) -> Vec<CellRef> {
        let mut cells: Vec<CellRef> = self.cells.keys().copied().collect();
        cells.sort();
        cells
    }

    /// Largest row and column index holding a record.
    pub(crate) fn used_extent(&self) -> Option<(usize, usize)> {
        self.cells.keys().fold(None, |extent, cell| match extent {
            None => Some((cell.row, cell.col)),
            Some((row, col)) => Some((row.max(cell.row), col.max(cell.col))),
        })
    }

    /// Cells the formula at (row, col) read during its last evaluation.
    pub fn references_of(&self, row: usize, col: usize) -> BTreeSet<CellRef> {
        self.cells
            .get(&CellRef::new(row, col))
            .map(|cell| cell.references.clone())
            .unwrap_or_default()
    }

    /// Cells whose formulas read (row, col) directly.
    pub fn dependents_of(&self, row: usize, col: usize) -> BTreeSet<CellRef> {
        self.graph.dependents_of(&CellRef::new(row, col))
    }

    /// Text to put in an editor for (row, col): the formula with `=`, or the raw input.
    pub fn input_of(&self, row: usize, col: usize) -> String {
        self.cells
            .get(&CellRef::new(row, col))
            .map(Cell::to_input_string)
            .unwrap_or_default()
    }

    /// Style-only and content-free records are dropped so an absent record
    /// keeps meaning "empty cell".
    pub(crate) fn prune(&mut self, at: &CellRef) {
        let removable = self.cells.get(at).is_some_and(|cell| {
            cell.raw_input.is_none() && !cell.is_formula() && cell.style.is_default()
        });
        if removable {
            self.cells.remove(at);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
