//! Single-cell clipboard.
//!
//! Copying stores the whole record. Pasting writes the copied input back
//! verbatim (formula text is not translated) so it is re-evaluated at the
//! destination, then applies the copied styling.

use super::{CellSnapshot, Document};
use crate::error::{GridcalcError, Result};
use gridcalc_engine::engine::CellRef;

impl Document {
    /// Copy (row, col) to the clipboard. An empty cell copies as empty.
    pub fn copy_cell(&mut self, row: usize, col: usize) {
        let cell = self
            .cells
            .get(&CellRef::new(row, col))
            .cloned()
            .unwrap_or_default();
        self.clipboard = Some(cell);
    }

    /// Copy (row, col) to the clipboard, then clear it.
    pub fn cut_cell(&mut self, row: usize, col: usize) {
        self.copy_cell(row, col);
        self.clear_cell(row, col);
    }

    /// Paste the clipboard into (row, col).
    pub fn paste_cell(&mut self, row: usize, col: usize) -> Result<CellSnapshot> {
        let copied = self.clipboard.clone().ok_or(GridcalcError::ClipboardEmpty)?;
        let input = (copied.raw_input.is_some() || copied.is_formula())
            .then(|| copied.to_input_string());
        self.place(CellRef::new(row, col), input.as_deref(), &copied.style)?;
        Ok(self.read_cell(row, col))
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }
}
