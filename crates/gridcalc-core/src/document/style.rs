//! Cell styling. The engine never reads these attributes; they only have to
//! survive value writes and structural edits.

use super::Document;
use gridcalc_engine::engine::{CellRef, Style};

impl Document {
    /// Apply `change` to the styling of (row, col), creating the record if
    /// needed. A record left with no content and default styling is dropped.
    pub fn update_style(&mut self, row: usize, col: usize, change: impl FnOnce(&mut Style)) {
        let at = CellRef::new(row, col);
        change(&mut self.cells.entry(at).or_default().style);
        self.prune(&at);
        self.modified = true;
    }

    pub fn toggle_bold(&mut self, row: usize, col: usize) {
        self.update_style(row, col, |style| style.bold = !style.bold);
    }

    pub fn toggle_italic(&mut self, row: usize, col: usize) {
        self.update_style(row, col, |style| style.italic = !style.italic);
    }

    pub fn set_font_family(&mut self, row: usize, col: usize, family: &str) {
        self.update_style(row, col, |style| style.font_family = Some(family.to_string()));
    }

    pub fn set_font_size(&mut self, row: usize, col: usize, size: u32) {
        self.update_style(row, col, |style| style.font_size = Some(size));
    }

    pub fn set_font_color(&mut self, row: usize, col: usize, color: &str) {
        self.update_style(row, col, |style| style.color = Some(color.to_string()));
    }

    pub fn set_background_color(&mut self, row: usize, col: usize, color: &str) {
        self.update_style(row, col, |style| {
            style.background_color = Some(color.to_string())
        });
    }
}
