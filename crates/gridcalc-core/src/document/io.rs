use super::Document;
use crate::error::Result;
use crate::storage::{parse_csv, write_csv};
use gridcalc_engine::engine::{CellRef, FormulaError};
use std::path::Path;

impl Document {
    /// Export display values as CSV, covering rows and columns from A1 to
    /// the furthest record. Empty documents export as an empty string.
    pub fn export_csv(&self) -> String {
        let Some((max_row, max_col)) = self.used_extent() else {
            return String::new();
        };
        let rows = (0..=max_row).map(|row| {
            (0..=max_col)
                .map(|col| self.display_value(&CellRef::new(row, col)))
                .collect::<Vec<_>>()
        });
        write_csv(rows)
    }

    /// Replace the document with the contents of CSV text.
    ///
    /// Every non-empty field is written as if typed by the user, so formulas
    /// are evaluated. Returns the number of cells stored.
    pub fn import_csv(&mut self, text: &str) -> usize {
        self.reset();
        let mut stored = 0;
        for (row, fields) in parse_csv(text).into_iter().enumerate() {
            for (col, field) in fields.into_iter().enumerate() {
                if field.is_empty() {
                    continue;
                }
                match self.write_cell(row, col, &field) {
                    Ok(_) => stored += 1,
                    Err(e @ FormulaError::CircularReference(_)) => {
                        log::warn!("skipped {}: {}", CellRef::new(row, col), e);
                    }
                    Err(e) => {
                        log::warn!("imported {} with error: {}", CellRef::new(row, col), e);
                        stored += 1;
                    }
                }
            }
        }
        stored
    }

    /// Load a CSV file, replacing the current contents.
    pub fn load_csv(&mut self, path: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(path)?;
        let stored = self.import_csv(&text);
        log::info!("loaded {} cell(s) from {}", stored, path.display());
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(stored)
    }

    /// Save display values to a CSV file.
    pub fn save_csv(&mut self, path: &Path) -> Result<()> {
        std::fs::write(path, self.export_csv())?;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_covers_rectangle_from_a1() {
        let mut doc = Document::new();
        doc.write_cell(1, 2, "x").unwrap();
        doc.write_cell(0, 0, "1").unwrap();
        assert_eq!(doc.export_csv(), "1,,\r\n,,x");
    }

    #[test]
    fn test_export_uses_display_values() {
        let mut doc = Document::new();
        doc.write_cell(0, 0, "2").unwrap();
        doc.write_cell(0, 1, "=A1*3").unwrap();
        let _ = doc.write_cell(0, 2, "=A1+\"x\"");
        assert_eq!(doc.export_csv(), "2,6,#ERROR!");
    }

    #[test]
    fn test_export_quotes_and_reimports() {
        let mut doc = Document::new();
        doc.write_cell(0, 0, "a,\"b\"").unwrap();
        let csv = doc.export_csv();
        assert_eq!(csv, "\"a,\"\"b\"\"\"");

        let mut other = Document::new();
        assert_eq!(other.import_csv(&csv), 1);
        assert_eq!(other.read_cell(0, 0).display_value, "a,\"b\"");
    }

    #[test]
    fn test_import_evaluates_formulas_in_any_order() {
        let mut doc = Document::new();
        let stored = doc.import_csv("=B1*2,3\r\n=SUM(A1:B1),\n");
        assert_eq!(stored, 3);
        assert_eq!(doc.read_cell(0, 0).display_value, "6");
        assert_eq!(doc.read_cell(1, 0).display_value, "9");
        assert_eq!(doc.export_csv(), "6,3\r\n9,");
    }

    #[test]
    fn test_import_replaces_existing_contents() {
        let mut doc = Document::new();
        doc.write_cell(5, 5, "stale").unwrap();
        doc.copy_cell(5, 5);
        doc.import_csv("fresh");
        assert_eq!(doc.used_cells(), vec![CellRef::new(0, 0)]);
        assert!(!doc.has_clipboard());
    }

    #[test]
    fn test_empty_document_exports_nothing() {
        assert_eq!(Document::new().export_csv(), "");
    }
}
