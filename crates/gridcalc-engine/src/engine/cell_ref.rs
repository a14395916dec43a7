//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates, plus
//! rectangular ranges like "A1:B5".
//!
//! # Examples
//!
//! ```
//! use gridcalc_engine::engine::CellRef;
//!
//! let cell = CellRef::parse("B3").unwrap();
//! assert_eq!(cell.row, 2);  // 0-indexed
//! assert_eq!(cell.col, 1);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use super::error::FormulaError;

/// A reference to a cell by row and column indices (0-indexed).
///
/// Ordering is row-major, which is also the order used whenever the engine
/// walks cells deterministically.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference from A1 notation.
    ///
    /// The whole token must be upper-case column letters followed by a
    /// 1-based row number.
    pub fn parse(name: &str) -> Result<CellRef, FormulaError> {
        let split = name
            .find(|c: char| !c.is_ascii_uppercase())
            .ok_or_else(|| invalid(name))?;
        let (letters, digits) = name.split_at(split);
        Self::from_parts(letters, digits).map_err(|_| invalid(name))
    }

    /// Build a reference from already separated column letters and row digits.
    pub fn from_parts(letters: &str, digits: &str) -> Result<CellRef, FormulaError> {
        let col = letters_to_col(letters)?;
        let row = parse_row(digits)?;
        Ok(CellRef::new(row, col))
    }

    /// The same position shifted by a signed delta, or `None` when the result
    /// would fall above row 1 or left of column A.
    pub fn offset(&self, delta_row: isize, delta_col: isize) -> Option<CellRef> {
        let row = self.row.checked_add_signed(delta_row)?;
        let col = self.col.checked_add_signed(delta_col)?;
        Some(CellRef::new(row, col))
    }
}

/// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
pub fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col as u128 + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Convert spreadsheet-style column letters back to a zero-based index.
pub fn letters_to_col(letters: &str) -> Result<usize, FormulaError> {
    if letters.is_empty() {
        return Err(invalid(letters));
    }
    let mut acc = 0usize;
    for c in letters.bytes() {
        if !c.is_ascii_uppercase() {
            return Err(invalid(letters));
        }
        let digit = (c - b'A') as usize + 1;
        acc = acc
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| invalid(letters))?;
    }
    Ok(acc - 1)
}

fn parse_row(digits: &str) -> Result<usize, FormulaError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(digits));
    }
    digits
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| invalid(digits))
}

fn invalid(text: &str) -> FormulaError {
    FormulaError::InvalidReference(text.to_string())
}

impl std::str::FromStr for CellRef {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letters(self.col), self.row + 1)
    }
}

/// A rectangular range of cells, as written (`start` need not be the top-left corner).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct RangeRef {
    pub start: CellRef,
    pub end: CellRef,
}

impl RangeRef {
    pub fn new(start: CellRef, end: CellRef) -> RangeRef {
        RangeRef { start, end }
    }

    /// Parse a range like "A1:B5".
    pub fn parse(range: &str) -> Result<RangeRef, FormulaError> {
        let (start, end) = range.split_once(':').ok_or_else(|| invalid(range))?;
        Ok(RangeRef::new(CellRef::parse(start)?, CellRef::parse(end)?))
    }

    pub fn rows(&self) -> RangeInclusive<usize> {
        self.start.row.min(self.end.row)..=self.start.row.max(self.end.row)
    }

    pub fn cols(&self) -> RangeInclusive<usize> {
        self.start.col.min(self.end.col)..=self.start.col.max(self.end.col)
    }

    /// Number of cells covered, or `None` on overflow.
    pub fn cell_count(&self) -> Option<usize> {
        let rows = self.rows();
        let cols = self.cols();
        (rows.end() - rows.start() + 1).checked_mul(cols.end() - cols.start() + 1)
    }

    /// Every cell in the rectangle, row by row.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + use<> {
        let cols = self.cols();
        self.rows()
            .flat_map(move |row| cols.clone().map(move |col| CellRef::new(row, col)))
    }
}

impl std::str::FromStr for RangeRef {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeRef::parse(s)
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
