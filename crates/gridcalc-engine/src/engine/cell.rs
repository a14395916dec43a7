//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the core data types for representing cells:
//! - [`Value`] - The literal value of a cell (number, text, error, or nothing)
//! - [`Style`] - Presentation attributes carried through untouched by the engine
//! - [`Cell`] - A stored cell: raw input, formula text, computed value, references
//! - [`Grid`] - Sparse storage for cells keyed by coordinate

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::cell_ref::CellRef;
use super::error::ERROR_LITERAL;
use super::format::format_number;

/// The literal value held by a cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value at all. Reads as `0` in arithmetic and `""` as text.
    #[default]
    Empty,
    Number(f64),
    Text(String),
    /// The formula producing this value failed.
    Error,
}

/// Coarse kind of a value, as reported to the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    #[default]
    Empty,
    Number,
    Text,
    Error,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Empty => ValueType::Empty,
            Value::Number(_) => ValueType::Number,
            Value::Text(_) => ValueType::Text,
            Value::Error => ValueType::Error,
        }
    }

    /// Numeric reading used by range aggregates: empty cells count as `0`,
    /// text counts only when it is itself a decimal number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Empty => Some(0.0),
            Value::Number(n) => Some(*n),
            Value::Text(s) => sniff_number(s),
            Value::Error => None,
        }
    }

    /// Display string for the value.
    pub fn display(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Error => ERROR_LITERAL.to_string(),
        }
    }
}

/// Parse text that is entirely a decimal number (surrounding whitespace allowed).
///
/// Words like `inf` or `NaN` are deliberately not numbers here.
pub fn sniff_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty()
        || !trimmed
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-' | b'e' | b'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Presentation attributes of a cell. Never interpreted by the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub color: Option<String>,
    pub background_color: Option<String>,
}

impl Style {
    pub fn is_default(&self) -> bool {
        *self == Style::default()
    }
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Last text entered by the user, verbatim.
    pub raw_input: Option<String>,
    /// Formula body (the raw input without its leading `=`).
    pub formula: Option<String>,
    pub value: Value,
    /// Cells the formula read during its last evaluation.
    pub references: BTreeSet<CellRef>,
    pub style: Style,
}

impl Cell {
    /// Parse user input and create the matching cell.
    /// - Empty string -> Empty value
    /// - Starts with '=' -> formula (without the '='); value is filled in by evaluation
    /// - Valid decimal number -> Number
    /// - Otherwise -> Text, verbatim
    pub fn from_input(input: &str) -> Cell {
        let mut cell = Cell {
            raw_input: Some(input.to_string()),
            ..Cell::default()
        };

        if let Some(formula) = input.strip_prefix('=') {
            cell.formula = Some(formula.to_string());
        } else if input.is_empty() {
            cell.value = Value::Empty;
        } else if let Some(n) = sniff_number(input) {
            cell.value = Value::Number(n);
        } else {
            cell.value = Value::Text(input.to_string());
        }
        cell
    }

    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// Text to show when the cell is edited: the formula with its `=`, else the raw input.
    pub fn to_input_string(&self) -> String {
        match (&self.formula, &self.raw_input) {
            (Some(formula), _) => format!("={}", formula),
            (None, Some(raw)) => raw.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Sparse grid storage.
pub type Grid = FxHashMap<CellRef, Cell>;

/// Read-only view of cell values, as needed by the evaluator.
pub trait ValueLookup {
    /// The value at `cell`, or `None` when no record exists.
    fn value_at(&self, cell: &CellRef) -> Option<&Value>;
}

impl ValueLookup for Grid {
    fn value_at(&self, cell: &CellRef) -> Option<&Value> {
        self.get(cell).map(|c| &c.value)
    }
}
