//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`Cell`], [`Value`], [`Style`], [`Grid`] - Data structures for cell storage
//! - [`CellRef`], [`RangeRef`] - Reference parsing (A1 notation ↔ row/col indices)
//! - [`evaluate`] - Staged formula evaluation with reference tracking
//! - [`DependencyGraph`] - Reverse index from referenced cells to their readers
//! - [`translate_formula`] - Relative reference rewriting for copy and fill
//! - [`format_number`] - Format values for display

mod cell;
mod cell_ref;
mod deps;
mod error;
mod eval;
mod expr;
mod format;
mod preprocess;

pub use cell::{Cell, Grid, Style, Value, ValueLookup, ValueType, sniff_number};
pub use cell_ref::{CellRef, RangeRef, col_to_letters, letters_to_col};
pub use deps::DependencyGraph;
pub use error::{ERROR_LITERAL, FormulaError};
pub use eval::{EvalOptions, Evaluation, MAX_RANGE_CELLS, evaluate, evaluate_with_options};
pub use expr::{ExprValue, evaluate_expression};
pub use format::format_number;
pub use preprocess::{preprocess_formula, translate_formula};
