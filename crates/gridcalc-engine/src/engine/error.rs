//! Formula evaluation errors.

use thiserror::Error;

use super::cell_ref::CellRef;

/// Literal shown in place of a value for any cell whose formula failed.
pub const ERROR_LITERAL: &str = "#ERROR!";

/// Why a formula could not be evaluated.
///
/// The three kinds are distinguished for callers and logs only; every one of
/// them displays as [`ERROR_LITERAL`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Circular reference to {0}")]
    CircularReference(CellRef),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
}
