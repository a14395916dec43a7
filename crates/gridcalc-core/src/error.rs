//! Error types for Gridcalc core.

use thiserror::Error;

use gridcalc_engine::engine::FormulaError;

/// Errors that can occur while editing or storing a document
#[derive(Error, Debug)]
pub enum GridcalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error("Clipboard is empty")]
    ClipboardEmpty,
}

pub type Result<T> = std::result::Result<T, GridcalcError>;
