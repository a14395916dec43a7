//! Document state and logic (UI-agnostic).

mod clipboard;
mod eval;
mod io;
mod ops;
mod state;
mod style;

pub use state::{CellSnapshot, Document};
