//! gridcalc_engine - Spreadsheet formula engine.

pub(crate) mod builtins;
pub mod engine;
