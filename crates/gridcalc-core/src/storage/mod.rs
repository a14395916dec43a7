//! Storage module for CSV import/export

mod csv;

pub use csv::{escape_csv_field, parse_csv, write_csv};
