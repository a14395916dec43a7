//! Command-line parsing and edit application.

use gridcalc_core::{CellRef, Document, RangeRef};
use gridcalc_engine::engine::letters_to_col;
use std::path::PathBuf;

pub fn print_usage() {
    eprintln!("Usage: gridcalc [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    CSV file to load");
    eprintln!();
    eprintln!("Edits (applied in order):");
    eprintln!("  --set <CELL>=<INPUT>      Write a value or =formula into a cell");
    eprintln!("  --clear <CELL>            Clear a cell");
    eprintln!("  --insert-row <N>          Insert a row above row N");
    eprintln!("  --delete-row <N>          Delete row N");
    eprintln!("  --insert-column <COL>     Insert a column left of COL (letters or 1-based number)");
    eprintln!("  --delete-column <COL>     Delete column COL");
    eprintln!("  --move <FROM>:<TO>        Copy FROM into TO, shifting relative references");
    eprintln!("  --fill <SRC>:<RANGE>      Fill RANGE from SRC, e.g. B1:B2:B10");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <FILE>       Write the CSV export to FILE instead of stdout");
    eprintln!("  --json                    Print every cell as JSON instead of CSV");
    eprintln!("  --config <FILE>           Read settings from FILE");
    eprintln!("  --no-config               Ignore the user settings file");
    eprintln!("  -v, --verbose             Log debug output to stderr");
    eprintln!("  -h, --help                Print help");
}

/// One edit from the command line.
#[derive(Clone, Debug, PartialEq)]
pub enum Edit {
    Set(CellRef, String),
    Clear(CellRef),
    InsertRow(usize),
    DeleteRow(usize),
    InsertColumn(usize),
    DeleteColumn(usize),
    Move(CellRef, CellRef),
    Fill(CellRef, RangeRef),
}

#[derive(Debug, Default)]
pub struct Options {
    pub file: Option<PathBuf>,
    pub edits: Vec<Edit>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub config: Option<PathBuf>,
    pub no_config: bool,
    pub verbose: bool,
}

/// Parse arguments (without the program name). `Ok(None)` means help was requested.
pub fn parse_args<I>(args: I) -> Result<Option<Options>, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("{} requires a value", name))
        };
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-v" | "--verbose" => options.verbose = true,
            "--json" => options.json = true,
            "--no-config" => options.no_config = true,
            "-o" | "--output" => options.output = Some(PathBuf::from(value(&arg)?)),
            "--config" => options.config = Some(PathBuf::from(value(&arg)?)),
            "--set" => {
                let pair = value(&arg)?;
                let (cell, input) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("--set expects CELL=INPUT, got {:?}", pair))?;
                options.edits.push(Edit::Set(parse_cell(cell)?, input.to_string()));
            }
            "--clear" => options.edits.push(Edit::Clear(parse_cell(&value(&arg)?)?)),
            "--insert-row" => options.edits.push(Edit::InsertRow(parse_row(&value(&arg)?)?)),
            "--delete-row" => options.edits.push(Edit::DeleteRow(parse_row(&value(&arg)?)?)),
            "--insert-column" => {
                options.edits.push(Edit::InsertColumn(parse_column(&value(&arg)?)?))
            }
            "--delete-column" => {
                options.edits.push(Edit::DeleteColumn(parse_column(&value(&arg)?)?))
            }
            "--move" => {
                let pair = value(&arg)?;
                let (from, to) = pair
                    .split_once(':')
                    .ok_or_else(|| format!("--move expects FROM:TO, got {:?}", pair))?;
                options.edits.push(Edit::Move(parse_cell(from)?, parse_cell(to)?));
            }
            "--fill" => {
                let pair = value(&arg)?;
                let (source, range) = pair
                    .split_once(':')
                    .ok_or_else(|| format!("--fill expects SRC:RANGE, got {:?}", pair))?;
                let range = RangeRef::parse(&range.to_ascii_uppercase())
                    .map_err(|e| format!("--fill: {}", e))?;
                options.edits.push(Edit::Fill(parse_cell(source)?, range));
            }
            other if other.starts_with('-') => return Err(format!("Unknown option: {}", other)),
            _ => {
                if options.file.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                options.file = Some(PathBuf::from(arg.as_str()));
            }
        }
    }

    Ok(Some(options))
}

fn parse_cell(text: &str) -> Result<CellRef, String> {
    CellRef::parse(&text.trim().to_ascii_uppercase()).map_err(|e| e.to_string())
}

/// 1-based row number to a zero-based index.
fn parse_row(text: &str) -> Result<usize, String> {
    text.trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| format!("Invalid row number: {}", text))
}

/// Column letters or a 1-based column number to a zero-based index.
fn parse_column(text: &str) -> Result<usize, String> {
    let text = text.trim();
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return parse_row(text).map_err(|_| format!("Invalid column: {}", text));
    }
    letters_to_col(&text.to_ascii_uppercase()).map_err(|_| format!("Invalid column: {}", text))
}

impl Edit {
    /// Apply the edit. Returns one message per cell that failed to evaluate.
    pub fn apply(&self, doc: &mut Document) -> Vec<String> {
        let mut failures = Vec::new();
        match self {
            Edit::Set(cell, input) => {
                if let Err(e) = doc.write_cell(cell.row, cell.col, input) {
                    failures.push(format!("{}: {}", cell, e));
                }
            }
            Edit::Clear(cell) => doc.clear_cell(cell.row, cell.col),
            Edit::InsertRow(at) => doc.insert_row(*at),
            Edit::DeleteRow(at) => doc.delete_row(*at),
            Edit::InsertColumn(at) => doc.insert_column(*at),
            Edit::DeleteColumn(at) => doc.delete_column(*at),
            Edit::Move(from, to) => {
                if let Err(e) = doc.move_formula(from.row, from.col, to.row, to.col) {
                    failures.push(format!("{}: {}", to, e));
                }
            }
            Edit::Fill(source, range) => {
                for (cell, e) in doc.fill(*source, range) {
                    failures.push(format!("{}: {}", cell, e));
                }
            }
        }
        failures
    }
}
