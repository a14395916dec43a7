use gridcalc_core::{CellRef, Document, FormulaError, GridcalcError, RangeRef, ValueType};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn at(name: &str) -> CellRef {
    CellRef::parse(name).unwrap()
}

fn set(doc: &mut Document, name: &str, input: &str) {
    let cell = at(name);
    doc.write_cell(cell.row, cell.col, input).unwrap();
}

fn shown(doc: &Document, name: &str) -> String {
    let cell = at(name);
    doc.read_cell(cell.row, cell.col).display_value
}

#[test]
fn formula_over_two_cells() {
    let mut doc = Document::new();
    set(&mut doc, "A1", "2");
    set(&mut doc, "A2", "3");
    set(&mut doc, "B1", "=A1+A2");

    assert_eq!(shown(&doc, "B1"), "5");
    assert_eq!(doc.references_of(0, 1), BTreeSet::from([at("A1"), at("A2")]));
}

#[test]
fn self_reference_keeps_previous_value() {
    let mut doc = Document::new();
    set(&mut doc, "C3", "=1+1");
    let err = doc.write_cell(2, 2, "=SUM(C1:C5)").unwrap_err();
    assert_eq!(err, FormulaError::CircularReference(at("C3")));
    assert_eq!(shown(&doc, "C3"), "2");
    assert_eq!(doc.read_cell(2, 2).formula_text.as_deref(), Some("=1+1"));
}

#[test]
fn sum_follows_input_changes() {
    let mut doc = Document::new();
    set(&mut doc, "A1", "1");
    set(&mut doc, "A2", "2");
    set(&mut doc, "A3", "3");
    set(&mut doc, "B1", "=SUM(A1:A3)");
    assert_eq!(shown(&doc, "B1"), "6");

    set(&mut doc, "A2", "10");
    assert_eq!(shown(&doc, "B1"), "14");
}

#[test]
fn insert_row_reevaluates_unshifted_text() {
    let mut doc = Document::new();
    set(&mut doc, "A1", "4");
    set(&mut doc, "B2", "=A1");
    doc.insert_row(0);

    let snapshot = doc.read_cell(2, 1);
    assert_eq!(snapshot.formula_text.as_deref(), Some("=A1"));
    assert_eq!(snapshot.display_value, "0");
    assert_eq!(snapshot.value_type, ValueType::Number);
}

#[test]
fn move_formula_keeps_markers() {
    let mut doc = Document::new();
    set(&mut doc, "C3", "=A$1+B2");
    let moved = doc.move_formula(2, 2, 3, 3).unwrap();
    assert_eq!(moved.formula_text.as_deref(), Some("=B$1+C3"));
}

#[test]
fn two_cell_cycle_terminates() {
    let mut doc = Document::new();
    set(&mut doc, "A1", "=B1");
    set(&mut doc, "B1", "=A1");
    set(&mut doc, "A1", "=B1+1");
    assert_eq!(shown(&doc, "A1"), "1");
    assert_eq!(shown(&doc, "B1"), "1");
}

#[test]
fn longer_cycle_terminates_through_range() {
    let mut doc = Document::new();
    set(&mut doc, "A1", "=C1+1");
    set(&mut doc, "B1", "=A1+1");
    set(&mut doc, "C1", "=SUM(A1:B1)");
    set(&mut doc, "A1", "=C1+2");
    assert!(!shown(&doc, "C1").is_empty());
}

#[test]
fn csv_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.csv");

    let mut doc = Document::new();
    set(&mut doc, "A1", "a,\"b\"");
    set(&mut doc, "B2", "=1/4");
    doc.save_csv(&path).unwrap();
    assert!(!doc.modified);

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "\"a,\"\"b\"\"\",\r\n,0.25");

    let mut loaded = Document::new();
    assert_eq!(loaded.load_csv(&path).unwrap(), 2);
    assert_eq!(shown(&loaded, "A1"), "a,\"b\"");
    assert_eq!(shown(&loaded, "B2"), "0.25");
    assert_eq!(loaded.file_path.as_deref(), Some(path.as_path()));
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = Document::new();
    let err = doc.load_csv(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, GridcalcError::Io(_)));
}

#[test]
fn fill_down_a_column() {
    let mut doc = Document::new();
    for (row, value) in ["3", "4", "5"].iter().enumerate() {
        doc.write_cell(row, 0, value).unwrap();
    }
    set(&mut doc, "B1", "=A1*A1");
    let failures = doc.fill(at("B1"), &RangeRef::parse("B1:B3").unwrap());
    assert!(failures.is_empty());
    assert_eq!(doc.export_csv(), "3,9\r\n4,16\r\n5,25");
}
