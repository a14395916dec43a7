//! Formula preprocessing and reference translation.
//!
//! Before a formula can be handed to the expression evaluator, every function
//! call and cell reference is replaced by the literal it stands for. The
//! stages run in a fixed order and each one rewrites the text produced by the
//! previous one:
//!
//! 1. **Range aggregates**: `SUM(A1:A3)` → `6`
//! 2. **Text functions**: `UPPER(B1)` → `"HELLO"`
//! 3. **Bare references**: `A1` → `2`, or `"text"` for text cells
//!
//! Text inside string literals is never rewritten. This module also hosts
//! [`translate_formula`], the relative-reference rewrite used by copy and fill.

use regex::{Captures, Regex};
use std::convert::Infallible;

use super::cell::{Value, ValueLookup};
use super::cell_ref::{CellRef, RangeRef, col_to_letters};
use super::error::{ERROR_LITERAL, FormulaError};
use super::eval::EvalOptions;
use super::format::format_operand;
use crate::builtins::{RangeFunction, TextFunction, cell_ref_re, range_fn_re, text_fn_re};

/// Replace all function calls and references in `formula` with literals, as
/// seen from the cell at `at`.
pub fn preprocess_formula(
    formula: &str,
    at: &CellRef,
    cells: &dyn ValueLookup,
) -> Result<String, FormulaError> {
    let options = EvalOptions::default();
    Substitution::new(*at, cells, &options).run(formula)
}

/// Runs the substitution stages for one evaluation and records every cell read.
pub(crate) struct Substitution<'a> {
    at: CellRef,
    cells: &'a dyn ValueLookup,
    options: &'a EvalOptions,
    references: Vec<CellRef>,
}

impl<'a> Substitution<'a> {
    pub(crate) fn new(
        at: CellRef,
        cells: &'a dyn ValueLookup,
        options: &'a EvalOptions,
    ) -> Substitution<'a> {
        Substitution {
            at,
            cells,
            options,
            references: Vec::new(),
        }
    }

    /// Cells read so far, in the order they were visited. Duplicates are kept.
    pub(crate) fn into_references(self) -> Vec<CellRef> {
        self.references
    }

    pub(crate) fn run(&mut self, formula: &str) -> Result<String, FormulaError> {
        let text = self.substitute_ranges(formula)?;
        let text = self.substitute_text_functions(&text)?;
        self.substitute_cell_refs(&text)
    }

    fn value_of(&self, cell: &CellRef) -> Value {
        self.cells.value_at(cell).cloned().unwrap_or_default()
    }

    fn substitute_ranges(&mut self, text: &str) -> Result<String, FormulaError> {
        map_outside_strings(text, |seg| {
            try_replace_all(range_fn_re(), seg, |caps| {
                let function = RangeFunction::from_name(&caps[1])
                    .ok_or_else(|| FormulaError::InvalidExpression(caps[1].to_string()))?;
                let range = RangeRef::new(
                    CellRef::from_parts(&caps[2], &caps[3])?,
                    CellRef::from_parts(&caps[4], &caps[5])?,
                );
                let limit = self.options.max_range_cells;
                let count = range
                    .cell_count()
                    .filter(|count| *count <= limit)
                    .ok_or_else(|| {
                        FormulaError::InvalidReference(format!(
                            "{range} covers more than {limit} cells"
                        ))
                    })?;

                let mut values = Vec::with_capacity(count);
                for cell in range.cells() {
                    self.references.push(cell);
                    if cell == self.at {
                        return Err(FormulaError::CircularReference(cell));
                    }
                    values.push(self.value_of(&cell));
                }
                Ok(format_operand(function.apply(&values)))
            })
        })
    }

    fn substitute_text_functions(&mut self, text: &str) -> Result<String, FormulaError> {
        map_outside_strings(text, |seg| {
            try_replace_all(text_fn_re(), seg, |caps| {
                let function = TextFunction::from_name(&caps[1])
                    .ok_or_else(|| FormulaError::InvalidExpression(caps[1].to_string()))?;
                let cell = CellRef::from_parts(&caps[2], &caps[3])?;
                self.references.push(cell);
                if cell == self.at {
                    return Err(FormulaError::CircularReference(cell));
                }
                let text = self.value_of(&cell).display();
                Ok(format!("\"{}\"", function.apply(&text)))
            })
        })
    }

    fn substitute_cell_refs(&mut self, text: &str) -> Result<String, FormulaError> {
        map_outside_strings(text, |seg| {
            try_replace_all(cell_ref_re(), seg, |caps| {
                let cell = CellRef::from_parts(&caps[2], &caps[4])?;
                if cell == self.at {
                    return Err(FormulaError::CircularReference(cell));
                }
                self.references.push(cell);
                // Text goes in unescaped: an embedded quote breaks the expression.
                Ok(match self.value_of(&cell) {
                    Value::Empty => "0".to_string(),
                    Value::Number(n) => format_operand(n),
                    Value::Text(s) => format!("\"{}\"", s),
                    Value::Error => ERROR_LITERAL.to_string(),
                })
            })
        })
    }
}

/// Offset all relative cell references in a formula by a row/column delta.
/// Used by copy/fill so duplicated formulas keep pointing at the same
/// neighbours.
///
/// Rules:
/// - `B2` offset by (+1, +1) becomes `C3`
/// - a `$` before the letters pins the column, a `$` before the digits pins the row
/// - refs that would move above row 1 or left of column A become `#REF!`
/// - text inside string literals is left alone
pub fn translate_formula(formula: &str, delta_row: isize, delta_col: isize) -> String {
    if delta_row == 0 && delta_col == 0 {
        return formula.to_string();
    }

    let translated = map_outside_strings(formula, |seg| {
        Ok::<_, Infallible>(
            cell_ref_re()
                .replace_all(seg, |caps: &Captures| {
                    translate_token(caps, delta_row, delta_col)
                })
                .into_owned(),
        )
    });
    match translated {
        Ok(text) => text,
        Err(never) => match never {},
    }
}

fn translate_token(caps: &Captures, delta_row: isize, delta_col: isize) -> String {
    let col_abs = &caps[1];
    let row_abs = &caps[3];
    let Ok(cell) = CellRef::from_parts(&caps[2], &caps[4]) else {
        return caps[0].to_string();
    };

    let delta_row = if row_abs.is_empty() { delta_row } else { 0 };
    let delta_col = if col_abs.is_empty() { delta_col } else { 0 };
    match cell.offset(delta_row, delta_col) {
        Some(moved) => format!(
            "{}{}{}{}",
            col_abs,
            col_to_letters(moved.col),
            row_abs,
            moved.row + 1
        ),
        None => "#REF!".to_string(),
    }
}

/// Apply `replace` to every part of `text` that lies outside a double-quoted
/// string literal. Literals (quotes included) are copied through unchanged; an
/// unterminated literal runs to the end of the text.
fn map_outside_strings<E>(
    text: &str,
    mut replace: impl FnMut(&str) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('"') {
        out.push_str(&replace(&rest[..open])?);
        let literal = &rest[open..];
        match literal[1..].find('"') {
            Some(close) => {
                let end = close + 2;
                out.push_str(&literal[..end]);
                rest = &literal[end..];
            }
            None => {
                out.push_str(literal);
                return Ok(out);
            }
        }
    }

    out.push_str(&replace(rest)?);
    Ok(out)
}

/// Like `Regex::replace_all`, but the replacement may fail and abort the scan.
fn try_replace_all<E>(
    re: &Regex,
    text: &str,
    mut replace: impl FnMut(&Captures) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&replace(&caps)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Cell, Grid};

    fn grid(entries: &[(&str, &str)]) -> Grid {
        let mut grid = Grid::default();
        for (name, input) in entries {
            grid.insert(CellRef::parse(name).unwrap(), Cell::from_input(input));
        }
        grid
    }

    fn at(name: &str) -> CellRef {
        CellRef::parse(name).unwrap()
    }

    #[test]
    fn test_preprocess_simple_refs() {
        let cells = grid(&[("A1", "2"), ("A2", "3")]);
        assert_eq!(
            preprocess_formula("A1 + A2 * B7", &at("C1"), &cells).unwrap(),
            "2 + 3 * 0"
        );
    }

    #[test]
    fn test_preprocess_text_refs_are_quoted() {
        let cells = grid(&[("A1", "hello")]);
        assert_eq!(
            preprocess_formula("A1", &at("B1"), &cells).unwrap(),
            "\"hello\""
        );
    }

    #[test]
    fn test_preprocess_stages_run_in_order() {
        let cells = grid(&[("A1", "1"), ("A2", "2"), ("B1", " mixed Case ")]);
        assert_eq!(
            preprocess_formula("sum(A1:A2) + A1", &at("C1"), &cells).unwrap(),
            "3 + 1"
        );
        assert_eq!(
            preprocess_formula("UPPER(B1)", &at("C1"), &cells).unwrap(),
            "\" MIXED CASE \""
        );
        assert_eq!(
            preprocess_formula("Trim(B1)", &at("C1"), &cells).unwrap(),
            "\"mixed Case\""
        );
    }

    #[test]
    fn test_preprocess_leaves_string_literals_alone() {
        let cells = grid(&[("A1", "b2"), ("B2", "9")]);
        // UPPER(A1) produces "B2", which must not be read as a reference.
        assert_eq!(
            preprocess_formula("UPPER(A1)", &at("C1"), &cells).unwrap(),
            "\"B2\""
        );
        assert_eq!(
            preprocess_formula("\"A1\"", &at("C1"), &cells).unwrap(),
            "\"A1\""
        );
    }

    #[test]
    fn test_preprocess_ignores_absolute_markers() {
        let cells = grid(&[("A1", "4"), ("B1", "5")]);
        assert_eq!(
            preprocess_formula("$A$1 + B$1 + SUM($A1:$B$1)", &at("C1"), &cells).unwrap(),
            "4 + 5 + 9"
        );
    }

    #[test]
    fn test_preprocess_self_reference_is_circular() {
        let cells = grid(&[]);
        assert_eq!(
            preprocess_formula("A1 + 1", &at("A1"), &cells),
            Err(FormulaError::CircularReference(at("A1")))
        );
        assert_eq!(
            preprocess_formula("SUM(A1:A3)", &at("A2"), &cells),
            Err(FormulaError::CircularReference(at("A2")))
        );
    }

    #[test]
    fn test_preprocess_row_zero_is_invalid_reference() {
        let cells = grid(&[]);
        assert!(matches!(
            preprocess_formula("A0 + 1", &at("B1"), &cells),
            Err(FormulaError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_translate_formula_relative_and_absolute() {
        assert_eq!(translate_formula("A$1+B2", 1, 1), "B$1+C3");
        assert_eq!(translate_formula("$A$1+$B2", 1, 1), "$A$1+$B3");
        assert_eq!(translate_formula("SUM(A1:B2)", 2, 0), "SUM(A3:B4)");
    }

    #[test]
    fn test_translate_formula_out_of_bounds() {
        assert_eq!(translate_formula("A1 + B2", 0, -1), "#REF! + A2");
        assert_eq!(translate_formula("B1", -1, 0), "#REF!");
    }

    #[test]
    fn test_translate_formula_skips_strings_and_zero_delta() {
        assert_eq!(translate_formula("\"A1\" + A1", 1, 0), "\"A1\" + A2");
        assert_eq!(translate_formula("A1", 0, 0), "A1");
    }

    #[test]
    fn test_map_outside_strings_unterminated_literal() {
        let out = map_outside_strings("x\"y", |seg| Ok::<_, Infallible>(seg.to_uppercase()));
        assert_eq!(out, Ok("X\"y".to_string()));
    }
}
