//! Formula evaluation.
//!
//! Runs the substitution stages from [`super::preprocess`] and hands the
//! resulting text to the expression evaluator. The cells read along the way
//! are reported even when evaluation fails part way through, so the caller
//! can keep its dependency graph in step with what the formula touched.

use serde::Deserialize;

use super::cell::{Value, ValueLookup};
use super::cell_ref::CellRef;
use super::error::FormulaError;
use super::expr::{ExprValue, evaluate_expression};
use super::preprocess::Substitution;

/// Default upper bound on the number of cells a single range may cover.
pub const MAX_RANGE_CELLS: usize = 1_000_000;

/// Tunables for formula evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// Ranges covering more cells than this fail with `InvalidReference`.
    pub max_range_cells: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            max_range_cells: MAX_RANGE_CELLS,
        }
    }
}

/// Outcome of evaluating one formula.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub value: Result<Value, FormulaError>,
    /// Cells read, in visiting order. Kept on failure.
    pub references: Vec<CellRef>,
}

impl Evaluation {
    pub fn into_result(self) -> Result<Value, FormulaError> {
        self.value
    }
}

/// Evaluate a formula body (without the leading `=`) as seen from `at`.
pub fn evaluate(formula: &str, at: &CellRef, cells: &dyn ValueLookup) -> Evaluation {
    evaluate_with_options(formula, at, cells, &EvalOptions::default())
}

pub fn evaluate_with_options(
    formula: &str,
    at: &CellRef,
    cells: &dyn ValueLookup,
    options: &EvalOptions,
) -> Evaluation {
    let mut substitution = Substitution::new(*at, cells, options);
    let value = substitution
        .run(formula)
        .and_then(|text| evaluate_expression(&text))
        .map(|result| match result {
            ExprValue::Number(n) => Value::Number(n),
            ExprValue::Text(s) => Value::Text(s),
        });

    if let Err(e) = &value {
        log::debug!("{at}: ={formula} failed: {e}");
    }

    Evaluation {
        value,
        references: substitution.into_references(),
    }
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
    fn test_evaluate_sum_of_refs() {
        let cells = grid(&[("A1", "2"), ("A2", "3")]);
        let eval = evaluate("A1+A2", &at("B1"), &cells);
        assert_eq!(eval.value, Ok(Value::Number(5.0)));
        assert_eq!(eval.references, vec![at("A1"), at("A2")]);
    }

    #[test]
    fn test_evaluate_text_result() {
        let cells = grid(&[("A1", "  padded  ")]);
        let eval = evaluate("TRIM(A1)", &at("B1"), &cells);
        assert_eq!(eval.value, Ok(Value::Text("padded".into())));
        assert_eq!(eval.references, vec![at("A1")]);
    }

    #[test]
    fn test_evaluate_keeps_partial_references_on_failure() {
        let cells = grid(&[("A1", "1")]);
        let eval = evaluate("A1 + B1", &at("B1"), &cells);
        assert_eq!(eval.value, Err(FormulaError::CircularReference(at("B1"))));
        assert_eq!(eval.references, vec![at("A1")]);
    }

    #[test]
    fn test_evaluate_range_records_every_cell() {
        let cells = grid(&[("A1", "1"), ("A3", "3")]);
        let eval = evaluate("COUNT(A1:A3) + MAX(A1:A3)", &at("B1"), &cells);
        // A2 is missing and counts as a numeric 0.
        assert_eq!(eval.value, Ok(Value::Number(6.0)));
        assert_eq!(eval.references.len(), 6);
    }

    #[test]
    fn test_evaluate_error_operand_fails() {
        let mut cells = grid(&[]);
        cells.insert(
            at("A1"),
            Cell {
                value: Value::Error,
                ..Cell::default()
            },
        );
        assert!(matches!(
            evaluate("A1 * 2", &at("B1"), &cells).value,
            Err(FormulaError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_evaluate_text_in_arithmetic_fails() {
        let cells = grid(&[("A1", "apple")]);
        assert!(matches!(
            evaluate("A1 + 1", &at("B1"), &cells).value,
            Err(FormulaError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_range_limit_from_options() {
        let cells = grid(&[]);
        let options = EvalOptions { max_range_cells: 4 };
        let eval = evaluate_with_options("SUM(A1:B3)", &at("C1"), &cells, &options);
        assert!(matches!(eval.value, Err(FormulaError::InvalidReference(_))));
        assert!(eval.references.is_empty());
    }

    #[test]
    fn test_eval_options_default() {
        assert_eq!(EvalOptions::default().max_range_cells, MAX_RANGE_CELLS);
    }
}
