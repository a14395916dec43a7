//! Built-in spreadsheet functions.
//!
//! Range aggregates (`SUM`, `AVERAGE`, `MAX`, `MIN`, `COUNT`) take one
//! `A1:B5` range; text functions (`TRIM`, `UPPER`, `LOWER`) take one cell.
//! Function names are case-insensitive, references are not. Either end of a
//! reference may carry `$` markers.

use regex::Regex;
use std::sync::OnceLock;

use crate::engine::Value;

/// Matches `NAME(start:end)` for the range aggregates.
/// Groups: 1 = name, 2/3 = start letters/digits, 4/5 = end letters/digits.
pub(crate) fn range_fn_re() -> &'static Regex {
    static RANGE_FN_RE: OnceLock<Regex> = OnceLock::new();
    RANGE_FN_RE.get_or_init(|| {
        Regex::new(
            r"\b(?i:(SUM|AVERAGE|MAX|MIN|COUNT))\(\s*\$?([A-Z]+)\$?([0-9]+)\s*:\s*\$?([A-Z]+)\$?([0-9]+)\s*\)",
        )
        .expect("range function regex must compile")
    })
}

/// Matches `NAME(ref)` for the single-cell text functions.
/// Groups: 1 = name, 2 = letters, 3 = digits.
pub(crate) fn text_fn_re() -> &'static Regex {
    static TEXT_FN_RE: OnceLock<Regex> = OnceLock::new();
    TEXT_FN_RE.get_or_init(|| {
        Regex::new(r"\b(?i:(TRIM|UPPER|LOWER))\(\s*\$?([A-Z]+)\$?([0-9]+)\s*\)")
            .expect("text function regex must compile")
    })
}

/// Matches a bare cell reference, with optional absolute markers.
/// Groups: 1 = column marker, 2 = letters, 3 = row marker, 4 = digits.
pub(crate) fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"(\$?)\b([A-Z]+)(\$?)([0-9]+)\b")
            .expect("cell reference regex must compile")
    })
}

/// Aggregate over a rectangular range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeFunction {
    Sum,
    Average,
    Max,
    Min,
    Count,
}

impl RangeFunction {
    pub fn from_name(name: &str) -> Option<RangeFunction> {
        match name.to_ascii_uppercase().as_str() {
            "SUM" => Some(RangeFunction::Sum),
            "AVERAGE" => Some(RangeFunction::Average),
            "MAX" => Some(RangeFunction::Max),
            "MIN" => Some(RangeFunction::Min),
            "COUNT" => Some(RangeFunction::Count),
            _ => None,
        }
    }

    /// Apply the aggregate. Non-numeric values are skipped; with no numeric
    /// values at all every aggregate yields 0.
    pub fn apply(self, values: &[Value]) -> f64 {
        let numbers: Vec<f64> = values.iter().filter_map(Value::as_number).collect();
        match self {
            RangeFunction::Sum => numbers.iter().sum(),
            RangeFunction::Count => numbers.len() as f64,
            _ if numbers.is_empty() => 0.0,
            RangeFunction::Average => numbers.iter().sum::<f64>() / numbers.len() as f64,
            RangeFunction::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            RangeFunction::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

/// Transform applied to the text of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFunction {
    Trim,
    Upper,
    Lower,
}

impl TextFunction {
    pub fn from_name(name: &str) -> Option<TextFunction> {
        match name.to_ascii_uppercase().as_str() {
            "TRIM" => Some(TextFunction::Trim),
            "UPPER" => Some(TextFunction::Upper),
            "LOWER" => Some(TextFunction::Lower),
            _ => None,
        }
    }

    pub fn apply(self, text: &str) -> String {
        match self {
            TextFunction::Trim => text.trim().to_string(),
            TextFunction::Upper => text.to_uppercase(),
            TextFunction::Lower => text.to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(nums: &[f64]) -> Vec<Value> {
        nums.iter().map(|n| Value::Number(*n)).collect()
    }

    #[test]
    fn test_range_functions() {
        let vals = values(&[10.0, 20.0, 30.0]);
        assert_eq!(RangeFunction::Sum.apply(&vals), 60.0);
        assert_eq!(RangeFunction::Average.apply(&vals), 20.0);
        assert_eq!(RangeFunction::Min.apply(&vals), 10.0);
        assert_eq!(RangeFunction::Max.apply(&vals), 30.0);
        assert_eq!(RangeFunction::Count.apply(&vals), 3.0);
    }

    #[test]
    fn test_range_functions_skip_text() {
        let vals = vec![
            Value::Number(4.0),
            Value::Text("apple".into()),
            Value::Error,
            Value::Number(-2.0),
        ];
        assert_eq!(RangeFunction::Sum.apply(&vals), 2.0);
        assert_eq!(RangeFunction::Average.apply(&vals), 1.0);
        assert_eq!(RangeFunction::Max.apply(&vals), 4.0);
        assert_eq!(RangeFunction::Count.apply(&vals), 2.0);
    }

    #[test]
    fn test_all_text_range_defaults_to_zero() {
        let vals = vec![Value::Text("a".into()), Value::Text("b".into())];
        assert_eq!(RangeFunction::Average.apply(&vals), 0.0);
        assert_eq!(RangeFunction::Max.apply(&vals), 0.0);
        assert_eq!(RangeFunction::Min.apply(&vals), 0.0);
        assert_eq!(RangeFunction::Count.apply(&vals), 0.0);
    }

    #[test]
    fn test_function_names_are_case_insensitive() {
        assert_eq!(RangeFunction::from_name("average"), Some(RangeFunction::Average));
        assert_eq!(TextFunction::from_name("Upper"), Some(TextFunction::Upper));
        assert_eq!(RangeFunction::from_name("VEC"), None);
    }

    #[test]
    fn test_range_fn_re_accepts_absolute_markers() {
        let caps = range_fn_re().captures("sum($A$1:B$3)").unwrap();
        assert_eq!(&caps[1], "sum");
        assert_eq!(&caps[2], "A");
        assert_eq!(&caps[5], "3");
    }
}
