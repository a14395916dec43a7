//! Display formatting for numeric values.

/// Format a number for display.
///
/// Integral values print without a fractional part; everything else uses the
/// shortest representation that round-trips.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n == 0.0 {
        // Avoid "-0".
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Format a number for substitution back into formula text.
///
/// Non-finite values are spelled as divisions so the expression evaluator
/// reproduces them.
pub(crate) fn format_operand(n: f64) -> String {
    if n.is_nan() {
        "(0/0)".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "(1/0)" } else { "(-1/0)" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}
