//! CSV text codec.
//!
//! Pure conversions between CSV text and rows of string fields. Reading and
//! writing files, and turning fields into cells, lives on [`crate::Document`].

/// Row separator used on export.
pub const ROW_SEPARATOR: &str = "\r\n";

/// Parse CSV text into rows of fields.
///
/// Quotes toggle quoted mode anywhere in a field and `""` inside quotes is a
/// literal quote. Rows end at `\r\n`, `\n` or `\r` outside quotes. Fields are
/// not trimmed. A trailing row terminator does not produce an extra empty row.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Join rows of display values into CSV text, escaping fields as needed.
/// Rows are separated by `\r\n` with no trailing terminator.
pub fn write_csv<R, F>(rows: R) -> String
where
    R: IntoIterator<Item = F>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|field| escape_csv_field(field.as_ref()))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(ROW_SEPARATOR)
}

/// Escape a field for CSV output
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
