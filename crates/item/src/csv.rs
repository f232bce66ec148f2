//! Minimal CSV Codec
//!
//! Observation histories and the catalog index are stored as plain
//! comma-separated text so they stay inspectable (and editable) with ordinary
//! tools. Quoting follows RFC 4180: fields containing a comma, quote, or line
//! break are wrapped in double quotes, with embedded quotes doubled.

use std::mem::take;

/// Parse CSV text into rows of fields (quote and CRLF tolerant).
///
/// Blank lines are dropped. An unterminated quoted field at end of input is
/// flushed rather than rejected; history files are append-only and a torn
/// final line should not make the whole file unreadable.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if row.len() == 1 && row[0].is_empty() {
                    row.clear();
                } else {
                    rows.push(take(&mut row));
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Append one row to `out`, terminated with a single `\n`.
pub fn push_row<S: AsRef<str>>(out: &mut String, row: &[S]) {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first {
            out.push(',');
        }
        first = false;
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Render a header line followed by every row.
pub fn render(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    push_row(&mut out, header);
    for row in rows {
        push_row(&mut out, row);
    }
    out
}

/// Render rows only, for appending to a file that already has its header.
pub fn render_rows(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        push_row(&mut out, row);
    }
    out
}
