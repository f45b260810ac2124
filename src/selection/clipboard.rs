//! TSV clipboard codec.
//!
//! Cells are separated by tabs and rows by newlines. A cell containing a
//! tab, newline or quote is wrapped in quotes with internal quotes doubled,
//! the way spreadsheet applications write it.

use crate::types::MatrixCell;

/// Escape a cell value for TSV/clipboard format
/// If the value contains tabs, newlines, or quotes, wrap in quotes and escape internal quotes
pub fn escape_cell_value(value: &str) -> String {
    let needs_quoting = value.contains('\t')
        || value.contains('\n')
        || value.contains('\r')
        || value.contains('"');

    if needs_quoting {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Serialize a block of display strings. Holes become empty cells.
pub fn to_tsv(cells: &MatrixCell<String>) -> String {
    let mut result = String::new();
    for (r, row) in cells.rows().enumerate() {
        if r > 0 {
            result.push('\n');
        }
        for (c, cell) in row.iter().enumerate() {
            if c > 0 {
                result.push('\t');
            }
            if let Some(v) = cell {
                result.push_str(&escape_cell_value(v));
            }
        }
    }
    result
}

/// Parse clipboard text into a rectangular block.
///
/// Quoted cells may contain tabs, newlines and doubled quotes. `\r\n` is
/// accepted as a row break and a single trailing row break is ignored.
pub fn parse_tsv(text: &str) -> MatrixCell<String> {
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    let mut row: Vec<Option<String>> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut at_cell_start = true;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(ch);
            }
            continue;
        }
        match ch {
            '"' if at_cell_start => {
                in_quotes = true;
                at_cell_start = false;
            }
            '\t' => {
                row.push(Some(std::mem::take(&mut cell)));
                at_cell_start = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(Some(std::mem::take(&mut cell)));
                rows.push(std::mem::take(&mut row));
                at_cell_start = true;
            }
            _ => {
                cell.push(ch);
                at_cell_start = false;
            }
        }
    }
    if !at_cell_start || !cell.is_empty() || !row.is_empty() {
        row.push(Some(cell));
        rows.push(row);
    }
    MatrixCell::from_rows(rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn cell(m: &MatrixCell<String>, r: usize, c: usize) -> &str {
        m.get(r, c).map_or("", String::as_str)
    }

    #[test]
    fn test_escape_cell_value() {
        assert_eq!(escape_cell_value("plain"), "plain");
        assert_eq!(escape_cell_value("a\tb"), "\"a\tb\"");
        assert_eq!(escape_cell_value("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_parse_simple_block() {
        let m = parse_tsv("a\tb\nc\td\n");
        assert_eq!(m.row_count(), 2);
        assert_eq!(m.column_count(), 2);
        assert_eq!(cell(&m, 1, 0), "c");
    }

    #[test]
    fn test_parse_quoted_and_crlf() {
        let m = parse_tsv("\"x\ny\"\t\"q\"\"q\"\r\nlast\t");
        assert_eq!(cell(&m, 0, 0), "x\ny");
        assert_eq!(cell(&m, 0, 1), "q\"q");
        assert_eq!(cell(&m, 1, 0), "last");
        assert_eq!(cell(&m, 1, 1), "");
        assert_eq!(m.row_count(), 2);
    }

    #[test]
    fn test_copy_then_paste_preserves_special_cells() {
        let block = MatrixCell::from_rows(vec![
            vec![Some("a\tb".to_string()), None],
            vec![Some("\"q\"".to_string()), Some("line\nbreak".to_string())],
        ]);
        let parsed = parse_tsv(&to_tsv(&block));
        assert_eq!(cell(&parsed, 0, 0), "a\tb");
        assert_eq!(cell(&parsed, 0, 1), "");
        assert_eq!(cell(&parsed, 1, 0), "\"q\"");
        assert_eq!(cell(&parsed, 1, 1), "line\nbreak");
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(parse_tsv("").row_count(), 0);
    }
}
