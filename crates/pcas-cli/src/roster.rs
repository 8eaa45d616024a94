//! Roster file reading.
//!
//! Rosters are plain delimited-text exports: one row per line, fields split
//! on a single delimiter character, optionally wrapped in double quotes with
//! `""` as an escaped quote.

use std::path::Path;

use miette::{IntoDiagnostic, Result, WrapErr};

/// Read every row of a roster file, column-title row included.
pub fn read_rows(path: &Path, delimiter: char) -> Result<Vec<Vec<String>>> {
    let bytes = std::fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read roster file: {}", path.display()))?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                "{} is not valid UTF-8; invalid bytes were replaced",
                path.display()
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    let rows = parse_rows(&text, delimiter);
    tracing::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Split roster text into rows of fields. Empty lines are skipped.
pub fn parse_rows(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(|line| split_fields(line, delimiter))
        .collect()
}

fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rows() {
        let rows = parse_rows("ID,Name\nS001,Ana\n", ',');
        assert_eq!(rows, vec![vec!["ID", "Name"], vec!["S001", "Ana"]]);
    }

    #[test]
    fn test_quoted_fields() {
        let rows = parse_rows("\"Gomez, Ana\",\"say \"\"hi\"\"\",x", ',');
        assert_eq!(rows, vec![vec!["Gomez, Ana", "say \"hi\"", "x"]]);
    }

    #[test]
    fn test_semicolon_delimiter_and_crlf() {
        let rows = parse_rows("a;b;c\r\n1;;3\r\n", ';');
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "", "3"]]);
    }

    #[test]
    fn test_bom_and_blank_lines() {
        let rows = parse_rows("\u{feff}ID,Name\n\n   \nS001,Ana", ',');
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "ID");
    }

    #[test]
    fn test_keeps_non_ascii_text() {
        let rows = parse_rows("S001,José,Muñoz", ',');
        assert_eq!(rows[0], vec!["S001", "José", "Muñoz"]);
    }

    #[test]
    fn test_read_missing_file() {
        assert!(read_rows(Path::new("/nonexistent/roster.csv"), ',').is_err());
    }
}
