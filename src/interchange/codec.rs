//! Minimal CSV reader/writer
//!
//! Comma-separated, `"`-quoted, with `""` as an escaped quote. Quoted
//! fields may span lines. Both `\n` and `\r\n` end a record, and a leading
//! UTF-8 byte-order mark is ignored.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvError {
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("CSV is empty")]
    Empty,

    #[error("Unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },
}

/// Escape a value: wrap in quotes if it contains a comma, quote or line break.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Append one record, terminated by `\n`
pub fn write_record<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// Split raw CSV text into records of fields
fn split_records(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                line += 1;
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: quote_line });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

fn is_blank(record: &[String]) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

/// A parsed CSV document: a header row and the data rows under it
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parse raw bytes. Blank lines are skipped; the first non-blank one is the header.
    pub fn parse(data: &[u8]) -> Result<Self, CsvError> {
        let text = std::str::from_utf8(data).map_err(|e| CsvError::InvalidUtf8(e.to_string()))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut records = split_records(text)?
            .into_iter()
            .filter(|r| !is_blank(r));

        let headers: Vec<String> = records
            .next()
            .ok_or(CsvError::Empty)?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut index = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            // first occurrence wins
            index.entry(header.clone()).or_insert(i);
        }

        Ok(Self {
            headers,
            index,
            rows: records.collect(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = CsvRow<'_>> {
        self.rows.iter().map(move |cells| CsvRow {
            index: &self.index,
            cells,
        })
    }
}

/// One data row, addressed by header label
#[derive(Debug, Clone, Copy)]
pub struct CsvRow<'a> {
    index: &'a HashMap<String, usize>,
    cells: &'a [String],
}

impl<'a> CsvRow<'a> {
    /// Cell under `label`, trimmed. Missing columns and short rows read as "".
    pub fn get(&self, label: &str) -> &'a str {
        self.index
            .get(label)
            .and_then(|&i| self.cells.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}
