//! Minimal CSV support for the three export files.
//!
//! Writing: one record per line, header order fixed by the caller, missing
//! fields rendered empty, fields containing a comma, quote or line break are
//! quoted with embedded quotes doubled. Reading accepts the same dialect,
//! including quoted line breaks and CRLF endings.

use crate::error::{ContribError, Result};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// One parsed data row, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(HashMap<String, String>);

impl Row {
    /// Field value, or `""` when the column is absent.
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn map_values(self, f: impl Fn(String) -> String) -> Self {
        Row(self.0.into_iter().map(|(k, v)| (k, f(v))).collect())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn value_to_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

fn push_line<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        out.push_str(&field);
        first = false;
    }
    out.push('\n');
}

/// Serialize `records` under `headers`. An empty slice yields the header row only.
pub fn to_csv<T: Serialize>(records: &[T], headers: &[&str]) -> Result<String> {
    let mut out = String::new();
    push_line(&mut out, headers.iter().map(|h| escape_field(h)));

    for record in records {
        let value = serde_json::to_value(record)?;
        let fields: Vec<String> = headers
            .iter()
            .map(|h| value_to_field(value.get(*h)))
            .collect();
        push_line(&mut out, fields.iter().map(|f| escape_field(f)));
    }

    Ok(out)
}

fn split_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
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
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ContribError::Csv {
            line: quote_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

/// Parse CSV text whose first record is the header row. Blank lines are ignored.
pub fn parse(text: &str) -> Result<Vec<Row>> {
    let mut records = split_records(text)?
        .into_iter()
        .filter(|r| !(r.len() == 1 && r[0].is_empty()));

    let headers = match records.next() {
        Some(h) => h,
        None => return Ok(Vec::new()),
    };

    Ok(records
        .map(|values| {
            headers
                .iter()
                .cloned()
                .zip(values)
                .collect::<Row>()
        })
        .collect())
}
