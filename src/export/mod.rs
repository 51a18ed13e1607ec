//! Character separated export of events and record views.

use std::fmt::Display;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Tab => "\t",
        }
    }
}

impl Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Tab => write!(f, "tab"),
        }
    }
}

/// Serializes `records` into delimiter separated text.
///
/// The header is made of the field names of the first record. Every following line holds the
/// values of one record, in that record's own field order, so records with optional fields can
/// produce lines of different length. Values are written as they are, without quoting: a value
/// that contains the delimiter or a new line breaks the layout of the output.
pub fn export<T: Serialize>(records: &[T], delimiter: Delimiter) -> Result<String> {
    let Some(first) = records.first() else {
        return Err(Error::EmptyInput);
    };
    let separator = delimiter.as_str();

    let header = to_fields(first)?
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator);

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header);
    for record in records {
        let line = to_fields(record)?
            .values()
            .map(coerce)
            .collect::<Vec<_>>()
            .join(separator);
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn to_fields<T: Serialize>(record: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::InvalidArgument(format!(
            "only records with named fields can be exported, got {other}"
        ))),
    }
}

fn coerce(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::Array(values) => values.iter().map(coerce).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}
