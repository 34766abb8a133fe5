//! Typed parameter values

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;

/// A fully parsed, type-checked comparison value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    /// String value
    String(String),
    /// Boolean value
    Boolean(bool),
    /// 32-bit integer value
    Integer(i32),
    /// 64-bit integer value
    Long(i64),
    /// 32-bit float value
    Float(f32),
    /// 64-bit float value
    Double(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Instant, also used for as-of points in time
    Timestamp(DateTime<Utc>),
}

/// Hashable identity of a value, floats compared bitwise
#[derive(PartialEq, Eq, Hash)]
enum ValueKey<'a> {
    String(&'a str),
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Value {
    fn key(&self) -> ValueKey<'_> {
        match self {
            Value::String(s) => ValueKey::String(s),
            Value::Boolean(b) => ValueKey::Boolean(*b),
            Value::Integer(i) => ValueKey::Integer(*i),
            Value::Long(l) => ValueKey::Long(*l),
            Value::Float(f) => ValueKey::Float(f.to_bits()),
            Value::Double(d) => ValueKey::Double(d.to_bits()),
            Value::Date(d) => ValueKey::Date(*d),
            Value::Timestamp(t) => ValueKey::Timestamp(*t),
        }
    }
}

/// Remove repeated values, keeping the first occurrence of each
pub fn dedup_values(values: Vec<Value>) -> Vec<Value> {
    let keep: Vec<bool> = {
        let mut seen = FxHashSet::default();
        values.iter().map(|value| seen.insert(value.key())).collect()
    };
    values
        .into_iter()
        .zip(keep)
        .filter_map(|(value, keep)| keep.then_some(value))
        .collect()
}

/// Write a string literal in the operation language's quoting
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in text.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            _ => write!(f, "{ch}")?,
        }
    }
    f.write_str("\"")
}

fn write_decimal(f: &mut fmt::Formatter<'_>, text: String) -> fmt::Result {
    if text.contains(['.', 'e', 'E']) || !text.ends_with(|c: char| c.is_ascii_digit()) {
        f.write_str(&text)
    } else {
        write!(f, "{text}.0")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write_quoted(f, s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Long(l) => write!(f, "{l}"),
            Value::Float(v) => write_decimal(f, v.to_string()),
            Value::Double(v) => write_decimal(f, v.to_string()),
            Value::Date(d) => write!(f, "\"{}\"", d.format("%Y-%m-%d")),
            Value::Timestamp(t) => {
                write!(f, "\"{}\"", t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}
