//! Parameter literals and their conversion into typed values

use crate::error::Rejection;
use crate::model::ValueType;
use crate::operation::Value;
use crate::operation::value::write_quoted;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// An untyped parameter as written by the query author
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted text; also the spelling of dates and timestamps
    String(String),
    /// Whole number
    Integer(i64),
    /// Number with a fractional part or exponent
    Float(f64),
    /// `true` or `false`
    Boolean(bool),
    /// `null`
    Null,
    /// Ordered list of literals
    List(Vec<Literal>),
}

impl Literal {
    /// Convert a JSON value; objects have no literal form
    pub fn from_json(value: &serde_json::Value) -> Option<Literal> {
        use serde_json::Value as Json;

        match value {
            Json::Null => Some(Literal::Null),
            Json::Bool(b) => Some(Literal::Boolean(*b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Some(Literal::Integer(i)),
                None => n.as_f64().map(Literal::Float),
            },
            Json::String(s) => Some(Literal::String(s.clone())),
            Json::Array(items) => items
                .iter()
                .map(Literal::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Literal::List),
            Json::Object(_) => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write_quoted(f, s),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::Null => f.write_str("null"),
            Literal::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

fn mismatch(value_type: ValueType, found: &dyn fmt::Display) -> Rejection {
    Rejection::operator(format!(
        "Expected <{}> but found: <{}>",
        value_type.literal_name(),
        found
    ))
}

/// Parse a scalar literal into the value type of an attribute
pub fn parse_value(value_type: ValueType, literal: &Literal) -> Result<Value, Rejection> {
    let value = match (value_type, literal) {
        (ValueType::String, Literal::String(s)) => Some(Value::String(s.clone())),
        (ValueType::Boolean, Literal::Boolean(b)) => Some(Value::Boolean(*b)),
        (ValueType::Integer, Literal::Integer(i)) => i32::try_from(*i).ok().map(Value::Integer),
        (ValueType::Long, Literal::Integer(i)) => Some(Value::Long(*i)),
        (ValueType::Float, Literal::Integer(i)) => Some(Value::Float(*i as f32)),
        (ValueType::Float, Literal::Float(v)) => {
            let narrowed = *v as f32;
            narrowed.is_finite().then_some(Value::Float(narrowed))
        }
        (ValueType::Double, Literal::Integer(i)) => Some(Value::Double(*i as f64)),
        (ValueType::Double, Literal::Float(v)) => Some(Value::Double(*v)),
        (ValueType::Date, Literal::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(Value::Date),
        (ValueType::Timestamp | ValueType::AsOf, Literal::String(s)) => {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|instant| Value::Timestamp(instant.with_timezone(&Utc)))
        }
        _ => None,
    };
    value.ok_or_else(|| mismatch(value_type, literal))
}
