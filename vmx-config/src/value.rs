//! Attribute values and the coercions applied to raw strings.

use crate::error::ValueError;
use serde::Serialize;
use std::fmt;

/// The only raw string that coerces to `true` for boolean keys.
pub const TRUE_MARKER: &str = "TRUE";

/// A coerced attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// How a raw string is turned into a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Boolean,
    /// Text with all whitespace and hyphens removed.
    Identifier,
}

impl ValueKind {
    pub fn coerce(self, key: &str, raw: &str) -> Result<Value, ValueError> {
        Ok(match self {
            ValueKind::Text => Value::Text(raw.to_string()),
            ValueKind::Integer => Value::Integer(parse_integer(key, raw)?),
            ValueKind::Boolean => Value::Boolean(parse_bool(raw)),
            ValueKind::Identifier => Value::Text(normalize_identifier(raw)),
        })
    }

    /// Value a declared-but-absent key starts out with.
    pub fn default_value(self) -> Option<Value> {
        match self {
            ValueKind::Integer => Some(Value::Integer(0)),
            _ => None,
        }
    }
}

/// Exact, case-sensitive comparison against [`TRUE_MARKER`].
pub fn parse_bool(raw: &str) -> bool {
    raw == TRUE_MARKER
}

/// Base-10 integer, optionally signed.
pub fn parse_integer(key: &str, raw: &str) -> Result<i64, ValueError> {
    raw.parse::<i64>().map_err(|_| ValueError::new(key, raw))
}

/// Strip whitespace and hyphens: `"56 4d ab-12"` becomes `"564dab12"`.
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}
