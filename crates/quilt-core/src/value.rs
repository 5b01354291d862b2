//! Typed resource values.

use core::fmt;

use crate::schema::ResourceKind;

/// The value held by one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Value {
    Text(String),
    Integer(i64),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Value::Text(_) => ResourceKind::Text,
            Value::Integer(_) => ResourceKind::Integer,
            Value::Bytes(_) => ResourceKind::Bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}
