//! Value and row types for the query engine.
//!
//! The indexed table is fixed-shape: column 0 is the integer key, column
//! 1 the varchar value. `Row` doesn't need a runtime `Schema` to
//! interpret its columns — the two column names are wired directly into
//! `Expression::bind`.

use std::cmp::Ordering;

/// A scalar value: either column of the indexed table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Varchar(String),
}

impl Value {
    /// Compares two values using SQL-style ordering. Returns `None` for a
    /// type mismatch (comparing an integer to a string).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Varchar(a), Value::Varchar(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Varchar(s) => write!(f, "{}", s),
        }
    }
}

/// A row read off the record file: a fixed `(key, value)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: i32,
    pub value: String,
}

impl Row {
    pub fn new(key: i32, value: String) -> Self {
        Self { key, value }
    }

    /// Column 0 is the key, column 1 the value; there is no column 2.
    pub fn column(&self, index: usize) -> Value {
        match index {
            0 => Value::Integer(self.key),
            1 => Value::Varchar(self.value.clone()),
            other => unreachable!("row has only 2 columns, got index {}", other),
        }
    }
}
