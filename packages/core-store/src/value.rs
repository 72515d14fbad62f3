//! The Value type - a tree-shaped document.
//!
//! Documents are dynamically-typed trees: maps and arrays at the interior,
//! scalars at the leaves. The engine stores one key per leaf.

use std::collections::BTreeMap;

use crate::{Path, Segment};

/// A tree-shaped document that can be written to or read from a `PathDb`.
///
/// # Design Notes
///
/// - Uses `BTreeMap` so map keys iterate in the same byte order the key
///   codec stores them in
/// - Uses `i64` for integers and `f64` for everything else numeric
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Explicit null. Distinct from "nothing stored".
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Key-value map with string keys.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Create a null value.
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an empty map.
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    /// Create an empty array.
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a map.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Check if this value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Check if this value is a scalar (neither map nor array).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Map(_) | Value::Array(_))
    }

    /// Check if this value is stored as a single leaf: a scalar or an empty
    /// container.
    pub fn is_leaf(&self) -> bool {
        match self {
            Value::Map(map) => map.is_empty(),
            Value::Array(arr) => arr.is_empty(),
            _ => true,
        }
    }

    /// Get a reference to a nested value by path.
    ///
    /// Returns `None` if the path doesn't exist or can't be navigated
    /// (e.g., trying to index into a string, or a key segment on an array).
    pub fn get(&self, path: &Path) -> Option<&Value> {
        let mut current = self;
        for segment in path.iter() {
            current = match (current, segment) {
                (Value::Map(map), Segment::Key(key)) => map.get(key)?,
                (Value::Array(arr), Segment::Index(index)) => {
                    arr.get(usize::try_from(*index).ok()?)?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

// Conversion from common types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}
