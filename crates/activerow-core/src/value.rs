//! Dynamic attribute values.

use serde::{Deserialize, Serialize};

use crate::datetime::DateTime;

/// A dynamically-typed attribute value.
///
/// Records store their column values as `Value`s so that a single store can
/// hold whatever the storage layer hands back, and so that collaborators
/// (query engine, validation engine) can receive untyped attribute maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent / NULL value
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// Text string
    Text(String),

    /// Date-time value (or the null-date sentinel)
    DateTime(DateTime),

    /// Structured value, used for resolved relationship payloads
    Json(serde_json::Value),
}

impl Value {
    /// Check if this value is NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value counts as empty/absent.
    ///
    /// Empty is wider than NULL: the empty string and the null-date sentinel
    /// are empty too. Date coercion treats empty incoming values as "no date".
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::DateTime(dt) => dt.is_null(),
            _ => false,
        }
    }

    /// Check whether this value is a finite number (usable as a generated
    /// key). Text parsing to NaN or infinity does not count.
    pub fn is_numeric(&self) -> bool {
        match self {
            Value::Int(_) => true,
            Value::Float(f) => f.is_finite(),
            Value::Text(s) => s.parse::<f64>().is_ok_and(f64::is_finite),
            _ => false,
        }
    }

    /// Get the type name of this value.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::DateTime(_) => "datetime",
            Value::Json(_) => "json",
        }
    }

    /// Try to convert this value to a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Try to convert this value to an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            Value::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to convert this value to an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(v) => Some(*v as f64),
            Value::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a `DateTime`.
    pub fn as_datetime(&self) -> Option<DateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime> for Value {
    fn from(v: DateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i64), Value::Int(42));
        assert_eq!(Value::from("ada"), Value::Text("ada".to_string()));
        assert_eq!(Value::from(Option::<i64>::None), Value::Null);
        assert_eq!(Value::from(Some(7i32)), Value::Int(7));
    }

    #[test]
    fn emptiness() {
        assert!(Value::Null.is_empty());
        assert!(Value::Text(String::new()).is_empty());
        assert!(Value::DateTime(DateTime::Null).is_empty());
        assert!(!Value::Int(0).is_empty());
        assert!(!Value::Text("x".to_string()).is_empty());
    }

    #[test]
    fn numeric_check() {
        assert!(Value::Int(42).is_numeric());
        assert!(Value::Text("42".to_string()).is_numeric());
        assert!(!Value::Text("forty-two".to_string()).is_numeric());
        assert!(!Value::Null.is_numeric());
    }

    #[test]
    fn non_finite_values_are_not_numeric() {
        assert!(!Value::Text("NaN".to_string()).is_numeric());
        assert!(!Value::Text("inf".to_string()).is_numeric());
        assert!(!Value::Text("-inf".to_string()).is_numeric());
        assert!(!Value::Float(f64::NAN).is_numeric());
        assert!(!Value::Float(f64::INFINITY).is_numeric());
        assert!(Value::Float(1.5).is_numeric());
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Int(1).as_bool(), Some(true));
        assert_eq!(Value::Text("12".to_string()).as_i64(), Some(12));
        assert_eq!(Value::Text("hi".to_string()).as_str(), Some("hi"));
        assert_eq!(Value::Int(3).as_str(), None);
    }
}
