//! Row types for accessing caller-supplied data.
//!
//! The engine never interprets the domain meaning of a field. Everything it
//! does (search, filter, sort) goes through [`Row::field`], so callers can
//! hand over raw JSON payloads or implement [`Row`] on their own typed
//! structs for compile-time safety.

use serde_json::Value;
use std::borrow::Cow;

/// A single field value as seen by the engine.
///
/// Borrowed where possible so that reading a field from a JSON row does not
/// allocate. Missing fields and JSON nulls are both [`FieldValue::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl<'a> FieldValue<'a> {
    /// Convert a JSON value into a field value.
    ///
    /// Arrays and objects are coerced to their JSON text, the same way a
    /// template would stringify them for display.
    pub fn from_json(value: &'a Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Text(Cow::Borrowed(s)),
            other => FieldValue::Text(Cow::Owned(other.to_string())),
        }
    }

    /// Check whether this value is null/missing.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// String coercion used by search and filter matching.
    ///
    /// Null coerces to the empty string, so a missing field never matches a
    /// non-empty query. Whole floats render without the trailing `.0` to
    /// match how the values arrive in JSON payloads.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
            FieldValue::Int(i) => Cow::Owned(i.to_string()),
            FieldValue::Float(f) => Cow::Owned(format_float(*f)),
            FieldValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            FieldValue::Null => Cow::Borrowed(""),
        }
    }

    /// Numeric view of this value, when it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Named-field access over one row of caller-supplied data.
///
/// Implemented out of the box for `serde_json` objects; callers with typed
/// records implement it themselves and keep their field names in one place.
pub trait Row {
    /// Look up a field by name. Missing fields are [`FieldValue::Null`].
    fn field(&self, name: &str) -> FieldValue<'_>;
}

impl Row for serde_json::Map<String, Value> {
    fn field(&self, name: &str) -> FieldValue<'_> {
        self.get(name).map_or(FieldValue::Null, FieldValue::from_json)
    }
}

impl Row for Value {
    fn field(&self, name: &str) -> FieldValue<'_> {
        self.as_object()
            .and_then(|obj| obj.get(name))
            .map_or(FieldValue::Null, FieldValue::from_json)
    }
}
