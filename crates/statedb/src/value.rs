//! The payload stored under a key.
//!
//! Values are schemaless from the store's point of view, so they are modeled
//! as a tagged variant. The serde representation is adjacently tagged
//! (`{"type": "float", "value": 1.0}`), which keeps every round trip through a
//! backing collection type-preserving: a float never comes back as an integer,
//! a timestamp never comes back as a string, and `Null` stays distinct from
//! "no record".

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value held by a key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StateValue {
    /// The void marker written by `clear`: the key exists but holds nothing.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    List(Vec<StateValue>),
    Map(BTreeMap<String, StateValue>),
}

impl StateValue {
    pub fn is_null(&self) -> bool {
        matches!(self, StateValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StateValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StateValue::Float(f) => Some(*f),
            StateValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            StateValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Convert plain JSON into a value.
    ///
    /// Integral numbers that fit an `i64` become `Int`, every other number
    /// becomes `Float`. Strings are never reinterpreted as timestamps.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => StateValue::Null,
            serde_json::Value::Bool(b) => StateValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => StateValue::Int(i),
                None => StateValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => StateValue::String(s),
            serde_json::Value::Array(items) => {
                StateValue::List(items.into_iter().map(StateValue::from_json).collect())
            }
            serde_json::Value::Object(fields) => StateValue::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, StateValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Render as plain JSON for display. Timestamps become RFC 3339 strings
    /// and non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            StateValue::Null => serde_json::Value::Null,
            StateValue::Bool(b) => serde_json::Value::Bool(*b),
            StateValue::Int(i) => serde_json::Value::from(*i),
            StateValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            StateValue::String(s) => serde_json::Value::String(s.clone()),
            StateValue::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
            StateValue::List(items) => {
                serde_json::Value::Array(items.iter().map(StateValue::to_json).collect())
            }
            StateValue::Map(fields) => serde_json::Value::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident: $($ty:ty),+) => {
        $(
            impl From<$ty> for StateValue {
                fn from(v: $ty) -> Self {
                    StateValue::$variant(v.into())
                }
            }
        )+
    };
}

impl_from!(Bool: bool);
impl_from!(Int: i64, i32, i16, i8, u32, u16, u8);
impl_from!(Float: f64, f32);
impl_from!(String: String, &str);
impl_from!(Timestamp: DateTime<Utc>);

impl<T: Into<StateValue>> From<Vec<T>> for StateValue {
    fn from(items: Vec<T>) -> Self {
        StateValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<StateValue>> From<BTreeMap<String, T>> for StateValue {
    fn from(fields: BTreeMap<String, T>) -> Self {
        StateValue::Map(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<StateValue>> From<Option<T>> for StateValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(StateValue::Null, Into::into)
    }
}

/// Human-readable rendering: strings and timestamps print bare, everything
/// else prints as its JSON form.
impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::String(s) => f.write_str(s),
            StateValue::Timestamp(t) => f.write_str(&t.to_rfc3339()),
            other => write!(f, "{}", other.to_json()),
        }
    }
}
