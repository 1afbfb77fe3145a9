use std::collections::HashMap;
use std::fmt;

use rhai::Dynamic;
use serde::{Deserialize, Serialize};

/// A script-visible value.
///
/// Payload entries and script bindings use this type so the engine does not
/// depend on any particular interpreter's value representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A text value.
    String(String),
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A string-keyed map of values.
    Map(HashMap<String, Value>),
}

impl Value {
    /// The integer, if this is an [`Integer`](Self::Integer).
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The number as a float, for either numeric variant.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// The boolean, if this is a [`Boolean`](Self::Boolean).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The text, if this is a [`String`](Self::String).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert an interpreter result. Unit becomes `None`; values with no
    /// counterpart here are rendered to text.
    pub fn from_dynamic(value: Dynamic) -> Option<Self> {
        if value.is_unit() {
            return None;
        }
        if let Ok(b) = value.as_bool() {
            return Some(Self::Boolean(b));
        }
        if let Ok(n) = value.as_int() {
            return Some(Self::Integer(n));
        }
        if let Ok(n) = value.as_float() {
            return Some(Self::Float(n));
        }
        if value.is_string() {
            return value.into_string().ok().map(Self::String);
        }
        if value.is_array() {
            let items = value.into_array().ok()?;
            return Some(Self::List(
                items.into_iter().filter_map(Self::from_dynamic).collect(),
            ));
        }
        if value.is_map() {
            let map = value.try_cast::<rhai::Map>()?;
            return Some(Self::Map(
                map.into_iter()
                    .filter_map(|(k, v)| Self::from_dynamic(v).map(|v| (k.to_string(), v)))
                    .collect(),
            ));
        }
        Some(Self::String(value.to_string()))
    }
}

impl From<Value> for Dynamic {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Dynamic::from(s),
            Value::Integer(n) => Dynamic::from_int(n),
            Value::Float(n) => Dynamic::from_float(n),
            Value::Boolean(b) => Dynamic::from_bool(b),
            Value::List(items) => Dynamic::from_array(items.into_iter().map(Into::into).collect()),
            Value::Map(entries) => {
                let mut map = rhai::Map::new();
                for (k, v) in entries {
                    map.insert(k.into(), v.into());
                }
                Dynamic::from_map(map)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(entries) => {
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                let parts: Vec<String> = keys
                    .into_iter()
                    .map(|k| format!("{k}: {}", entries[k]))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}
