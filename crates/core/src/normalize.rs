//! Normalization of loosely-structured input trees into plain JSON values.
//!
//! Chart documents may arrive from an embedding host whose values are not
//! plain data (proxies wrapping native structures). [`normalize`] walks the
//! tree and produces a [`serde_json::Value`], substituting a textual fallback
//! for any node that cannot be converted instead of failing.

use std::fmt;

use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

/// A value that can convert itself into plain data.
///
/// Implemented by host bindings that wrap native structures. Conversion may
/// fail; the normalizer recovers by substituting
/// [`describe`](ForeignValue::describe) output for the affected node.
pub trait ForeignValue: fmt::Debug {
    /// Convert to a plain [`RawValue`] candidate for further normalization.
    fn to_plain(&self) -> Result<RawValue>;

    /// Best-effort textual representation, used when `to_plain` fails.
    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

/// Input tree for normalization: plain containers and scalars, plus opaque
/// foreign leaves.
#[derive(Debug)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Seq(Vec<RawValue>),
    /// Key-value pairs whose keys are not yet normalized.
    Map(Vec<(RawValue, RawValue)>),
    Foreign(Box<dyn ForeignValue>),
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RawValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    RawValue::Float(f)
                } else {
                    RawValue::Text(n.to_string())
                }
            }
            Value::String(s) => RawValue::Text(s),
            Value::Array(items) => RawValue::Seq(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => RawValue::Map(
                map.into_iter()
                    .map(|(k, v)| (RawValue::Text(k), v.into()))
                    .collect(),
            ),
        }
    }
}

/// Normalize a raw tree into plain JSON.
///
/// Never fails: an unconvertible node is replaced by its textual
/// representation and a warning is logged. The only failure that can reach
/// the root is a bare foreign value whose conversion fails, which degrades
/// to that value's description.
pub fn normalize(raw: &RawValue) -> Value {
    match try_normalize(raw) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Normalization failed at the document root: {}", e);
            fallback_value(raw)
        }
    }
}

/// Normalize one node, propagating foreign-conversion failures upward so the
/// enclosing container can degrade just the affected entry.
fn try_normalize(raw: &RawValue) -> Result<Value> {
    match raw {
        RawValue::Null => Ok(Value::Null),
        RawValue::Bool(b) => Ok(Value::Bool(*b)),
        RawValue::Int(i) => Ok(Value::Number((*i).into())),
        RawValue::Float(f) => Ok(match Number::from_f64(*f) {
            Some(n) => Value::Number(n),
            // JSON has no NaN or infinity
            None => Value::String(f.to_string()),
        }),
        RawValue::Text(s) => Ok(Value::String(s.clone())),
        RawValue::Seq(items) => Ok(Value::Array(items.iter().map(normalize_element).collect())),
        RawValue::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, value) in entries {
                let (k, v) = normalize_entry(key, value);
                map.insert(k, v);
            }
            Ok(Value::Object(map))
        }
        RawValue::Foreign(foreign) => try_normalize(&foreign.to_plain()?),
    }
}

/// Normalize a sequence element, degrading to text on failure.
fn normalize_element(item: &RawValue) -> Value {
    match try_normalize(item) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to convert sequence element: {}", e);
            fallback_value(item)
        }
    }
}

/// Normalize a single map entry.
///
/// A failure in either the key or the value degrades the whole entry to its
/// textual form rather than dropping it.
fn normalize_entry(key: &RawValue, value: &RawValue) -> (String, Value) {
    match try_normalize(key).and_then(key_to_string) {
        Ok(k) => match try_normalize(value) {
            Ok(v) => (k, v),
            Err(e) => {
                log::warn!("Failed to convert value for key {:?}: {}", k, e);
                (k, fallback_value(value))
            }
        },
        Err(e) => {
            log::warn!("Failed to convert map key: {}", e);
            (describe_raw(key), fallback_value(value))
        }
    }
}

/// Convert a normalized key into a JSON object key.
///
/// Scalar keys stringify; container keys are rejected so the entry can
/// degrade.
fn key_to_string(key: Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::InvalidKey(format!("container key: {}", other))),
    }
}

/// Best-effort textual stand-in for a node that could not be normalized.
fn fallback_value(raw: &RawValue) -> Value {
    match raw {
        RawValue::Null => Value::Null,
        other => Value::String(describe_raw(other)),
    }
}

/// Render a raw node as text without normalizing it.
fn describe_raw(raw: &RawValue) -> String {
    match raw {
        RawValue::Null => "null".to_string(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Int(i) => i.to_string(),
        RawValue::Float(f) => f.to_string(),
        RawValue::Text(s) => s.clone(),
        RawValue::Seq(_) | RawValue::Map(_) => format!("{:?}", raw),
        RawValue::Foreign(foreign) => foreign.describe(),
    }
}
