//! Outer JSON shapes of clause bodies
//!
//! Field-keyed clauses (`{"<field>": {...}}` or the scalar shortcut
//! `{"<field>": "v"}`) and flat clauses (`{"<param>": ...}`) are split here
//! into a plain parameter object, which the registry and each clause then
//! read from.

use serde_json::{Map, Value};

use crate::error::{DslError, ErrorKind};
use crate::scalar::{Scalar, Strings};

/// Split a field-keyed body into its field name and parameter object
///
/// A scalar in place of the parameter object fills the `shortcut` slot.
/// Returns `None` for null or `{}`, which denote an empty clause.
pub(crate) fn field_keyed(
    value: &Value,
    shortcut: Option<&str>,
) -> Result<Option<(String, Map<String, Value>)>, DslError> {
    let map = match value {
        Value::Null => return Ok(None),
        Value::Object(map) => map,
        _ => {
            return Err(DslError::new(ErrorKind::InvalidParams)
                .with_detail("expected an object keyed by field name"))
        }
    };
    let mut entries = map.iter();
    let Some((field, inner)) = entries.next() else {
        return Ok(None);
    };
    if let Some((second, _)) = entries.next() {
        return Err(DslError::new(ErrorKind::InvalidParams).with_detail(format!(
            "expected a single field, got several ({}, {}, ...)",
            field, second
        )));
    }
    let body = match inner {
        Value::Object(body) => body.clone(),
        Value::Null => Map::new(),
        Value::Array(_) => {
            return Err(DslError::new(ErrorKind::InvalidParams)
                .with_field(field.as_str())
                .with_detail("expected an object of parameters"))
        }
        scalar => match shortcut {
            Some(slot) => {
                let mut body = Map::new();
                body.insert(slot.to_string(), scalar.clone());
                body
            }
            None => {
                return Err(DslError::new(ErrorKind::InvalidParams)
                    .with_field(field.as_str())
                    .with_detail("expected an object of parameters"))
            }
        },
    };
    Ok(Some((field.clone(), body)))
}

/// Wrap a parameter object under its field name
pub(crate) fn wrap_field(field: &str, inner: Map<String, Value>) -> Value {
    let mut outer = Map::new();
    outer.insert(field.to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// Parameter object of a flat clause; `None` for null
pub(crate) fn flat(value: &Value) -> Result<Option<&Map<String, Value>>, DslError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(DslError::new(ErrorKind::InvalidParams)
            .with_detail("expected an object")
            .with_received(other)),
    }
}

/// String slot; numbers and bools are rendered as text
pub(crate) fn string(map: &Map<String, Value>, key: &str) -> Result<Option<String>, DslError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(invalid(key, other)),
    }
}

pub(crate) fn scalar(map: &Map<String, Value>, key: &str) -> Result<Option<Scalar>, DslError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Scalar::from_json(value)
            .map(Some)
            .ok_or_else(|| invalid(key, value)),
    }
}

pub(crate) fn strings(map: &Map<String, Value>, key: &str) -> Result<Strings, DslError> {
    match map.get(key) {
        None => Ok(Strings::default()),
        Some(value) => Strings::from_json(value).ok_or_else(|| invalid(key, value)),
    }
}

pub(crate) fn boolean(map: &Map<String, Value>, key: &str) -> Result<Option<bool>, DslError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(other) => Err(invalid(key, other)),
    }
}

pub(crate) fn integer(map: &Map<String, Value>, key: &str) -> Result<Option<i64>, DslError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => crate::input::Loose::from_json(value)
            .ok()
            .flatten()
            .and_then(|loose| loose.to_i64())
            .map(Some)
            .ok_or_else(|| invalid(key, value)),
    }
}

pub(crate) fn float(map: &Map<String, Value>, key: &str) -> Result<Option<f64>, DslError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => crate::input::Loose::from_json(value)
            .ok()
            .flatten()
            .and_then(|loose| loose.to_f64())
            .map(Some)
            .ok_or_else(|| invalid(key, value)),
    }
}

fn invalid(key: &str, value: &Value) -> DslError {
    DslError::new(ErrorKind::InvalidParams)
        .with_param(key)
        .with_received(value)
}

/// Insert a value unless it is absent
pub(crate) fn put(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}
