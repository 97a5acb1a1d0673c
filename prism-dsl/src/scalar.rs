//! Dynamic scalars and string lists used as clause payloads

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// A term, bound or origin value: string, number, bool or timestamp
///
/// Timestamps are emitted as RFC 3339 strings and therefore parse back as
/// [`Scalar::String`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(Number),
    Bool(bool),
    Time(DateTime<Utc>),
}

impl Scalar {
    /// `None` for null, arrays and objects
    pub fn from_json(value: &Value) -> Option<Scalar> {
        match value {
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::String(s) => Value::String(s.clone()),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Time(t) => Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// An empty string carries no value
    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::String(s) if s.is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Time(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Number(Number::from(v))
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(Number::from(v))
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::Number(Number::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        match Number::from_f64(v) {
            Some(n) => Scalar::Number(n),
            None => Scalar::String(v.to_string()),
        }
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(v: DateTime<Utc>) -> Self {
        Scalar::Time(v)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Scalar::from_json(&value)
            .ok_or_else(|| D::Error::custom(format!("expected a scalar, got {}", value)))
    }
}

/// Ordered list of strings that also accepts a single string on input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Strings(Vec<String>);

impl Strings {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the value is neither a string nor an array of strings
    pub fn from_json(value: &Value) -> Option<Strings> {
        match value {
            Value::Null => Some(Strings::default()),
            Value::String(s) => Some(Strings(vec![s.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Strings),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.0.iter().cloned().map(Value::String).collect())
    }

    pub fn push(&mut self, value: impl Into<String>) {
        self.0.push(value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Strings {
    fn from(v: &str) -> Self {
        Strings(vec![v.to_string()])
    }
}

impl From<String> for Strings {
    fn from(v: String) -> Self {
        Strings(vec![v])
    }
}

impl From<Vec<String>> for Strings {
    fn from(v: Vec<String>) -> Self {
        Strings(v)
    }
}

impl From<Vec<&str>> for Strings {
    fn from(v: Vec<&str>) -> Self {
        Strings(v.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Strings {
    fn from(v: [&str; N]) -> Self {
        Strings(v.iter().map(|s| s.to_string()).collect())
    }
}

impl FromIterator<String> for Strings {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Strings(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Strings {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Strings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Strings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Strings::from_json(&value).ok_or_else(|| {
            D::Error::custom(format!("expected a string or an array of strings, got {}", value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_scalar_from_json() {
        assert_eq!(Scalar::from_json(&json!("v")), Some(Scalar::from("v")));
        assert_eq!(Scalar::from_json(&json!(3)), Some(Scalar::from(3)));
        assert_eq!(Scalar::from_json(&json!(true)), Some(Scalar::Bool(true)));
        assert_eq!(Scalar::from_json(&json!(null)), None);
        assert_eq!(Scalar::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_time_emits_rfc3339() {
        let t = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(Scalar::from(t).to_json(), json!("2021-03-04T05:06:07Z"));
    }

    #[test]
    fn test_strings_accepts_single_string() {
        let s: Strings = serde_json::from_value(json!("title")).unwrap();
        assert_eq!(s.as_slice(), &["title".to_string()]);
        assert_eq!(s.to_json(), json!(["title"]));
    }

    #[test]
    fn test_strings_rejects_mixed_array() {
        assert!(Strings::from_json(&json!(["a", 1])).is_none());
        assert!(serde_json::from_value::<Strings>(json!(5)).is_err());
    }
}
