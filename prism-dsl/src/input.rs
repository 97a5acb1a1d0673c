//! Loose parameter input
//!
//! Parameter records accept values in whatever form a caller (or a JSON
//! document) happens to have them: `"true"` for a bool, `"5"` for an int,
//! `2` for a float. [`Loose`] holds such a value until a parameter coerces it
//! into its strict type.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A scalar given for a parameter before it is checked against the parameter type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Loose {
    /// Read a JSON value as loose input; null is "not given"
    ///
    /// Arrays and objects are returned as `Err` with the value echoed back so
    /// the caller can name it in the error.
    pub fn from_json(value: &Value) -> Result<Option<Loose>, String> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(Loose::Bool(*b))),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Some(Loose::Int(i)))
                } else if let Some(f) = n.as_f64() {
                    Ok(Some(Loose::Float(f)))
                } else {
                    Err(n.to_string())
                }
            }
            Value::String(s) => Ok(Some(Loose::Str(s.clone()))),
            other => Err(other.to_string()),
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Loose::Bool(b) => Some(*b),
            Loose::Str(s) => match s.trim().to_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Integer coercion; floats and numeric strings are accepted only when lossless
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Loose::Int(i) => Some(*i),
            Loose::Float(f) => float_to_i64(*f),
            Loose::Str(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_i64))
            }
            Loose::Bool(_) => None,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Loose::Int(i) => Some(*i as f64),
            Loose::Float(f) if f.is_finite() => Some(*f),
            Loose::Str(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// String form of the value; numbers and bools are rendered in decimal/lowercase
    pub fn to_text(&self) -> String {
        match self {
            Loose::Bool(b) => b.to_string(),
            Loose::Int(i) => i.to_string(),
            Loose::Float(f) => f.to_string(),
            Loose::Str(s) => s.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Loose::Str(s) => Some(s),
            _ => None,
        }
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for Loose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loose::Str(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

impl From<bool> for Loose {
    fn from(v: bool) -> Self {
        Loose::Bool(v)
    }
}

impl From<i32> for Loose {
    fn from(v: i32) -> Self {
        Loose::Int(v as i64)
    }
}

impl From<i64> for Loose {
    fn from(v: i64) -> Self {
        Loose::Int(v)
    }
}

impl From<u32> for Loose {
    fn from(v: u32) -> Self {
        Loose::Int(v as i64)
    }
}

impl From<u64> for Loose {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => Loose::Int(i),
            Err(_) => Loose::Float(v as f64),
        }
    }
}

impl From<usize> for Loose {
    fn from(v: usize) -> Self {
        Loose::from(v as u64)
    }
}

impl From<f32> for Loose {
    fn from(v: f32) -> Self {
        Loose::Float(v as f64)
    }
}

impl From<f64> for Loose {
    fn from(v: f64) -> Self {
        Loose::Float(v)
    }
}

impl From<&str> for Loose {
    fn from(v: &str) -> Self {
        Loose::Str(v.to_string())
    }
}

impl From<String> for Loose {
    fn from(v: String) -> Self {
        Loose::Str(v)
    }
}

impl From<&String> for Loose {
    fn from(v: &String) -> Self {
        Loose::Str(v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_coercion() {
        assert_eq!(Loose::from("true").to_bool(), Some(true));
        assert_eq!(Loose::from(" FALSE ").to_bool(), Some(false));
        assert_eq!(Loose::from(false).to_bool(), Some(false));
        assert_eq!(Loose::from("yes").to_bool(), None);
        assert_eq!(Loose::from(1).to_bool(), None);
    }

    #[test]
    fn test_int_coercion_is_lossless() {
        assert_eq!(Loose::from("5").to_i64(), Some(5));
        assert_eq!(Loose::from(5.0).to_i64(), Some(5));
        assert_eq!(Loose::from("5.0").to_i64(), Some(5));
        assert_eq!(Loose::from(5.5).to_i64(), None);
        assert_eq!(Loose::from("five").to_i64(), None);
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(Loose::from("0.001").to_f64(), Some(0.001));
        assert_eq!(Loose::from(2).to_f64(), Some(2.0));
        assert_eq!(Loose::from(f64::NAN).to_f64(), None);
        assert_eq!(Loose::from(true).to_f64(), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Loose::from_json(&json!(null)), Ok(None));
        assert_eq!(Loose::from_json(&json!(3)), Ok(Some(Loose::Int(3))));
        assert_eq!(Loose::from_json(&json!(0.5)), Ok(Some(Loose::Float(0.5))));
        assert!(Loose::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_display_quotes_strings() {
        assert_eq!(Loose::from("abc").to_string(), "\"abc\"");
        assert_eq!(Loose::from(7).to_string(), "7");
    }
}
