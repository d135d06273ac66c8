//! Loosely-typed values as they arrive from a request, and as the
//! sanitizers hand them back.
//!
//! The model deliberately keeps the distinctions the engine relies on:
//! `Undefined` (the field was never supplied) is not `Null` (the field was
//! supplied but is invalid), and numeric sanitizers report failure with a
//! NaN number rather than `Null`.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Serialize, Serializer};

/// String-keyed record, ordered so results are deterministic
pub type Map = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent: the caller never supplied the field
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    /// A point in time. Object-shaped, but not a plain object
    Date(SystemTime),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True only for a NaN number, the numeric soft-invalid marker
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Arrays, objects and dates all count as objects for the `object` type
    pub fn is_object_shaped(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_) | Value::Date(_))
    }

    /// Short name of the variant, used in log lines and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Date(_) => "date",
        }
    }

    /// Builds an array value from anything convertible into values
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Converts into JSON for responses. `Undefined` entries are dropped from
    /// objects and become `null` elsewhere; non-finite numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_undefined())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Date(time) => number_to_json(epoch_millis(*time)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

fn epoch_millis(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_millis() as f64,
        Err(before) => -(before.duration().as_millis() as f64),
    }
}

/// Formats a number the way a script engine stringifies it
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // also covers -0
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// Script-engine stringification: this is what the string-based
/// sanitizers (`string`, `phone`, `regex`, ...) operate on.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    // holes and nulls join as empty strings
                    if !matches!(item, Value::Undefined | Value::Null) {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Date(time) => write!(f, "{}", format_number(epoch_millis(*time))),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl From<SystemTime> for Value {
    fn from(time: SystemTime) -> Self {
        Value::Date(time)
    }
}

impl From<Duration> for Value {
    /// A duration is read as an offset from the Unix epoch
    fn from(since_epoch: Duration) -> Self {
        Value::Date(UNIX_EPOCH + since_epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stringification() {
        let cases = vec![
            (Value::Null, "null"),
            (Value::Undefined, "undefined"),
            (Value::Bool(true), "true"),
            (Value::Number(1.0), "1"),
            (Value::Number(-0.0), "0"),
            (Value::Number(1.5), "1.5"),
            (Value::Number(f64::NAN), "NaN"),
            (Value::Number(f64::NEG_INFINITY), "-Infinity"),
            (Value::from("abc"), "abc"),
            (Value::array(vec![Value::from(1), Value::Null, Value::from("x")]), "1,,x"),
            (Value::Object(Map::new()), "[object Object]"),
        ];

        for (value, expected) in cases {
            assert_eq!(value.to_string(), expected, "Wrong stringification of {:?}", value);
        }
    }

    #[test]
    fn test_json_round_trip_shapes() {
        let value = Value::from(json!({"id": 1, "tags": ["a", "b"], "ok": true, "gone": null}));
        let map = value.as_object().unwrap();

        assert_eq!(map.get("id"), Some(&Value::Number(1.0)));
        assert_eq!(map.get("tags").and_then(Value::as_array).map(Vec::len), Some(2));
        assert_eq!(map.get("gone"), Some(&Value::Null));
        assert_eq!(value.to_json(), json!({"id": 1, "tags": ["a", "b"], "ok": true, "gone": null}));
    }

    #[test]
    fn test_to_json_drops_undefined_fields_and_nan() {
        let mut map = Map::new();
        map.insert("missing".to_string(), Value::Undefined);
        map.insert("bad".to_string(), Value::Number(f64::NAN));
        map.insert("price".to_string(), Value::Number(1.25));

        assert_eq!(Value::Object(map).to_json(), json!({"bad": null, "price": 1.25}));
    }

    #[test]
    fn test_nan_is_only_reported_for_numbers() {
        assert!(Value::Number(f64::NAN).is_nan());
        assert!(!Value::Number(1.0).is_nan());
        assert!(!Value::Null.is_nan());
        assert!(!Value::from("NaN").is_nan());
    }

    #[test]
    fn test_object_shapes() {
        assert!(Value::Object(Map::new()).is_object_shaped());
        assert!(Value::Array(vec![]).is_object_shaped());
        assert!(Value::from(Duration::from_secs(10)).is_object_shaped());
        assert!(!Value::from("{}").is_object_shaped());
        assert!(!Value::Null.is_object_shaped());
    }
}
