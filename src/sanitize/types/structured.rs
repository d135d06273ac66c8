//! Structured values: json, array, object and pojo.
//! These are shape checks; nested content is never inspected.

use crate::sanitize::error::ConfigError;
use crate::sanitize::type_spec::Param;
use crate::sanitize::value::Value;

/// Parses JSON text. Only objects and arrays are accepted, whether parsed
/// or passed in already structured.
pub fn json(value: Value, _arg: Option<&Param>) -> Result<Value, ConfigError> {
    let parsed = match value {
        Value::String(text) => match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => Value::from(json),
            Err(_) => return Ok(Value::Null),
        },
        other => other,
    };

    if parsed.is_object_shaped() {
        Ok(parsed)
    } else {
        Ok(Value::Null)
    }
}

/// Arrays unchanged; anything else, JSON text included, is `null`
pub fn array(value: Value, _arg: Option<&Param>) -> Result<Value, ConfigError> {
    Ok(match value {
        Value::Array(_) => value,
        _ => Value::Null,
    })
}

/// Any object-shaped value: objects, arrays and dates
pub fn object(value: Value, _arg: Option<&Param>) -> Result<Value, ConfigError> {
    Ok(if value.is_object_shaped() { value } else { Value::Null })
}

/// Plain objects only; arrays and dates are rejected
pub fn pojo(value: Value, _arg: Option<&Param>) -> Result<Value, ConfigError> {
    Ok(match value {
        Value::Object(_) => value,
        _ => Value::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::value::Map;
    use std::time::SystemTime;

    #[test]
    fn test_json_parsing() {
        let parsed = json(Value::from(r#"{"a": 1, "b": [true]}"#), None).unwrap();
        let map = parsed.as_object().expect("Should parse into an object");
        assert_eq!(map.get("a"), Some(&Value::Number(1.0)));

        let list = json(Value::from("[1, 2]"), None).unwrap();
        assert_eq!(list.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_json_rejections() {
        let invalid = vec![
            Value::from("{not json"),
            Value::from("42"),
            Value::from("\"text\""),
            Value::from("null"),
            Value::Number(1.0),
            Value::Null,
        ];

        for input in invalid {
            assert_eq!(json(input.clone(), None), Ok(Value::Null), "Should reject {:?}", input);
        }
    }

    #[test]
    fn test_json_passes_structured_values() {
        let mut map = Map::new();
        map.insert("k".to_string(), Value::from("v"));
        let obj = Value::Object(map);

        assert_eq!(json(obj.clone(), None), Ok(obj));
    }

    #[test]
    fn test_shapes() {
        let obj = Value::Object(Map::new());
        let list = Value::array(vec![1, 2]);
        let date = Value::from(SystemTime::now());
        let text = Value::from("[]");

        assert_eq!(array(list.clone(), None), Ok(list.clone()));
        assert_eq!(array(obj.clone(), None), Ok(Value::Null));
        assert_eq!(array(text.clone(), None), Ok(Value::Null));

        assert_eq!(object(obj.clone(), None), Ok(obj.clone()));
        assert_eq!(object(list.clone(), None), Ok(list.clone()));
        assert_eq!(object(date.clone(), None), Ok(date.clone()));
        assert_eq!(object(text.clone(), None), Ok(Value::Null));

        assert_eq!(pojo(obj.clone(), None), Ok(obj));
        assert_eq!(pojo(list, None), Ok(Value::Null));
        assert_eq!(pojo(date, None), Ok(Value::Null));
        assert_eq!(pojo(Value::Null, None), Ok(Value::Null));
    }
}
