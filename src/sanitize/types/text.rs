//! String-shaped types: phone, string, regex, func and oneOf.

use log::warn;

use super::split_pair;
use crate::sanitize::error::ConfigError;
use crate::sanitize::type_spec::Param;
use crate::sanitize::value::Value;

/// Keeps only the digits; `null` stays `null`
pub fn phone(value: Value, _arg: Option<&Param>) -> Result<Value, ConfigError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let digits: String = value
        .to_string()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    Ok(Value::String(digits))
}

/// Stringifies anything but `null`
pub fn string(value: Value, _arg: Option<&Param>) -> Result<Value, ConfigError> {
    Ok(match value {
        Value::Null => Value::Null,
        Value::String(s) => Value::String(s),
        other => Value::String(other.to_string()),
    })
}

/// The stringified value when the pattern matches it, `null` otherwise.
/// Requires a pattern argument.
pub fn regex(value: Value, arg: Option<&Param>) -> Result<Value, ConfigError> {
    let re = match arg {
        Some(Param::Pattern(re)) => re,
        other => {
            let given = describe(other);
            warn!("regex sanitizer called without a pattern: {}", given);
            return Err(ConfigError::InvalidPattern(given));
        }
    };

    if value.is_null() {
        return Ok(Value::Null);
    }

    let text = value.to_string();
    if re.is_match(&text) {
        Ok(Value::String(text))
    } else {
        Ok(Value::Null)
    }
}

/// Hands the value to the caller's predicate. Requires a predicate argument.
pub fn func(value: Value, arg: Option<&Param>) -> Result<Value, ConfigError> {
    match arg {
        Some(Param::Predicate(p)) => Ok(p.call(value)),
        other => {
            let given = describe(other);
            warn!("func sanitizer called without a predicate: {}", given);
            Err(ConfigError::InvalidPredicate(given))
        }
    }
}

/// The value itself when it is one of the candidates, `null` otherwise or
/// when the candidates are not a list.
///
/// # Arguments
/// * `value` - The raw value, or a packed `[value, candidates]` array
/// * `arg` - The candidate list from the type spec; when given, a packed
///   list is never read
pub fn one_of(value: Value, arg: Option<&Param>) -> Result<Value, ConfigError> {
    let (value, candidates) = split_pair(value, arg);

    match candidates {
        Some(Value::Array(candidates)) if candidates.contains(&value) => Ok(value),
        _ => Ok(Value::Null),
    }
}

fn describe(arg: Option<&Param>) -> String {
    arg.map(|a| a.to_string())
        .unwrap_or_else(|| "undefined".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::type_spec::Predicate;
    use ::regex::Regex;

    #[test]
    fn test_phone_digits() {
        let cases = vec![
            (Value::from("408-123-4567"), Value::from("4081234567")),
            (Value::from("(408) 123 - 4567"), Value::from("4081234567")),
            (Value::from(""), Value::from("")),
            (Value::from(4081234567i64), Value::from("4081234567")),
            (Value::Null, Value::Null),
        ];

        for (input, expected) in cases {
            assert_eq!(phone(input.clone(), None), Ok(expected), "Wrong phone for {:?}", input);
        }
    }

    #[test]
    fn test_string() {
        assert_eq!(string(Value::from("abcde"), None), Ok(Value::from("abcde")));
        assert_eq!(string(Value::from(1), None), Ok(Value::from("1")));
        assert_eq!(string(Value::Bool(false), None), Ok(Value::from("false")));
        assert_eq!(string(Value::Null, None), Ok(Value::Null));
    }

    #[test]
    fn test_regex_matching() {
        let insensitive = Param::Pattern(Regex::new("(?i)123").unwrap());
        let exact = Param::Pattern(Regex::new("abc123").unwrap());

        assert_eq!(regex(Value::from("abc123"), Some(&insensitive)), Ok(Value::from("abc123")));
        assert_eq!(regex(Value::from("ABC123"), Some(&exact)), Ok(Value::Null));
        assert_eq!(regex(Value::from(123), Some(&insensitive)), Ok(Value::from("123")));
        assert_eq!(regex(Value::Null, Some(&exact)), Ok(Value::Null));
    }

    #[test]
    fn test_regex_requires_pattern() {
        assert!(matches!(regex(Value::from("a"), None), Err(ConfigError::InvalidPattern(_))));
        assert!(matches!(
            regex(Value::from("a"), Some(&Param::from("a"))),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_func() {
        let suffix = Param::Predicate(Predicate::new(|v| Value::String(format!("{}123", v))));
        let reject = Param::Predicate(Predicate::new(|_| Value::Null));

        assert_eq!(func(Value::from("abc"), Some(&suffix)), Ok(Value::from("abc123")));
        assert_eq!(func(Value::from(""), Some(&reject)), Ok(Value::Null));
        assert!(matches!(func(Value::from("a"), None), Err(ConfigError::InvalidPredicate(_))));
        assert!(matches!(
            func(Value::from("a"), Some(&Param::from(1))),
            Err(ConfigError::InvalidPredicate(_))
        ));
    }

    #[test]
    fn test_one_of() {
        let colors = Param::from(vec![Value::from("red"), Value::from("blue")]);

        assert_eq!(one_of(Value::from("red"), Some(&colors)), Ok(Value::from("red")));
        assert_eq!(one_of(Value::from("green"), Some(&colors)), Ok(Value::Null));
        assert_eq!(one_of(Value::from("red"), Some(&Param::from("red"))), Ok(Value::Null));
        assert_eq!(one_of(Value::from("red"), None), Ok(Value::Null));
    }

    #[test]
    fn test_one_of_packed_candidates() {
        let packed = Value::array(vec![Value::from("red"), Value::array(vec!["red", "blue"])]);
        assert_eq!(one_of(packed.clone(), None), Ok(Value::from("red")));

        // candidates from the type spec win over packed ones
        let colors = Param::from(vec![Value::from("green")]);
        assert_eq!(one_of(packed, Some(&colors)), Ok(Value::Null));
    }
}
