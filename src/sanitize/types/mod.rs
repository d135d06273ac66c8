//! Built-in sanitizers, one function per canonical type.
//!
//! Every function has the [`SanitizeFn`](super::registry::SanitizeFn) shape
//! so it can be registered directly and wrapped by callers.

mod network;
mod number;
mod structured;
mod text;

pub use network::{email, url};
pub use number::{bool, float, integer};
pub use structured::{array, json, object, pojo};
pub use text::{func, one_of, phone, regex, string};

use super::registry::SanitizerRegistry;
use super::type_spec::Param;
use super::value::Value;

pub(crate) fn register_builtins(registry: &mut SanitizerRegistry) {
    registry.insert("bool", bool);
    registry.insert("integer", integer);
    registry.insert("float", float);
    registry.insert("phone", phone);
    registry.insert("email", email);
    registry.insert("url", url);
    registry.insert("regex", regex);
    registry.insert("func", func);
    registry.insert("string", string);
    registry.insert("json", json);
    registry.insert("array", array);
    registry.insert("object", object);
    registry.insert("pojo", pojo);
    registry.insert("oneOf", one_of);
}

/// `float`, `url` and `oneOf` accept their argument packed with the value as
/// a `[value, arg]` array, but only when the type spec gives none. An
/// argument from the type spec always wins and the value is left as is.
fn split_pair(value: Value, arg: Option<&Param>) -> (Value, Option<Value>) {
    if let Some(arg) = arg {
        return (value, arg.as_value().cloned());
    }

    match value {
        Value::Array(mut items) => {
            let packed = if items.len() > 1 { Some(items.swap_remove(1)) } else { None };
            let value = items.into_iter().next().unwrap_or_default();
            (value, packed)
        }
        other => (other, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pair() {
        let (value, arg) = split_pair(Value::array(vec!["1.2345", "2"]), None);
        assert_eq!(value, Value::from("1.2345"));
        assert_eq!(arg, Some(Value::from("2")));

        let (value, arg) = split_pair(Value::from("x"), Some(&Param::from("sftp")));
        assert_eq!(value, Value::from("x"));
        assert_eq!(arg, Some(Value::from("sftp")));

        let (value, arg) = split_pair(Value::Array(vec![]), None);
        assert_eq!(value, Value::Undefined);
        assert_eq!(arg, None);
    }

    #[test]
    fn test_split_pair_type_spec_argument_wins() {
        let packed = Value::array(vec!["evil.com", "javascript"]);

        let (value, arg) = split_pair(packed.clone(), Some(&Param::from("https")));
        assert_eq!(value, packed);
        assert_eq!(arg, Some(Value::from("https")));

        let (value, arg) = split_pair(Value::array(vec!["1.5"]), Some(&Param::from(2)));
        assert_eq!(value, Value::array(vec!["1.5"]));
        assert_eq!(arg, Some(Value::Number(2.0)));
    }
}
