//! Booleans and numbers.
//!
//! Numeric coercion follows the lenient script-engine parsers: the longest
//! numeric prefix is taken and trailing garbage ignored. A value with no
//! numeric prefix becomes NaN, never `Null`.

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use super::split_pair;
use crate::consts::MAX_FLOAT_PRECISION;
use crate::sanitize::error::ConfigError;
use crate::sanitize::type_spec::Param;
use crate::sanitize::value::Value;

static LEADING_INT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+").expect("Failed to compile integer regex"));

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("Failed to compile float regex")
});

/// Booleans pass through, `null` is false, and any other value is false
/// only when it stringifies to `""`, `"0"` or `"false"`.
pub fn bool(value: Value, _arg: Option<&Param>) -> Result<Value, ConfigError> {
    let flag = match value {
        Value::Bool(b) => b,
        Value::Null => false,
        other => {
            let text = other.to_string();
            !(text.is_empty() || text == "0" || text.eq_ignore_ascii_case("false"))
        }
    };
    Ok(Value::Bool(flag))
}

/// Base-10 leading-integer parse of the stringified value
pub fn integer(value: Value, _arg: Option<&Param>) -> Result<Value, ConfigError> {
    Ok(Value::Number(parse_int(&value.to_string())))
}

/// Leading-decimal parse, optionally rounded to a number of digits.
///
/// The precision comes from the type spec (`("float", 2)`). Only when the
/// type spec has none is a packed `[value, precision]` array unpacked.
/// A precision outside `0..=100` invalidates.
pub fn float(value: Value, arg: Option<&Param>) -> Result<Value, ConfigError> {
    let (value, precision) = split_pair(value, arg);

    let number = match &value {
        Value::Number(n) => *n,
        other => parse_float(&other.to_string()),
    };

    let digits = precision
        .map(|p| parse_int(&p.to_string()))
        .filter(|p| !p.is_nan());

    match digits {
        None => Ok(Value::Number(number)),
        Some(p) if p < 0.0 || p > MAX_FLOAT_PRECISION as f64 => {
            trace!("float precision {} out of range", p);
            Ok(Value::Null)
        }
        Some(p) => Ok(Value::Number(round_to(number, p as usize))),
    }
}

/// Rounds by formatting to `digits` decimals and reading the text back
fn round_to(number: f64, digits: usize) -> f64 {
    if !number.is_finite() {
        return number;
    }
    format!("{:.*}", digits, number)
        .parse::<f64>()
        .unwrap_or(f64::NAN)
}

pub(crate) fn parse_int(text: &str) -> f64 {
    LEADING_INT
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

pub(crate) fn parse_float(text: &str) -> f64 {
    let Some(m) = LEADING_FLOAT.find(text.trim_start()) else {
        return f64::NAN;
    };

    match m.as_str() {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        digits => digits.parse::<f64>().unwrap_or(f64::NAN),
    }
}
