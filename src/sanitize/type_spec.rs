//! Type specifications: what the caller wants a raw value to become.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use super::error::ConfigError;
use super::value::Value;

/// A caller-supplied transform for the `func` type
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, value: Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate(..)")
    }
}

/// The positional argument forwarded to a sanitizer alongside the value
#[derive(Debug, Clone)]
pub enum Param {
    Value(Value),
    Pattern(Regex),
    Predicate(Predicate),
}

impl Param {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Param::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Value(v) => write!(f, "{}", v),
            Param::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Param::Predicate(_) => write!(f, "[function]"),
        }
    }
}

impl From<Value> for Param {
    fn from(v: Value) -> Self {
        Param::Value(v)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Value(Value::from(s))
    }
}

impl From<i32> for Param {
    fn from(n: i32) -> Self {
        Param::Value(Value::from(n))
    }
}

impl From<u32> for Param {
    fn from(n: u32) -> Self {
        Param::Value(Value::from(n))
    }
}

impl From<Vec<Value>> for Param {
    fn from(items: Vec<Value>) -> Self {
        Param::Value(Value::Array(items))
    }
}

impl From<Regex> for Param {
    fn from(re: Regex) -> Self {
        Param::Pattern(re)
    }
}

impl From<Predicate> for Param {
    fn from(p: Predicate) -> Self {
        Param::Predicate(p)
    }
}

#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// A canonical type name or one of its aliases
    Named(String),
    /// Shorthand for the `regex` type with this pattern
    Pattern(Regex),
    /// Shorthand for the `func` type with this predicate
    Predicate(Predicate),
    /// A named type plus the argument its sanitizer expects,
    /// e.g. `("float", 2)` or `("url", "sftp")`
    Parameterized { name: String, arg: Param },
}

impl TypeSpec {
    pub fn named(name: impl Into<String>) -> Self {
        TypeSpec::Named(name.into())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        TypeSpec::Predicate(Predicate::new(f))
    }

    pub fn with_arg(name: impl Into<String>, arg: impl Into<Param>) -> Self {
        TypeSpec::Parameterized {
            name: name.into(),
            arg: arg.into(),
        }
    }

    /// Splits the type spec into the type name to look up and the extra argument
    /// for the sanitizer. Literal patterns and predicates pick their
    /// implicit types.
    pub(crate) fn resolve(&self) -> (&str, Option<Param>) {
        match self {
            TypeSpec::Named(name) => (name.as_str(), None),
            TypeSpec::Pattern(re) => ("regex", Some(Param::Pattern(re.clone()))),
            TypeSpec::Predicate(p) => ("func", Some(Param::Predicate(p.clone()))),
            TypeSpec::Parameterized { name, arg } => (name.as_str(), Some(arg.clone())),
        }
    }

    /// Reads a spec declared in JSON (or YAML turned into JSON):
    ///
    /// * `"integer"`: a named type
    /// * `["float", 2]`: a named type with an argument
    /// * `{"pattern": "^a+$", "flags": "i"}`: a regex literal
    ///
    /// A `{"pattern": ...}` object in argument position becomes a regex
    /// argument, so `["regex", {"pattern": "^a"}]` works too.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ConfigError> {
        match json {
            serde_json::Value::String(name) => Ok(TypeSpec::Named(name.clone())),
            serde_json::Value::Array(parts) => match parts.as_slice() {
                [serde_json::Value::String(name), arg] => {
                    let arg = match arg {
                        serde_json::Value::Object(obj) if obj.contains_key("pattern") => {
                            Param::Pattern(compile_pattern(arg)?)
                        }
                        other => Param::Value(Value::from(other.clone())),
                    };
                    Ok(TypeSpec::with_arg(name.as_str(), arg))
                }
                _ => Err(ConfigError::InvalidTypeSpec(json.to_string())),
            },
            serde_json::Value::Object(obj) if obj.contains_key("pattern") => {
                Ok(TypeSpec::Pattern(compile_pattern(json)?))
            }
            _ => Err(ConfigError::InvalidTypeSpec(json.to_string())),
        }
    }
}

fn compile_pattern(json: &serde_json::Value) -> Result<Regex, ConfigError> {
    let source = json
        .get("pattern")
        .and_then(|p| p.as_str())
        .ok_or_else(|| ConfigError::InvalidPattern(json.to_string()))?;

    let mut builder = RegexBuilder::new(source);
    if let Some(flags) = json.get("flags") {
        let flags = flags
            .as_str()
            .ok_or_else(|| ConfigError::InvalidPattern(json.to_string()))?;
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                _ => return Err(ConfigError::InvalidPattern(format!("unknown flag {:?}", flag))),
            };
        }
    }

    builder
        .build()
        .map_err(|e| ConfigError::InvalidPattern(e.to_string()))
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Named(name) => write!(f, "{}", name),
            TypeSpec::Pattern(re) => write!(f, "/{}/", re.as_str()),
            TypeSpec::Predicate(_) => write!(f, "[function]"),
            TypeSpec::Parameterized { name, arg } => write!(f, "({}, {})", name, arg),
        }
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        TypeSpec::Named(name.to_string())
    }
}

impl From<String> for TypeSpec {
    fn from(name: String) -> Self {
        TypeSpec::Named(name)
    }
}

impl From<Regex> for TypeSpec {
    fn from(re: Regex) -> Self {
        TypeSpec::Pattern(re)
    }
}

impl From<Predicate> for TypeSpec {
    fn from(p: Predicate) -> Self {
        TypeSpec::Predicate(p)
    }
}

impl<T: Into<Param>> From<(&str, T)> for TypeSpec {
    fn from((name, arg): (&str, T)) -> Self {
        TypeSpec::with_arg(name, arg)
    }
}

/// The expected shape of one record: field name -> type spec
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    fields: BTreeMap<String, TypeSpec>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<TypeSpec>) -> Self {
        self.insert(name, spec);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: impl Into<TypeSpec>) {
        self.fields.insert(name.into(), spec.into());
    }

    pub fn get(&self, name: &str) -> Option<&TypeSpec> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reads a JSON object of `field: spec`, see [`TypeSpec::from_json`]
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ConfigError> {
        let obj = json
            .as_object()
            .ok_or_else(|| ConfigError::InvalidTypeSpec(json.to_string()))?;

        obj.iter()
            .map(|(name, spec)| Ok((name.clone(), TypeSpec::from_json(spec)?)))
            .collect()
    }
}

impl<K, S> FromIterator<(K, S)> for FieldMap
where
    K: Into<String>,
    S: Into<TypeSpec>,
{
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (name, spec) in iter {
            map.insert(name, spec);
        }
        map
    }
}
