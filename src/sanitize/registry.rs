//! The table of sanitizing functions, keyed by canonical type name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::ConfigError;
use super::type_spec::Param;
use super::types;
use super::value::Value;

/// A sanitizing function: takes the (already trimmed) value and the optional
/// argument from the type spec. Returns the normalized value, `Value::Null`
/// for invalid input, or a `ConfigError` when the type spec itself is unusable.
pub type SanitizeFn =
    Arc<dyn Fn(Value, Option<&Param>) -> Result<Value, ConfigError> + Send + Sync>;

/// Anything that can run a sanitizer by canonical name.
pub trait Sanitizers: Send + Sync {
    /// `None` when no sanitizer is registered under `canonical`
    fn apply(
        &self,
        canonical: &str,
        value: Value,
        arg: Option<&Param>,
    ) -> Option<Result<Value, ConfigError>>;
}

/// Map-backed [`Sanitizers`]. Derived registries are built with
/// [`with`](Self::with) and [`wrap`](Self::wrap); neither touches `self`.
#[derive(Clone, Default)]
pub struct SanitizerRegistry {
    entries: HashMap<String, SanitizeFn>,
}

impl SanitizerRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every built-in type: bool, integer, float, phone, email, url, regex,
    /// func, string, json, array, object, pojo and oneOf
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        types::register_builtins(&mut registry);
        registry
    }

    pub(crate) fn insert<F>(&mut self, name: &str, f: F)
    where
        F: Fn(Value, Option<&Param>) -> Result<Value, ConfigError> + Send + Sync + 'static,
    {
        self.entries.insert(name.to_string(), Arc::new(f));
    }

    /// A new registry with `name` added or replaced
    pub fn with<F>(&self, name: &str, f: F) -> Self
    where
        F: Fn(Value, Option<&Param>) -> Result<Value, ConfigError> + Send + Sync + 'static,
    {
        let mut derived = self.clone();
        derived.insert(name, f);
        derived
    }

    /// A new registry where `name` is replaced by `f`, which receives the
    /// current implementation so it can delegate to it.
    ///
    /// ```
    /// use sanitize::SanitizerRegistry;
    ///
    /// let registry = SanitizerRegistry::builtin()
    ///     .wrap("phone", |base, value, arg| {
    ///         let digits = base(value, arg)?;
    ///         Ok(digits)
    ///     })
    ///     .unwrap();
    /// assert!(registry.contains("phone"));
    /// ```
    pub fn wrap<F>(&self, name: &str, f: F) -> Result<Self, ConfigError>
    where
        F: Fn(&SanitizeFn, Value, Option<&Param>) -> Result<Value, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        let base = self
            .entries
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownType(name.to_string()))?;

        Ok(self.with(name, move |value, arg| f(&base, value, arg)))
    }

    pub fn get(&self, name: &str) -> Option<&SanitizeFn> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Sanitizers for SanitizerRegistry {
    fn apply(
        &self,
        canonical: &str,
        value: Value,
        arg: Option<&Param>,
    ) -> Option<Result<Value, ConfigError>> {
        self.get(canonical).map(|f| f(value, arg))
    }
}

impl fmt::Debug for SanitizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanitizerRegistry")
            .field("types", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_builtin_names() {
        let registry = SanitizerRegistry::builtin();
        let expected = vec![
            "array", "bool", "email", "float", "func", "integer", "json", "object", "oneOf",
            "phone", "pojo", "regex", "string", "url",
        ];
        assert_eq!(registry.names(), expected);
    }

    #[test]
    fn test_with_adds_without_touching_base() {
        let base = SanitizerRegistry::builtin();
        let custom = base.with("customType", |value, _| Ok(Value::String(format!("{}123456", value))));

        assert!(custom.contains("customType"));
        assert!(!base.contains("customType"));

        let result = custom.apply("customType", Value::from("abc"), None);
        assert_eq!(result, Some(Ok(Value::from("abc123456"))));
        assert!(base.apply("customType", Value::from("abc"), None).is_none());
    }

    #[test]
    fn test_wrap_delegates_to_base() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let registry = SanitizerRegistry::builtin()
            .wrap("integer", move |base, value, arg| {
                seen.fetch_add(1, Ordering::SeqCst);
                base(value, arg)
            })
            .unwrap();

        let result = registry.apply("integer", Value::from("42"), None);
        assert_eq!(result, Some(Ok(Value::Number(42.0))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wrap_unknown_type() {
        let result = SanitizerRegistry::builtin().wrap("nope", |base, value, arg| base(value, arg));
        assert!(matches!(result, Err(ConfigError::UnknownType(name)) if name == "nope"));
    }
}
