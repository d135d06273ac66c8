//! The dispatcher and the two aggregate validators.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, trace, warn};

use super::aliases::{AliasTable, Aliases};
use super::error::ConfigError;
use super::registry::{SanitizerRegistry, Sanitizers};
use super::type_spec::{FieldMap, TypeSpec};
use super::value::{Map, Value};

/// Fields whose sanitized value came out `null`, for batch reporting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, bool>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `field` as invalid
    pub fn flag(&mut self, field: &str) {
        self.0.insert(field.to_string(), true);
    }

    pub fn is_flagged(&self, field: &str) -> bool {
        self.0.get(field).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of flagged fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Flagged field names, sorted
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(name, _)| name.as_str())
    }
}

/// The sanitizing engine: an alias table and a sanitizer registry.
///
/// Both are shared behind `Arc` and never mutated, so a `Sanitizer` is cheap
/// to clone and safe to use from any number of threads.
#[derive(Clone)]
pub struct Sanitizer {
    aliases: Arc<dyn Aliases>,
    sanitizers: Arc<dyn Sanitizers>,
}

impl Sanitizer {
    /// Built-in aliases and sanitizers
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(AliasTable::builtin()),
            Arc::new(SanitizerRegistry::builtin()),
        )
    }

    /// Built-in sanitizers resolved through a custom alias table
    pub fn with_aliases(aliases: impl Aliases + 'static) -> Self {
        Self::with_parts(Arc::new(aliases), Arc::new(SanitizerRegistry::builtin()))
    }

    /// Custom sanitizers behind the built-in alias table
    pub fn with_sanitizers(sanitizers: impl Sanitizers + 'static) -> Self {
        Self::with_parts(Arc::new(AliasTable::builtin()), Arc::new(sanitizers))
    }

    /// Any alias table with any set of sanitizers
    pub fn with_parts(aliases: Arc<dyn Aliases>, sanitizers: Arc<dyn Sanitizers>) -> Self {
        Self {
            aliases,
            sanitizers,
        }
    }

    /// Sanitizes one value.
    ///
    /// `Undefined` comes back as `Undefined` without running anything.
    /// Strings are trimmed first. The type spec's name goes through the alias
    /// table once, then the matching sanitizer runs with its argument.
    ///
    /// ```
    /// use sanitize::{Sanitizer, TypeSpec, Value};
    ///
    /// let sanitizer = Sanitizer::new();
    /// let price = sanitizer.value(" 1.123456 ", &TypeSpec::from(("float", 2))).unwrap();
    /// assert_eq!(price, Value::Number(1.12));
    /// ```
    pub fn value(&self, value: impl Into<Value>, spec: &TypeSpec) -> Result<Value, ConfigError> {
        let value = value.into();
        if value.is_undefined() {
            return Ok(Value::Undefined);
        }

        let value = match value {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.len() == s.len() {
                    Value::String(s)
                } else {
                    Value::String(trimmed.to_string())
                }
            }
            other => other,
        };

        let (name, arg) = spec.resolve();
        let canonical = self.aliases.lookup(name);
        trace!("sanitizing {} as {}", value.kind(), canonical);

        match self.sanitizers.apply(canonical, value, arg.as_ref()) {
            Some(result) => result,
            None => {
                warn!("No sanitizer registered for type {:?}", canonical);
                Err(ConfigError::UnknownType(canonical.to_string()))
            }
        }
    }

    /// Sanitizes every field of `fields` from `record`.
    ///
    /// The result has exactly the keys of `fields`; fields missing from the
    /// record come out `Undefined` and extra record fields are dropped.
    /// Every field is evaluated. When `errors` is given, each field whose
    /// result is exactly `Null` is flagged there. A NaN number is *not*
    /// flagged, unlike in [`array`](Self::array).
    pub fn object(
        &self,
        record: &Map,
        fields: &FieldMap,
        mut errors: Option<&mut FieldErrors>,
    ) -> Result<Map, ConfigError> {
        let mut result = Map::new();

        for (name, spec) in fields.iter() {
            let raw = record.get(name).cloned().unwrap_or_default();
            let sanitized = self.value(raw, spec)?;

            if sanitized.is_null() {
                if let Some(errors) = errors.as_deref_mut() {
                    errors.flag(name);
                }
            }
            result.insert(name.to_string(), sanitized);
        }

        debug!("sanitized object with {} fields", result.len());
        Ok(result)
    }

    /// Sanitizes every element with the same spec, all or nothing.
    ///
    /// A non-array input is treated as a one-element array. Every element is
    /// evaluated; if any comes out `Undefined`, `Null` or NaN the whole
    /// result is `Null`.
    pub fn array(&self, values: impl Into<Value>, spec: &TypeSpec) -> Result<Value, ConfigError> {
        let items = match values.into() {
            Value::Array(items) => items,
            single => vec![single],
        };

        let mut invalid = false;
        let mut sanitized = Vec::with_capacity(items.len());
        for item in items {
            let value = self.value(item, spec)?;
            invalid |= value.is_undefined() || value.is_null() || value.is_nan();
            sanitized.push(value);
        }

        if invalid {
            debug!("array rejected for {}", spec);
            Ok(Value::Null)
        } else {
            Ok(Value::Array(sanitized))
        }
    }

    /// Keeps the primitive fields of a record: strings and numbers as they
    /// are, booleans as `1`/`0`. Everything else is dropped.
    pub fn primitives(&self, record: &Map) -> Map {
        record
            .iter()
            .filter_map(|(name, value)| {
                let kept = match value {
                    Value::String(_) | Value::Number(_) => value.clone(),
                    Value::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
                    _ => return None,
                };
                Some((name.clone(), kept))
            })
            .collect()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sanitizer").finish_non_exhaustive()
    }
}
