//! Type coercion and sanitization of untrusted input.
//!
//! A [`Sanitizer`] resolves a [`TypeSpec`] through its alias table to a
//! canonical type name and runs the sanitizer registered under it. Hard
//! failures (a misconfigured type) are [`ConfigError`]s; a value that fails
//! validation is a soft failure and comes back as [`Value::Null`] or NaN.

mod aliases;
mod engine;
mod error;
mod registry;
mod type_spec;
pub mod types;
mod value;

use once_cell::sync::Lazy;

pub use aliases::{AliasTable, Aliases, BUILTIN_ALIASES};
pub use engine::{FieldErrors, Sanitizer};
pub use error::ConfigError;
pub use registry::{SanitizeFn, SanitizerRegistry, Sanitizers};
pub use type_spec::{FieldMap, Param, Predicate, TypeSpec};
pub use value::{Map, Value};

static DEFAULT_SANITIZER: Lazy<Sanitizer> = Lazy::new(Sanitizer::new);

/// Process-wide engine with the built-in aliases and sanitizers
pub fn default_sanitizer() -> &'static Sanitizer {
    &DEFAULT_SANITIZER
}
