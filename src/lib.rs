//! Sanitization and type coercion of untrusted input, with an axum binder
//! exposing typed accessors over request headers, query, body and path.

pub mod backend;
pub mod config;
pub mod consts;
pub mod sanitize;

pub use sanitize::{
    default_sanitizer, AliasTable, Aliases, ConfigError, FieldErrors, FieldMap, Map, Param,
    Predicate, SanitizeFn, Sanitizer, SanitizerRegistry, Sanitizers, TypeSpec, Value,
};
