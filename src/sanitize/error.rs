//! Hard configuration failures.
//!
//! A `ConfigError` means the *schema* handed to the engine is wrong (unknown
//! type, a `regex` spec without a pattern, ...). Bad user input never ends up
//! here: it is reported in-band as `Value::Null` or a NaN number.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No sanitizer is registered under the resolved canonical name
    #[error("{0} is not a valid sanitizer type")]
    UnknownType(String),

    /// The `regex` sanitizer was called without a usable pattern
    #[error("Invalid regex given: {0}")]
    InvalidPattern(String),

    /// The `func` sanitizer was called without a predicate
    #[error("Invalid function: {0}")]
    InvalidPredicate(String),

    /// A declarative type spec uses none of the recognised encodings
    #[error("Invalid type: {0}")]
    InvalidTypeSpec(String),

    /// An alias table could not be read into name -> name entries
    #[error("Invalid aliases: {0}")]
    InvalidAliases(String),
}
