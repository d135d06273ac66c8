//! Runtime configuration read from the environment.
//!
//! `SANITIZE_PORT` and `SANITIZE_MAX_BODY_BYTES` override the defaults of
//! [`consts`](crate::consts). `SANITIZE_ALIASES` names a YAML file of extra
//! `alias: canonical` entries merged over the built-in alias table.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use crate::consts::{HTTP_PORT, MAX_BODY_BYTES};
use crate::sanitize::{AliasTable, Sanitizer, SanitizerRegistry};

pub const PORT_VAR: &str = "SANITIZE_PORT";
pub const MAX_BODY_VAR: &str = "SANITIZE_MAX_BODY_BYTES";
pub const ALIASES_VAR: &str = "SANITIZE_ALIASES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub max_body_bytes: usize,
    pub aliases_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: HTTP_PORT,
            max_body_bytes: MAX_BODY_BYTES,
            aliases_path: None,
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv().ok()` first to pick up
    /// a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(port) = lookup(PORT_VAR) {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} is not a valid port: {:?}", PORT_VAR, port))?;
        }

        if let Some(limit) = lookup(MAX_BODY_VAR) {
            config.max_body_bytes = limit
                .trim()
                .parse()
                .with_context(|| format!("{} is not a byte count: {:?}", MAX_BODY_VAR, limit))?;
        }

        config.aliases_path = lookup(ALIASES_VAR)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// The alias table: built-in entries plus the configured YAML file, if any
    pub fn alias_table(&self) -> Result<AliasTable> {
        let Some(path) = &self.aliases_path else {
            return Ok(AliasTable::builtin());
        };

        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read alias file {}", path.display()))?;
        let table = AliasTable::from_yaml_str(&source)
            .with_context(|| format!("Could not load alias file {}", path.display()))?;

        info!("Loaded {} aliases from {}", table.len(), path.display());
        Ok(table)
    }

    /// An engine using the configured aliases and the built-in sanitizers
    pub fn build_sanitizer(&self) -> Result<Sanitizer> {
        Ok(Sanitizer::with_parts(
            Arc::new(self.alias_table()?),
            Arc::new(SanitizerRegistry::builtin()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::{TypeSpec, Value};
    use std::collections::HashMap;

    fn lookup_from(pairs: Vec<(&str, &str)>) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(vec![])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, HTTP_PORT);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(vec![
            (PORT_VAR, "3000"),
            (MAX_BODY_VAR, " 2048 "),
            (ALIASES_VAR, "aliases.yaml"),
        ]))
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.max_body_bytes, 2048);
        assert_eq!(config.aliases_path, Some(PathBuf::from("aliases.yaml")));
    }

    #[test]
    fn test_invalid_values() {
        let invalid = vec![
            (PORT_VAR, "http"),
            (PORT_VAR, "70000"),
            (MAX_BODY_VAR, "-1"),
        ];

        for (key, value) in invalid {
            assert!(
                Config::from_lookup(lookup_from(vec![(key, value)])).is_err(),
                "Should reject {}={}",
                key,
                value
            );
        }
    }

    #[test]
    fn test_alias_file() {
        let path = write_temp("aliases.yaml", "inty: integer\ncash: float\n");
        let config = Config {
            aliases_path: Some(path.clone()),
            ..Config::default()
        };

        let sanitizer = config.build_sanitizer().unwrap();
        assert_eq!(sanitizer.value("12", &TypeSpec::from("inty")), Ok(Value::Number(12.0)));
        assert_eq!(sanitizer.value("1.5", &TypeSpec::from("cash")), Ok(Value::Number(1.5)));
        assert_eq!(sanitizer.value("1", &TypeSpec::from("int")), Ok(Value::Number(1.0)));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_bad_alias_file() {
        let missing = Config {
            aliases_path: Some(PathBuf::from("/nonexistent/aliases.yaml")),
            ..Config::default()
        };
        assert!(missing.build_sanitizer().is_err());

        let path = write_temp("bad-aliases.yaml", "- not\n- a mapping\n");
        let malformed = Config {
            aliases_path: Some(path.clone()),
            ..Config::default()
        };
        let error = malformed.alias_table().unwrap_err();
        assert!(error.to_string().contains("Could not load alias file"));

        std::fs::remove_file(path).ok();
    }
}
