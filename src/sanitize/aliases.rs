//! Alias resolution: short or alternate type names -> canonical names.
//!
//! Tables are immutable. Extending one builds a new table that is the union
//! of the base entries and the new ones, so a table shared by several
//! engines never changes underneath them.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::error::ConfigError;

/// Anything that can map a type name onto a canonical sanitizer name.
///
/// Lookup is a single hop: the returned name is never looked up again.
/// Unknown names come back unchanged so the sanitizer registry can reject
/// them.
pub trait Aliases: Send + Sync {
    fn lookup<'a>(&'a self, name: &'a str) -> &'a str;
}

pub const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("b", "bool"),
    ("bool", "bool"),
    ("boolean", "bool"),
    ("f", "float"),
    ("flo", "float"),
    ("float", "float"),
    ("number", "float"),
    ("i", "integer"),
    ("int", "integer"),
    ("integer", "integer"),
    ("phone", "phone"),
    ("tel", "phone"),
    ("email", "email"),
    ("mail", "email"),
    ("url", "url"),
    ("uri", "url"),
    ("re", "regex"),
    ("regex", "regex"),
    ("pattern", "regex"),
    ("fun", "func"),
    ("func", "func"),
    ("function", "func"),
    ("str", "string"),
    ("string", "string"),
    ("json", "json"),
    ("arr", "array"),
    ("array", "array"),
    ("list", "array"),
    ("obj", "object"),
    ("object", "object"),
    ("pojo", "pojo"),
    ("plain", "pojo"),
    ("one_of", "oneOf"),
    ("oneOf", "oneOf"),
    ("enum", "oneOf"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    /// A table with no entries: every name resolves to itself
    pub fn empty() -> Self {
        Self::default()
    }

    /// The stock table covering every built-in sanitizer
    pub fn builtin() -> Self {
        Self::empty().extend(BUILTIN_ALIASES.iter().copied())
    }

    /// Returns a new table holding this table's entries plus `extra`.
    /// Later entries win over earlier ones for the same alias.
    pub fn extend<I, K, V>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = self.entries.clone();
        entries.extend(extra.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self { entries }
    }

    /// Reads extra entries from a YAML mapping of `alias: canonical`.
    ///
    /// ```yaml
    /// inty: integer
    /// cash: float
    /// ```
    pub fn parse_yaml(source: &str) -> Result<BTreeMap<String, String>, ConfigError> {
        if source.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let entries: BTreeMap<String, String> = serde_yaml::from_str(source)
            .map_err(|e| ConfigError::InvalidAliases(e.to_string()))?;

        if let Some((alias, _)) = entries.iter().find(|(k, v)| k.is_empty() || v.is_empty()) {
            return Err(ConfigError::InvalidAliases(format!(
                "empty alias or target near {:?}",
                alias
            )));
        }

        debug!("Read {} alias entries", entries.len());
        Ok(entries)
    }

    /// The built-in table extended with the entries of a YAML document
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(Self::builtin().extend(Self::parse_yaml(source)?))
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries.get(alias).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Aliases for AliasTable {
    fn lookup<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_aliases() {
        let table = AliasTable::builtin();
        let cases = vec![
            ("b", "bool"),
            ("i", "integer"),
            ("int", "integer"),
            ("flo", "float"),
            ("re", "regex"),
            ("function", "func"),
            ("str", "string"),
            ("obj", "object"),
            ("enum", "oneOf"),
        ];

        for (alias, canonical) in cases {
            assert_eq!(table.lookup(alias), canonical, "Wrong resolution for {}", alias);
        }
    }

    #[test]
    fn test_every_canonical_name_resolves_to_itself() {
        let table = AliasTable::builtin();
        for (_, canonical) in table.iter() {
            assert_eq!(table.lookup(canonical), canonical);
        }
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let table = AliasTable::builtin();
        assert_eq!(table.lookup("intyy"), "intyy");
        assert_eq!(table.lookup(""), "");
    }

    #[test]
    fn test_lookup_is_single_hop() {
        let table = AliasTable::empty().extend([("a", "b"), ("b", "integer")]);
        assert_eq!(table.lookup("a"), "b");
    }

    #[test]
    fn test_extend_leaves_base_untouched() {
        let base = AliasTable::builtin();
        let custom = base.extend([("inty", "integer"), ("i", "float")]);

        assert_eq!(custom.lookup("inty"), "integer");
        assert_eq!(custom.lookup("i"), "float");
        assert_eq!(base.lookup("inty"), "inty");
        assert_eq!(base.lookup("i"), "integer");
        assert_eq!(custom.len(), base.len() + 1);
    }

    #[test]
    fn test_yaml_aliases() {
        let table = AliasTable::from_yaml_str("inty: integer\ncash: float\n").unwrap();
        assert_eq!(table.lookup("inty"), "integer");
        assert_eq!(table.lookup("cash"), "float");
        assert_eq!(table.lookup("b"), "bool");

        assert_eq!(AliasTable::from_yaml_str("  ").unwrap(), AliasTable::builtin());
    }

    #[test]
    fn test_malformed_yaml_aliases() {
        let invalid = vec!["- just\n- a list\n", "inty: [integer]\n", "\"\": integer\n"];

        for source in invalid {
            let result = AliasTable::from_yaml_str(source);
            assert!(
                matches!(result, Err(ConfigError::InvalidAliases(_))),
                "Should reject alias file: {:?}",
                source
            );
        }
    }
}
