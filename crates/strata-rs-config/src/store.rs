//! Merged key/value state with typed, obfuscation-aware accessors.

use crate::obfuscate::{deobfuscate, is_obfuscated};
use crate::{ConfigError, ConfigMap, ConfigValue};
use indexmap::IndexMap;
use log::warn;

/// Flat mapping of config keys to values, in first-insertion order.
///
/// Populated by layer merges during bootstrap; readers treat it as immutable
/// once the readiness gate opens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    entries: ConfigMap,
}

impl ConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the key has a value.
    pub fn is_set(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Raw value for a key, without any coercion.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Set a value; the last writer wins.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(key.into(), ConfigValue::String(value.into()));
    }

    /// Remove a key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.shift_remove(key)
    }

    /// Merge every entry of `entries` without reference resolution.
    pub fn extend(&mut self, entries: ConfigMap) {
        self.entries.extend(entries);
    }

    /// Stored string exactly as written, still obfuscated if marked.
    pub fn get_raw_string(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(ConfigValue::as_str)
    }

    /// String value for a key, deobfuscated when it carries the `OBF:` marker.
    ///
    /// Non-string values are not coerced and yield `None`.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_raw_string(key)
            .map(|value| reveal(key, value))
    }

    /// String value for a key, or `default` when unset.
    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        let value = self.get_raw_string(key).unwrap_or(default);
        reveal(key, value)
    }

    /// Integer value for a key, parsing string values as base-10.
    ///
    /// A string that does not parse is an error rather than `None`.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        match self.entries.get(key) {
            Some(ConfigValue::Integer(value)) => Ok(Some(*value)),
            Some(ConfigValue::String(value)) => parse_int(key, value).map(Some),
            _ => Ok(None),
        }
    }

    /// Integer value for a key, or `default` when unset or not numeric-typed.
    pub fn get_int_or(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        Ok(self.get_int(key)?.unwrap_or(default))
    }

    /// Numeric value for a key. Strings are not parsed.
    pub fn get_double(&self, key: &str) -> Option<f64> {
        match self.entries.get(key) {
            Some(ConfigValue::Double(value)) => Some(*value),
            Some(ConfigValue::Integer(value)) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn get_double_or(&self, key: &str, default: f64) -> f64 {
        self.get_double(key).unwrap_or(default)
    }

    /// Boolean value for a key. Strings are not parsed.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.entries.get(key) {
            Some(ConfigValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    pub fn get_string_array(&self, key: &str) -> Option<&[String]> {
        match self.entries.get(key) {
            Some(ConfigValue::StringArray(values)) => Some(values),
            _ => None,
        }
    }

    pub fn get_object(&self, key: &str) -> Option<&ConfigMap> {
        match self.entries.get(key) {
            Some(ConfigValue::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Snapshot of every string entry, deobfuscated where marked.
    pub fn get_all_strings(&self) -> IndexMap<String, String> {
        self.entries
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_str()
                    .map(|value| (key.clone(), reveal(key, value)))
            })
            .collect()
    }
}

/// Deobfuscate a marked value. Malformed payloads are returned as stored.
fn reveal(key: &str, value: &str) -> String {
    if !is_obfuscated(value) {
        return value.to_string();
    }
    match deobfuscate(value) {
        Ok(plain) => plain,
        Err(err) => {
            warn!("returning malformed obfuscated value as stored (key={key}): {err}");
            value.to_string()
        }
    }
}

fn parse_int(key: &str, value: &str) -> Result<i64, ConfigError> {
    value
        .parse::<i64>()
        .map_err(|source| ConfigError::Coercion {
            key: key.to_string(),
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obfuscate::obfuscate;
    use pretty_assertions::assert_eq;

    fn store() -> ConfigStore {
        let mut store = ConfigStore::new();
        store.put("name", "strata");
        store.put("port", 8080_i64);
        store.put("workers", "5");
        store.put("broken", "abc");
        store.put("ratio", 0.75);
        store.put("debug", true);
        store.put("password", obfuscate("password123"));
        store.put("hosts", vec!["a".to_string(), "b".to_string()]);
        store
    }

    #[test]
    fn string_getter_reveals_obfuscated_values() {
        let store = store();
        assert_eq!(store.get_string("password").as_deref(), Some("password123"));
        assert!(store.get_raw_string("password").expect("raw").starts_with("OBF:"));
    }

    #[test]
    fn string_getter_does_not_coerce() {
        let store = store();
        assert_eq!(store.get_string("port"), None);
        assert_eq!(store.get_string_or("missing", "fallback"), "fallback");
        assert_eq!(store.get_string_or("name", "fallback"), "strata");
    }

    #[test]
    fn obfuscated_default_is_revealed() {
        let store = store();
        let default = obfuscate("hunter2");
        assert_eq!(store.get_string_or("missing", &default), "hunter2");
    }

    #[test]
    fn int_getter_parses_strings() {
        let store = store();
        assert_eq!(store.get_int("port").expect("int"), Some(8080));
        assert_eq!(store.get_int("workers").expect("int"), Some(5));
        assert_eq!(store.get_int("debug").expect("int"), None);
        assert_eq!(store.get_int("missing").expect("int"), None);
        assert_eq!(store.get_int_or("missing", 3).expect("int"), 3);
        assert_eq!(store.get_int_or("ratio", 3).expect("int"), 3);
    }

    #[test]
    fn int_getter_propagates_coercion_errors() {
        let store = store();
        let err = store.get_int("broken").unwrap_err();
        assert!(matches!(err, ConfigError::Coercion { ref key, .. } if key == "broken"));
        assert!(store.get_int_or("broken", 1).is_err());
    }

    #[test]
    fn numeric_and_bool_getters() {
        let store = store();
        assert_eq!(store.get_double("ratio"), Some(0.75));
        assert_eq!(store.get_double("port"), Some(8080.0));
        assert_eq!(store.get_double("workers"), None);
        assert_eq!(store.get_bool("debug"), Some(true));
        assert!(!store.get_bool_or("name", false));
    }

    #[test]
    fn all_strings_snapshot_only_holds_strings() {
        let store = store();
        let all = store.get_all_strings();
        assert_eq!(all.get("password").map(String::as_str), Some("password123"));
        assert_eq!(all.get("name").map(String::as_str), Some("strata"));
        assert!(!all.contains_key("port"));
        assert!(!all.contains_key("hosts"));
    }

    #[test]
    fn last_writer_wins() {
        let mut store = store();
        store.put("name", "override");
        assert_eq!(store.get_string("name").as_deref(), Some("override"));
        assert_eq!(store.keys().next(), Some("name"));
    }
}
