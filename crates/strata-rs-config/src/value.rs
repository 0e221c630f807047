//! Typed config values produced by the layer parsers.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

/// Ordered mapping of keys to config values, in parser order.
pub type ConfigMap = IndexMap<String, ConfigValue>;

/// A single config leaf (or nested object) held by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// Text, possibly `OBF:`-obfuscated.
    String(String),
    /// Whole number from a document or a parsed string.
    Integer(i64),
    Double(f64),
    Boolean(bool),
    /// Array elements kept as text; scalars are rendered as JSON.
    StringArray(Vec<String>),
    /// Nested mapping, kept as-is rather than flattened.
    Object(ConfigMap),
}

impl ConfigValue {
    /// Short name of the value kind, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::String(_) => "string",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Double(_) => "double",
            ConfigValue::Boolean(_) => "boolean",
            ConfigValue::StringArray(_) => "string-array",
            ConfigValue::Object(_) => "object",
        }
    }

    /// Borrow the string payload when this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Convert a parsed JSON value. `null` has no representation and yields `None`.
    pub(crate) fn from_json(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => None,
            JsonValue::Bool(value) => Some(ConfigValue::Boolean(value)),
            JsonValue::Number(number) => number
                .as_i64()
                .map(ConfigValue::Integer)
                .or_else(|| number.as_f64().map(ConfigValue::Double)),
            JsonValue::String(value) => Some(ConfigValue::String(value)),
            JsonValue::Array(items) => Some(ConfigValue::StringArray(
                items.into_iter().filter_map(json_item_text).collect(),
            )),
            JsonValue::Object(map) => Some(ConfigValue::Object(
                map.into_iter()
                    .filter_map(|(key, value)| Self::from_json(value).map(|value| (key, value)))
                    .collect(),
            )),
        }
    }

    /// Convert a parsed YAML value. Tags are dropped; `~` yields `None`.
    pub(crate) fn from_yaml(value: YamlValue) -> Option<Self> {
        match value {
            YamlValue::Null => None,
            YamlValue::Bool(value) => Some(ConfigValue::Boolean(value)),
            YamlValue::Number(number) => number
                .as_i64()
                .map(ConfigValue::Integer)
                .or_else(|| number.as_f64().map(ConfigValue::Double)),
            YamlValue::String(value) => Some(ConfigValue::String(value)),
            YamlValue::Sequence(items) => Some(ConfigValue::StringArray(
                items.into_iter().filter_map(yaml_item_text).collect(),
            )),
            YamlValue::Mapping(mapping) => Some(ConfigValue::Object(
                mapping
                    .into_iter()
                    .filter_map(|(key, value)| {
                        let key = yaml_key(key)?;
                        Self::from_yaml(value).map(|value| (key, value))
                    })
                    .collect(),
            )),
            YamlValue::Tagged(tagged) => Self::from_yaml(tagged.value),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Double(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Boolean(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        ConfigValue::StringArray(value)
    }
}

/// Array elements are kept as text; non-string elements use their JSON rendering.
fn json_item_text(item: JsonValue) -> Option<String> {
    match item {
        JsonValue::Null => None,
        JsonValue::String(value) => Some(value),
        other => Some(other.to_string()),
    }
}

fn yaml_item_text(item: YamlValue) -> Option<String> {
    match item {
        YamlValue::Null => None,
        YamlValue::String(value) => Some(value),
        YamlValue::Bool(value) => Some(value.to_string()),
        YamlValue::Number(number) => Some(number.to_string()),
        YamlValue::Tagged(tagged) => yaml_item_text(tagged.value),
        other => serde_json::to_string(&other).ok(),
    }
}

/// Only scalar YAML keys become config keys.
fn yaml_key(key: YamlValue) -> Option<String> {
    match key {
        YamlValue::String(value) => Some(value),
        YamlValue::Bool(value) => Some(value.to_string()),
        YamlValue::Number(number) => Some(number.to_string()),
        YamlValue::Tagged(tagged) => yaml_key(tagged.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn json_numbers_split_into_integer_and_double() {
        assert_eq!(
            ConfigValue::from_json(json!(5)),
            Some(ConfigValue::Integer(5))
        );
        assert_eq!(
            ConfigValue::from_json(json!(2.5)),
            Some(ConfigValue::Double(2.5))
        );
    }

    #[test]
    fn json_arrays_become_string_arrays() {
        let value = ConfigValue::from_json(json!(["a", 1, true, null])).expect("value");
        assert_eq!(
            value,
            ConfigValue::StringArray(vec!["a".into(), "1".into(), "true".into()])
        );
    }

    #[test]
    fn yaml_nested_mapping_keeps_order() {
        let yaml: YamlValue = serde_yaml::from_str("db:\n  user: app\n  port: 5432\n  pool: ~\n")
            .expect("yaml");
        let ConfigValue::Object(root) = ConfigValue::from_yaml(yaml).expect("value") else {
            panic!("expected object");
        };
        let ConfigValue::Object(db) = &root["db"] else {
            panic!("expected nested object");
        };
        let keys: Vec<&str> = db.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["user", "port"]);
        assert_eq!(db["port"], ConfigValue::Integer(5432));
    }
}
