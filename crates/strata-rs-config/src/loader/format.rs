//! Format selection and parsing of layer text into flat entries.

use super::properties::parse_properties;
use crate::{ConfigError, ConfigMap, ConfigValue};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::path::Path;

/// Structured format used for bundled resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    Json,
    #[default]
    Yaml,
}

impl ConfigFormat {
    /// Extension (with leading dot) appended to bundled layer names.
    pub fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Json => ".json",
            ConfigFormat::Yaml => ".yaml",
        }
    }

    /// Parse structured layer text in this format.
    pub fn parse(self, contents: &str) -> Result<ConfigMap, ConfigError> {
        match self {
            ConfigFormat::Json => parse_json(contents),
            ConfigFormat::Yaml => parse_yaml(contents),
        }
    }
}

/// Parser selected for an external file from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FileFormat {
    Properties,
    Structured(ConfigFormat),
}

impl FileFormat {
    /// Dispatch on the file name suffix; unknown suffixes are not loaded.
    pub(super) fn from_path(path: &Path) -> Option<Self> {
        let name = path.to_string_lossy();
        if name.ends_with("properties") {
            Some(FileFormat::Properties)
        } else if name.ends_with("json") {
            Some(FileFormat::Structured(ConfigFormat::Json))
        } else if name.ends_with("yaml") {
            Some(FileFormat::Structured(ConfigFormat::Yaml))
        } else {
            None
        }
    }

    pub(super) fn parse(self, contents: &str) -> Result<ConfigMap, ConfigError> {
        match self {
            FileFormat::Properties => parse_properties(contents),
            FileFormat::Structured(format) => format.parse(contents),
        }
    }
}

/// Bundled resources are YAML when named so, JSON otherwise.
pub(super) fn resource_format(name: &str) -> ConfigFormat {
    if name.ends_with("yaml") {
        ConfigFormat::Yaml
    } else {
        ConfigFormat::Json
    }
}

/// Parse JSON text. JSON5 syntax (comments, trailing commas) is accepted.
pub(super) fn parse_json(contents: &str) -> Result<ConfigMap, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(ConfigMap::new());
    }
    let value: JsonValue = json5::from_str(contents)?;
    match ConfigValue::from_json(value) {
        Some(ConfigValue::Object(map)) => Ok(map),
        None => Ok(ConfigMap::new()),
        Some(other) => Err(ConfigError::Invalid(format!(
            "layer root must be an object, found {}",
            other.kind()
        ))),
    }
}

pub(super) fn parse_yaml(contents: &str) -> Result<ConfigMap, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(ConfigMap::new());
    }
    let value: YamlValue = serde_yaml::from_str(contents)?;
    match ConfigValue::from_yaml(value) {
        Some(ConfigValue::Object(map)) => Ok(map),
        None => Ok(ConfigMap::new()),
        Some(other) => Err(ConfigError::Invalid(format!(
            "layer root must be a mapping, found {}",
            other.kind()
        ))),
    }
}
