//! Error types for config loading and typed access.

use std::num::ParseIntError;
use thiserror::Error;

/// Errors returned while loading layers or reading typed values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file or resource failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing JSON (or inline) config text failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Parsing YAML config text failed.
    #[error("failed to parse yaml config: {0}")]
    YamlFailed(#[from] serde_yaml::Error),
    /// A `.properties` line could not be decoded.
    #[error("invalid properties at line {line}: {message}")]
    Properties { line: usize, message: String },
    /// A string value could not be coerced to the requested type.
    #[error("config key {key} is not an integer ({value:?}): {source}")]
    Coercion {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
    /// An obfuscated value is malformed.
    #[error("invalid obfuscated value: {0}")]
    Obfuscation(String),
    /// Generic invalid layer content.
    #[error("invalid config: {0}")]
    Invalid(String),
}
