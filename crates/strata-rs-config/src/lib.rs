//! Layered configuration resolver.
//!
//! Loads config fragments from an external file, the environment, an inline
//! override and named bundled resources, merges them in a fixed precedence
//! order, resolves `config~key` references between values and serves typed,
//! obfuscation-aware accessors.

mod bootstrap;
mod error;
mod loader;
pub mod obfuscate;
mod provider;
pub mod reference;
mod resources;
mod store;
mod value;

/// Bootstrap sequence, options, hooks and well-known keys.
pub use bootstrap::{
    APP_CONFIG_KEY, APP_ENV_KEY, APP_INIT_KEY, BootstrapOptions, CONFIG_ENV_VARS_VAR,
    CONFIG_FILE_VAR, ConfigHook, DEFAULT_LAYER, LoadedConfig, apply_hooks, load, load_layers,
};
/// Public error type returned by loading and typed access.
pub use error::ConfigError;
/// Layer loading types.
pub use loader::{
    BUNDLED_NAMESPACE, ConfigFormat, IMPORT_KEY, LayerLoader, LayerRecord, LayerSource,
    bundled_resource_name,
};
/// Obfuscation helpers.
pub use obfuscate::{OBFUSCATION_PREFIX, deobfuscate, obfuscate};
/// Shared, lazily bootstrapped config handle.
pub use provider::{ConfigProvider, ReadyGate};
/// Resource access collaborators.
pub use resources::{ChainResources, DirResources, ResourceProvider, StaticResources};
/// Merged config store.
pub use store::ConfigStore;
/// Config value model.
pub use value::{ConfigMap, ConfigValue};
