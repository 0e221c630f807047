//! Public SDK surface for Strata.
//!
//! This crate re-exports the config resolver and provides a small
//! initialization helper to keep consumer setup consistent.

/// Re-export for convenience.
pub use strata_rs_config as config;
pub use strata_rs_config::{
    BootstrapOptions, ConfigError, ConfigFormat, ConfigHook, ConfigProvider, ConfigStore,
    ConfigValue, DirResources, ResourceProvider, StaticResources, deobfuscate, obfuscate,
};

use log::debug;
use std::sync::Arc;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}

/// Build a provider over bundled resources with options from the environment.
///
/// Nothing is loaded until the first read.
pub fn provider_from_env(resources: impl ResourceProvider + 'static) -> ConfigProvider {
    let options = BootstrapOptions::from_env();
    debug!("creating config provider (options={options:?})");
    ConfigProvider::new(options, Arc::new(resources))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strata_rs_test_utils::sample_resources;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }

    #[test]
    fn provider_from_env_reads_bundled_defaults() {
        let provider = provider_from_env(sample_resources());
        assert!(!provider.is_ready());
        assert_eq!(provider.get_string("testing").as_deref(), Some("this"));
        assert_eq!(provider.get_bool("app"), Some(true));
    }
}
