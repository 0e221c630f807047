//! Fixed-order layer sequence that builds the store at startup.
//!
//! Order (low -> high precedence): external file, environment variables,
//! inline `APP_CONFIG` override, bundled `default`, then the bundled profile
//! named by `APP_INIT` or, failing that, `APP_ENV`. Extension hooks run last.

use crate::loader::{ConfigFormat, LayerLoader, LayerRecord};
use crate::{ConfigStore, ResourceProvider};
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable naming an external config file to load first.
pub const CONFIG_FILE_VAR: &str = "CONFIG_FILE";
/// Environment variable that, when present, disables the environment layer.
pub const CONFIG_ENV_VARS_VAR: &str = "CONFIG_ENV_VARS";
/// Store key holding inline JSON config text.
pub const APP_CONFIG_KEY: &str = "APP_CONFIG";
/// Store key naming the init profile layer.
pub const APP_INIT_KEY: &str = "APP_INIT";
/// Store key naming the environment profile layer.
pub const APP_ENV_KEY: &str = "APP_ENV";
/// Bundled layer that is always loaded.
pub const DEFAULT_LAYER: &str = "default";

/// Extension point run once, in registration order, after the store is ready.
///
/// Under [`ConfigProvider`](crate::ConfigProvider) each hook receives a copy of
/// the store that replaces the shared one when `configure` returns, so a hook
/// may read through the provider without deadlocking. Such reads do not see
/// the hook's own uncommitted writes.
pub trait ConfigHook: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str {
        "config-hook"
    }

    /// Inspect or extend the ready store (e.g. derive computed keys).
    fn configure(&self, store: &mut ConfigStore);
}

/// Options controlling which layers bootstrap loads.
#[derive(Clone, Default)]
pub struct BootstrapOptions {
    /// External file loaded before every other layer, if it exists.
    pub config_file: Option<PathBuf>,
    /// Whether to load the environment-variable layer.
    pub load_env_vars: bool,
    /// Environment snapshot to load instead of the process environment.
    pub env_vars: Option<Vec<(String, String)>>,
    /// Format of bundled resources.
    pub format: ConfigFormat,
    /// Hooks run after readiness, in order.
    pub hooks: Vec<Arc<dyn ConfigHook>>,
}

impl fmt::Debug for BootstrapOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapOptions")
            .field("config_file", &self.config_file)
            .field("load_env_vars", &self.load_env_vars)
            .field("env_vars", &self.env_vars.as_ref().map(Vec::len))
            .field("format", &self.format)
            .field(
                "hooks",
                &self.hooks.iter().map(|hook| hook.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl BootstrapOptions {
    /// Options with the environment layer enabled and no external file.
    pub fn new() -> Self {
        Self {
            load_env_vars: true,
            ..Self::default()
        }
    }

    /// Options driven by `CONFIG_FILE` and `CONFIG_ENV_VARS`.
    pub fn from_env() -> Self {
        let mut options = Self::new();
        options.config_file = std::env::var_os(CONFIG_FILE_VAR).map(PathBuf::from);
        options.load_env_vars = std::env::var_os(CONFIG_ENV_VARS_VAR).is_none();
        options
    }

    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Skip the environment-variable layer.
    pub fn without_env_vars(mut self) -> Self {
        self.load_env_vars = false;
        self
    }

    /// Load this snapshot as the environment layer instead of the process env.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.load_env_vars = true;
        self.env_vars = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn with_format(mut self, format: ConfigFormat) -> Self {
        self.format = format;
        self
    }

    /// Register a hook; hooks run in the order they are added.
    pub fn with_hook(mut self, hook: impl ConfigHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }
}

/// Store plus metadata about the layers that built it.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub store: ConfigStore,
    pub layers: Vec<LayerRecord>,
}

/// Run every layer step. Hooks are not invoked.
pub fn load_layers(options: &BootstrapOptions, resources: &dyn ResourceProvider) -> LoadedConfig {
    let mut store = ConfigStore::new();
    let mut loader = LayerLoader::new(&mut store, resources, options.format);

    match options.config_file.as_deref() {
        Some(path) => {
            info!("config file used: {}", path.display());
            loader.load_external_file(path);
        }
        None => debug!("no external config file configured"),
    }

    if options.load_env_vars {
        match &options.env_vars {
            Some(vars) => loader.load_env_vars(vars.iter().cloned()),
            None => loader.load_env_vars(std::env::vars()),
        };
    } else {
        debug!("environment layer disabled");
    }

    if let Some(inline) = loader.store().get_string(APP_CONFIG_KEY) {
        loader.load_inline(&inline);
    }

    loader.load_bundled(DEFAULT_LAYER);

    let profile = {
        let store = loader.store();
        if store.is_set(APP_INIT_KEY) {
            store.get_string(APP_INIT_KEY)
        } else if store.is_set(APP_ENV_KEY) {
            store.get_string(APP_ENV_KEY)
        } else {
            None
        }
    };
    match profile {
        Some(profile) => {
            loader.load_bundled(&profile);
        }
        None => debug!("no init or environment profile selected"),
    }

    let layers = loader.into_records();
    info!(
        "config layers loaded (layers={}, keys={})",
        layers.len(),
        store.len()
    );
    LoadedConfig { store, layers }
}

/// Run hooks against the store, in order.
pub fn apply_hooks(hooks: &[Arc<dyn ConfigHook>], store: &mut ConfigStore) {
    for hook in hooks {
        debug!("running config hook (name={})", hook.name());
        hook.configure(store);
    }
}

/// Load every layer then run hooks, for callers without concurrent readers.
pub fn load(options: &BootstrapOptions, resources: &dyn ResourceProvider) -> LoadedConfig {
    let mut loaded = load_layers(options, resources);
    apply_hooks(&options.hooks, &mut loaded.store);
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticResources;
    use pretty_assertions::assert_eq;

    fn resources() -> StaticResources {
        StaticResources::new()
            .with("config/default.yaml", "testing: this\nenvironment: LOCAL\n")
            .with("config/dev.yaml", "environment: DEV\n")
            .with("config/seed.yaml", "environment: SEED\n")
    }

    #[test]
    fn env_profile_overrides_default() {
        let options = BootstrapOptions::new().with_env_vars([("APP_ENV", "dev")]);
        let loaded = load_layers(&options, &resources());
        assert_eq!(loaded.store.get_string("environment").as_deref(), Some("DEV"));
        assert_eq!(loaded.store.get_string("testing").as_deref(), Some("this"));
    }

    #[test]
    fn init_profile_wins_over_env_profile() {
        let options =
            BootstrapOptions::new().with_env_vars([("APP_ENV", "dev"), ("APP_INIT", "seed")]);
        let loaded = load_layers(&options, &resources());
        assert_eq!(loaded.store.get_string("environment").as_deref(), Some("SEED"));
        let dev_attempted = loaded.layers.iter().any(|layer| {
            layer.source == crate::LayerSource::Bundled("config/dev.yaml".to_string())
        });
        assert!(!dev_attempted);
    }

    #[test]
    fn disabled_env_layer_is_not_loaded() {
        let options = BootstrapOptions::new()
            .with_env_vars([("APP_ENV", "dev")])
            .without_env_vars();
        let loaded = load_layers(&options, &resources());
        assert_eq!(loaded.store.get_string("environment").as_deref(), Some("LOCAL"));
        assert!(!loaded.store.is_set("APP_ENV"));
    }

    #[test]
    fn inline_override_is_loaded_before_default() {
        let options = BootstrapOptions::new()
            .with_env_vars([("APP_CONFIG", r#"{"APP_ENV": "dev", "inline": true}"#)]);
        let loaded = load_layers(&options, &resources());
        assert_eq!(loaded.store.get_bool("inline"), Some(true));
        assert_eq!(loaded.store.get_string("environment").as_deref(), Some("DEV"));
    }

    struct Derive;

    impl ConfigHook for Derive {
        fn configure(&self, store: &mut ConfigStore) {
            let env = store.get_string_or("environment", "none");
            store.set_string("derived", format!("env-{env}"));
        }
    }

    #[test]
    fn load_runs_hooks_after_layers() {
        let options = BootstrapOptions::new().without_env_vars().with_hook(Derive);
        let loaded = load(&options, &resources());
        assert_eq!(loaded.store.get_string("derived").as_deref(), Some("env-LOCAL"));
    }
}
