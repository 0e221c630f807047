//! Shared config handle with lazy, once-only bootstrap.
//!
//! The first caller to ask for the config runs the layer sequence; every
//! other caller blocks on the [`ReadyGate`] until it opens. The gate opens
//! even if loading unwinds. Hooks run after the gate opens, so early readers
//! may or may not see hook-derived keys.

use crate::bootstrap::{self, BootstrapOptions};
use crate::loader::LayerRecord;
use crate::{ConfigStore, DirResources, ResourceProvider};
use log::{debug, info};
use parking_lot::{Condvar, Mutex, RwLock, RwLockReadGuard};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// One-shot gate: closed until [`ReadyGate::open`], then open forever.
#[derive(Debug, Default)]
pub struct ReadyGate {
    ready: Mutex<bool>,
    signal: Condvar,
}

impl ReadyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate and wake every waiter. Later calls are no-ops.
    pub fn open(&self) {
        let mut ready = self.ready.lock();
        if !*ready {
            *ready = true;
            self.signal.notify_all();
        }
    }

    pub fn is_open(&self) -> bool {
        *self.ready.lock()
    }

    /// Block until the gate is open.
    pub fn wait(&self) {
        let mut ready = self.ready.lock();
        while !*ready {
            self.signal.wait(&mut ready);
        }
    }
}

/// Opens the gate when dropped, including during unwinding.
struct OpenOnDrop<'a>(&'a ReadyGate);

impl Drop for OpenOnDrop<'_> {
    fn drop(&mut self) {
        self.0.open();
    }
}

/// Config store shared across threads, bootstrapped on first access.
pub struct ConfigProvider {
    options: BootstrapOptions,
    resources: Arc<dyn ResourceProvider>,
    started: AtomicBool,
    gate: ReadyGate,
    store: RwLock<ConfigStore>,
    layers: Mutex<Vec<LayerRecord>>,
}

impl fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigProvider")
            .field("options", &self.options)
            .field("ready", &self.gate.is_open())
            .finish()
    }
}

impl ConfigProvider {
    /// Create a provider; nothing is loaded until first access.
    pub fn new(options: BootstrapOptions, resources: Arc<dyn ResourceProvider>) -> Self {
        Self {
            options,
            resources,
            started: AtomicBool::new(false),
            gate: ReadyGate::new(),
            store: RwLock::new(ConfigStore::new()),
            layers: Mutex::new(Vec::new()),
        }
    }

    /// Process-wide provider built from `CONFIG_FILE`/`CONFIG_ENV_VARS` with
    /// bundled resources read relative to the working directory.
    pub fn global() -> &'static ConfigProvider {
        static GLOBAL: OnceLock<ConfigProvider> = OnceLock::new();
        let provider = GLOBAL.get_or_init(|| {
            ConfigProvider::new(
                BootstrapOptions::from_env(),
                Arc::new(DirResources::from_current_dir()),
            )
        });
        provider.ensure_ready();
        provider
    }

    /// Whether bootstrap has finished loading layers.
    pub fn is_ready(&self) -> bool {
        self.gate.is_open()
    }

    /// Run bootstrap if nobody has, otherwise wait for it to finish.
    pub fn ensure_ready(&self) {
        if self.gate.is_open() {
            return;
        }
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.bootstrap();
        } else {
            debug!("waiting for config bootstrap");
            self.gate.wait();
        }
    }

    fn bootstrap(&self) {
        // Opens the gate even if a layer load unwinds, leaving an empty store.
        let opener = OpenOnDrop(&self.gate);
        let loaded = bootstrap::load_layers(&self.options, self.resources.as_ref());
        *self.store.write() = loaded.store;
        *self.layers.lock() = loaded.layers;
        drop(opener);
        info!("config ready");

        // Hooks work on a copy so they may read back through the provider.
        for hook in &self.options.hooks {
            debug!("running config hook (name={})", hook.name());
            let mut staged = self.store.read().clone();
            hook.configure(&mut staged);
            *self.store.write() = staged;
        }
    }

    /// Read access to the store, bootstrapping first if needed.
    pub fn config(&self) -> RwLockReadGuard<'_, ConfigStore> {
        self.ensure_ready();
        self.store.read()
    }

    /// Layers attempted during bootstrap, in order.
    pub fn layers(&self) -> Vec<LayerRecord> {
        self.ensure_ready();
        self.layers.lock().clone()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.config().get_string(key)
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.config().get_string_or(key, default)
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>, crate::ConfigError> {
        self.config().get_int(key)
    }

    pub fn get_int_or(&self, key: &str, default: i64) -> Result<i64, crate::ConfigError> {
        self.config().get_int_or(key, default)
    }

    pub fn get_double(&self, key: &str) -> Option<f64> {
        self.config().get_double(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.config().get_bool(key)
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.config().is_set(key)
    }

    /// Snapshot of every string entry, deobfuscated where marked.
    pub fn get_all_strings(&self) -> indexmap::IndexMap<String, String> {
        self.config().get_all_strings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticResources;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn gate_releases_waiters_once_opened() {
        let gate = Arc::new(ReadyGate::new());
        assert!(!gate.is_open());

        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                gate.wait();
                gate.is_open()
            })
        };
        thread::sleep(Duration::from_millis(20));
        gate.open();
        gate.open();
        assert!(waiter.join().expect("join"));
        gate.wait();
    }

    #[test]
    fn provider_loads_lazily() {
        let resources = StaticResources::new().with("config/default.yaml", "name: lazy\n");
        let provider = ConfigProvider::new(
            BootstrapOptions::new().without_env_vars(),
            Arc::new(resources),
        );
        assert!(!provider.is_ready());
        assert_eq!(provider.get_string("name").as_deref(), Some("lazy"));
        assert!(provider.is_ready());
        assert_eq!(provider.layers().len(), 1);
    }
}
