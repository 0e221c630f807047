//! Config hooks that record or derive values.

use parking_lot::Mutex;
use std::sync::Arc;
use strata_rs_config::{ConfigHook, ConfigStore};

/// Appends its name to a shared log each time it runs.
#[derive(Debug, Clone)]
pub struct RecordingHook {
    name: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingHook {
    pub fn new(name: impl Into<String>, calls: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.into(),
            calls,
        }
    }
}

impl ConfigHook for RecordingHook {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&self, store: &mut ConfigStore) {
        self.calls.lock().push(self.name.clone());
        store.set_string(format!("hook.{}", self.name), "ran");
    }
}

/// Writes `target` as the value of `source` with a fixed suffix.
#[derive(Debug, Clone)]
pub struct DeriveKeyHook {
    pub source: String,
    pub target: String,
    pub suffix: String,
}

impl DeriveKeyHook {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            suffix: suffix.into(),
        }
    }
}

impl ConfigHook for DeriveKeyHook {
    fn name(&self) -> &str {
        "derive-key"
    }

    fn configure(&self, store: &mut ConfigStore) {
        if let Some(value) = store.get_string(&self.source) {
            store.set_string(self.target.clone(), format!("{value}{}", self.suffix));
        }
    }
}
