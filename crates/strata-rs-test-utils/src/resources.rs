//! Resource provider wrappers for asserting access patterns.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;
use strata_rs_config::{ConfigError, ResourceProvider};

/// Counts every `open` call per resource name before delegating.
pub struct RecordingResources<P> {
    inner: P,
    delay: Option<Duration>,
    opens: Mutex<HashMap<String, usize>>,
}

impl<P: ResourceProvider> RecordingResources<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            delay: None,
            opens: Mutex::new(HashMap::new()),
        }
    }

    /// Sleep on every open, widening race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `name` was opened.
    pub fn opens(&self, name: &str) -> usize {
        self.opens.lock().get(name).copied().unwrap_or(0)
    }

    /// Total opens across all names.
    pub fn total_opens(&self) -> usize {
        self.opens.lock().values().sum()
    }
}

impl<P: ResourceProvider> ResourceProvider for RecordingResources<P> {
    fn open(&self, name: &str) -> Result<Option<String>, ConfigError> {
        *self.opens.lock().entry(name.to_string()).or_default() += 1;
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.inner.open(name)
    }
}
