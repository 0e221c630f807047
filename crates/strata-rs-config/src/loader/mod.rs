//! Layer loading: obtain a source's text, parse it, resolve references and
//! merge the result into a [`ConfigStore`].
//!
//! Missing sources and parse failures never abort loading. They are logged,
//! recorded in the [`LayerRecord`] list and the layer contributes nothing.

mod format;
mod properties;


pub use format::ConfigFormat;

use crate::reference;
use crate::{ConfigError, ConfigMap, ConfigStore, ConfigValue, ResourceProvider};
use format::{FileFormat, resource_format};
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Namespace that bundled layer names are resolved under.
pub const BUNDLED_NAMESPACE: &str = "config";
/// Reserved key whose string-array value names bundled layers to import.
pub const IMPORT_KEY: &str = "$import";

/// Origin of a single layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    /// Deployment-supplied file on the local filesystem.
    ExternalFile(PathBuf),
    /// Process environment variables.
    Environment,
    /// Config text already in hand (the inline override).
    Inline,
    /// Named resource under `config/`, resolved through a [`ResourceProvider`].
    Bundled(String),
}

/// Outcome of one layer load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRecord {
    /// Where the layer was read from (imports record their own entry).
    pub source: LayerSource,
    /// Entries written into the store by this layer (imports excluded).
    pub entries: usize,
    /// Why the layer contributed nothing, when it was skipped or failed.
    pub skipped_reason: Option<String>,
}

/// Loads layers into a store, in the order the caller invokes them.
pub struct LayerLoader<'a> {
    store: &'a mut ConfigStore,
    resources: &'a dyn ResourceProvider,
    format: ConfigFormat,
    import_stack: Vec<String>,
    records: Vec<LayerRecord>,
}

impl<'a> LayerLoader<'a> {
    pub fn new(
        store: &'a mut ConfigStore,
        resources: &'a dyn ResourceProvider,
        format: ConfigFormat,
    ) -> Self {
        Self {
            store,
            resources,
            format,
            import_stack: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Read-only view of the store being built.
    pub fn store(&self) -> &ConfigStore {
        self.store
    }

    /// Records for every layer attempted so far, in attempt order.
    pub fn records(&self) -> &[LayerRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LayerRecord> {
        self.records
    }

    /// Load a file from the local filesystem, dispatching on its suffix.
    ///
    /// A missing file contributes nothing.
    pub fn load_external_file(&mut self, path: &Path) -> usize {
        let source = LayerSource::ExternalFile(path.to_path_buf());
        if !path.exists() {
            debug!("external config file missing (path={})", path.display());
            return self.skip(source, "file not found");
        }
        let Some(file_format) = FileFormat::from_path(path) else {
            debug!("unsupported external config suffix (path={})", path.display());
            return self.skip(source, "unsupported file suffix");
        };

        let parsed = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|contents| file_format.parse(&contents));
        match parsed {
            Ok(entries) => {
                info!("loading external config file (path={})", path.display());
                self.merge(source, entries)
            }
            Err(err) => self.fail(source, err),
        }
    }

    /// Load one string entry per environment variable.
    pub fn load_env_vars<I>(&mut self, vars: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let entries = vars
            .into_iter()
            .map(|(key, value)| (key, ConfigValue::String(value)))
            .collect::<ConfigMap>();
        debug!("loading environment layer (vars={})", entries.len());
        self.merge(LayerSource::Environment, entries)
    }

    /// Load config text already in hand, parsed as JSON.
    pub fn load_inline(&mut self, contents: &str) -> usize {
        match format::parse_json(contents) {
            Ok(entries) => {
                debug!("loading inline config (len={})", contents.len());
                self.merge(LayerSource::Inline, entries)
            }
            Err(err) => self.fail(LayerSource::Inline, err),
        }
    }

    /// Load the bundled layer `config/<name><ext>`.
    ///
    /// A missing resource contributes nothing. A layer that is already being
    /// imported further up the chain is skipped.
    pub fn load_bundled(&mut self, name: &str) -> usize {
        let resource = bundled_resource_name(name, self.format);
        let source = LayerSource::Bundled(resource.clone());

        if self.import_stack.contains(&resource) {
            warn!("skipping cyclic config import (resource={resource})");
            return self.skip(source, "cyclic import");
        }

        let contents = match self.resources.open(&resource) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!("bundled config missing (resource={resource})");
                return self.skip(source, "resource not found");
            }
            Err(err) => return self.fail(source, err),
        };

        match resource_format(&resource).parse(&contents) {
            Ok(entries) => {
                info!("loading bundled config (resource={resource})");
                self.import_stack.push(resource);
                let written = self.merge(source, entries);
                self.import_stack.pop();
                written
            }
            Err(err) => self.fail(source, err),
        }
    }

    /// Merge parsed entries in order, resolving references and imports.
    fn merge(&mut self, source: LayerSource, entries: ConfigMap) -> usize {
        // Reserve the record slot so imported layers are listed after their importer.
        let slot = self.records.len();
        self.records.push(LayerRecord {
            source,
            entries: 0,
            skipped_reason: None,
        });

        let mut written = 0;
        for (key, value) in entries {
            match value {
                ConfigValue::StringArray(names) if key == IMPORT_KEY => {
                    for name in &names {
                        debug!("importing bundled config (name={name})");
                        self.load_bundled(name);
                    }
                }
                ConfigValue::String(raw) if reference::is_reference(&raw) => {
                    let resolved = reference::resolve(&raw, |target| {
                        self.store.get_raw_string(target).map(str::to_string)
                    });
                    debug!(
                        "resolved config reference (key={key}, set={})",
                        resolved.is_some()
                    );
                    match resolved {
                        Some(value) => self.store.set_string(key, value),
                        None => {
                            self.store.remove(&key);
                        }
                    }
                    written += 1;
                }
                value => {
                    self.store.put(key, value);
                    written += 1;
                }
            }
        }

        self.records[slot].entries = written;
        written
    }

    fn skip(&mut self, source: LayerSource, reason: &str) -> usize {
        self.records.push(LayerRecord {
            source,
            entries: 0,
            skipped_reason: Some(reason.to_string()),
        });
        0
    }

    fn fail(&mut self, source: LayerSource, err: ConfigError) -> usize {
        error!("config layer failed to load (source={source:?}): {err}");
        self.skip(source, &err.to_string())
    }
}

/// Logical resource name for a bundled layer.
pub fn bundled_resource_name(name: &str, format: ConfigFormat) -> String {
    format!("{BUNDLED_NAMESPACE}/{name}{}", format.extension())
}
