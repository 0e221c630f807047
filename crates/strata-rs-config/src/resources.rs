//! Access to bundled config resources by logical name.

use crate::ConfigError;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Resolves a logical resource name (e.g. `config/default.yaml`) to its text.
///
/// A missing resource is `Ok(None)`, not an error.
pub trait ResourceProvider: Send + Sync {
    /// Read the named resource if it exists.
    fn open(&self, name: &str) -> Result<Option<String>, ConfigError>;
}

impl<T: ResourceProvider + ?Sized> ResourceProvider for Arc<T> {
    fn open(&self, name: &str) -> Result<Option<String>, ConfigError> {
        (**self).open(name)
    }
}

/// Resources read from files below a root directory.
#[derive(Debug, Clone)]
pub struct DirResources {
    root: PathBuf,
}

impl DirResources {
    /// Serve resources relative to `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Serve resources relative to the process working directory.
    pub fn from_current_dir() -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceProvider for DirResources {
    fn open(&self, name: &str) -> Result<Option<String>, ConfigError> {
        let relative = Path::new(name);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
        {
            warn!("refusing resource name outside root (name={name})");
            return Ok(None);
        }
        let path = self.root.join(relative);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("resource missing (path={})", path.display());
                Ok(None)
            }
            Err(err) => Err(ConfigError::ReadFailed(err)),
        }
    }
}

/// In-memory resources, e.g. files bundled with `include_str!`.
#[derive(Debug, Clone, Default)]
pub struct StaticResources {
    entries: HashMap<String, String>,
}

impl StaticResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource and return the table, for chained construction.
    pub fn with(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(name, contents);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, contents: impl Into<String>) {
        self.entries.insert(name.into(), contents.into());
    }
}

impl ResourceProvider for StaticResources {
    fn open(&self, name: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.entries.get(name).cloned())
    }
}

/// Consults providers in order; the first one holding the name wins.
#[derive(Clone, Default)]
pub struct ChainResources {
    providers: Vec<Arc<dyn ResourceProvider>>,
}

impl ChainResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl ResourceProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }
}

impl ResourceProvider for ChainResources {
    fn open(&self, name: &str) -> Result<Option<String>, ConfigError> {
        for provider in &self.providers {
            if let Some(contents) = provider.open(name)? {
                return Ok(Some(contents));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn dir_resources_read_relative_files() {
        let temp = TempDir::new().expect("tmp");
        fs::create_dir_all(temp.path().join("config")).expect("dir");
        fs::write(temp.path().join("config/default.yaml"), "a: 1\n").expect("write");

        let resources = DirResources::new(temp.path());
        assert_eq!(
            resources.open("config/default.yaml").expect("open"),
            Some("a: 1\n".to_string())
        );
        assert_eq!(resources.open("config/missing.yaml").expect("open"), None);
    }

    #[test]
    fn dir_resources_reject_escaping_names() {
        let temp = TempDir::new().expect("tmp");
        let resources = DirResources::new(temp.path().join("nested"));
        fs::write(temp.path().join("secret.yaml"), "a: 1\n").expect("write");
        assert_eq!(resources.open("../secret.yaml").expect("open"), None);
    }

    #[test]
    fn chain_prefers_earlier_providers() {
        let chain = ChainResources::new()
            .with(StaticResources::new().with("config/a.yaml", "first"))
            .with(
                StaticResources::new()
                    .with("config/a.yaml", "second")
                    .with("config/b.yaml", "only"),
            );
        assert_eq!(chain.open("config/a.yaml").expect("open").as_deref(), Some("first"));
        assert_eq!(chain.open("config/b.yaml").expect("open").as_deref(), Some("only"));
        assert_eq!(chain.open("config/c.yaml").expect("open"), None);
    }
}
