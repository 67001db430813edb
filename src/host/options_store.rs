//! Options Persistence
//!
//! The host-owned store each plugin's options record lives in. The platform
//! loads the record at the plugins-loaded stage and writes the whole record
//! back at request shutdown; atomicity of that write belongs to the store
//! implementation.

use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::options::PluginOptions;

/// Host seam for per-plugin options persistence.
#[async_trait]
pub trait OptionsStore: Send + Sync {
    /// Load the record stored under a plugin slug, if any.
    async fn load(&self, slug: &str) -> PluginResult<Option<PluginOptions>>;

    /// Persist the whole record under a plugin slug.
    async fn save(&self, slug: &str, options: &PluginOptions) -> PluginResult<()>;
}

/// In-memory store, the default for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryOptionsStore {
    records: DashMap<String, PluginOptions>,
}

impl MemoryOptionsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl OptionsStore for MemoryOptionsStore {
    async fn load(&self, slug: &str) -> PluginResult<Option<PluginOptions>> {
        Ok(self.records.get(slug).map(|record| record.clone()))
    }

    async fn save(&self, slug: &str, options: &PluginOptions) -> PluginResult<()> {
        self.records.insert(slug.to_string(), options.clone());
        Ok(())
    }
}

/// File-backed store keeping one `<slug>.json` per plugin under a directory.
/// Saves replace the whole file.
#[derive(Debug, Clone)]
pub struct JsonFileOptionsStore {
    dir: PathBuf,
}

impl JsonFileOptionsStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}.json"))
    }
}

#[async_trait]
impl OptionsStore for JsonFileOptionsStore {
    async fn load(&self, slug: &str) -> PluginResult<Option<PluginOptions>> {
        let path = self.record_path(slug);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let record: PluginOptions = serde_json::from_slice(&bytes)?;
                Ok(Some(record))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PluginError::options_error(format!(
                "failed to read '{}': {}",
                path.display(),
                err
            ))),
        }
    }

    async fn save(&self, slug: &str, options: &PluginOptions) -> PluginResult<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|err| {
            PluginError::options_error(format!(
                "failed to create '{}': {}",
                self.dir.display(),
                err
            ))
        })?;

        let path = self.record_path(slug);
        let payload = serde_json::to_vec_pretty(options)?;
        tokio::fs::write(&path, payload).await.map_err(|err| {
            PluginError::options_error(format!("failed to write '{}': {}", path.display(), err))
        })?;

        debug!("persisted options for '{}' to {}", slug, path.display());
        Ok(())
    }
}
