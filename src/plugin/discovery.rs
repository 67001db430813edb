//! Plugin Discovery
//!
//! File-based discovery of plugin manifests. Each immediate subdirectory of
//! the plugins directory may carry a `plugin.yaml` (or `plugin.yml`)
//! manifest; valid manifests become discovered plugins ready to install.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::fs;

use super::entry::PluginSource;
use super::error::{PluginError, PluginResult};
use super::identity;
use super::traits::PluginManifest;

/// Manifest file names probed inside each plugin directory
const MANIFEST_NAMES: [&str; 2] = ["plugin.yaml", "plugin.yml"];

/// A manifest found on disk, paired with the source to install it from.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredPlugin {
    pub manifest: PluginManifest,
    pub source: PluginSource,
}

impl DiscoveredPlugin {
    /// Identifier the plugin would install under.
    pub fn slug(&self) -> PluginResult<String> {
        identity::derive_slug(self.source.plugin_file())
    }
}

/// Discovery seam for finding installable plugins.
#[async_trait]
pub trait PluginDiscovery: Send + Sync {
    /// Discover all available plugins.
    async fn discover(&self) -> PluginResult<Vec<DiscoveredPlugin>>;

    /// Discover plugins compatible with a specific API version.
    async fn discover_compatible(&self, api_version: u32) -> PluginResult<Vec<DiscoveredPlugin>> {
        let all = self.discover().await?;

        Ok(all
            .into_iter()
            .filter(|p| p.manifest.is_compatible_with_api(api_version))
            .collect())
    }

    /// The directory being scanned.
    fn plugins_dir(&self) -> &Path;
}

/// File-based discovery over one level of plugin directories.
#[derive(Debug)]
pub struct ManifestDiscovery {
    plugins_dir: PathBuf,
}

impl ManifestDiscovery {
    pub fn new<P: AsRef<Path>>(plugins_dir: P) -> PluginResult<Self> {
        let path = plugins_dir.as_ref().to_path_buf();

        if !path.exists() {
            return Err(PluginError::discovery_error(format!(
                "Plugins directory does not exist: {}",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Err(PluginError::discovery_error(format!(
                "Plugins path is not a directory: {}",
                path.display()
            )));
        }

        Ok(Self { plugins_dir: path })
    }

    /// Locate the manifest file inside one plugin directory.
    async fn manifest_path(dir: &Path) -> Option<PathBuf> {
        for name in MANIFEST_NAMES {
            let candidate = dir.join(name);
            let is_file = fs::metadata(&candidate)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if is_file {
                return Some(candidate);
            }
        }
        None
    }

    async fn parse_manifest(path: &Path) -> PluginResult<PluginManifest> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            PluginError::discovery_error(format!(
                "Failed to read manifest {}: {}",
                path.display(),
                e
            ))
        })?;

        let manifest: PluginManifest = serde_yaml::from_str(&content)?;
        validate_manifest(&manifest)?;
        Ok(manifest)
    }
}

#[async_trait]
impl PluginDiscovery for ManifestDiscovery {
    async fn discover(&self) -> PluginResult<Vec<DiscoveredPlugin>> {
        let mut discovered = Vec::new();

        let mut entries = fs::read_dir(&self.plugins_dir).await.map_err(|e| {
            PluginError::discovery_error(format!(
                "Failed to read directory {}: {}",
                self.plugins_dir.display(),
                e
            ))
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            PluginError::discovery_error(format!("Failed to read directory entry: {}", e))
        })? {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let manifest_file = match Self::manifest_path(&path).await {
                Some(file) => file,
                None => {
                    debug!("No manifest in {}, skipping", path.display());
                    continue;
                }
            };

            match Self::parse_manifest(&manifest_file).await {
                Ok(manifest) => {
                    debug!(
                        "Discovered plugin '{}' {} at {}",
                        manifest.name,
                        manifest.version,
                        manifest_file.display()
                    );
                    discovered.push(DiscoveredPlugin {
                        manifest,
                        source: PluginSource::new(manifest_file),
                    });
                }
                Err(e) => {
                    // Invalid manifests are skipped, not fatal
                    warn!("Ignoring manifest {}: {}", manifest_file.display(), e);
                }
            }
        }

        discovered.sort_by_key(|plugin| {
            identity::derive_slug(plugin.source.plugin_file()).unwrap_or_default()
        });
        Ok(discovered)
    }

    fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }
}

/// Reject manifests no entry could be installed from.
fn validate_manifest(manifest: &PluginManifest) -> PluginResult<()> {
    if manifest.name.is_empty() {
        return Err(PluginError::manifest_error("Plugin name cannot be empty"));
    }

    if !is_valid_version(&manifest.version) {
        return Err(PluginError::manifest_error(format!(
            "Invalid version format: {}",
            manifest.version
        )));
    }

    if manifest.api_version == 0 {
        return Err(PluginError::manifest_error("API version cannot be zero"));
    }

    Ok(())
}

/// Basic version validation (simplified semver)
fn is_valid_version(version: &str) -> bool {
    if !version.contains('.') {
        return false;
    }

    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return false;
    }

    parts.iter().all(|part| part.parse::<u32>().is_ok())
}
