//! Core Plugin Traits
//!
//! Defines the plugin capability interface and the manifest metadata every
//! plugin declares. Lifecycle callbacks are default no-ops: a plugin
//! overrides exactly the stages it cares about, and the compiler checks the
//! signatures instead of any runtime discovery of handler methods.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::context::PluginContext;
use super::error::PluginResult;
use super::options::OptionsMap;
use crate::version;

fn default_api_version() -> u32 {
    version::get_api_version() as u32
}

/// Plugin metadata and information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Human-readable plugin name
    pub name: String,

    /// Plugin version (dotted numeric, e.g. "1.2.0")
    pub version: String,

    /// API version this plugin targets (YYYYMMDD)
    #[serde(default = "default_api_version")]
    pub api_version: u32,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Plugin author
    #[serde(default)]
    pub author: String,

    /// Plugin website or repository URL
    pub url: Option<String>,

    /// License information
    pub license: Option<String>,

    /// Minimum host platform version required for activation
    pub requires_platform: Option<String>,

    /// Text domain for translations; defaults to the plugin slug
    pub text_domain: Option<String>,
}

impl PluginManifest {
    /// Create a new manifest targeting the current API version
    pub fn new(name: String, version: String, description: String, author: String) -> Self {
        Self {
            name,
            version,
            api_version: default_api_version(),
            description,
            author,
            url: None,
            license: None,
            requires_platform: None,
            text_domain: None,
        }
    }

    /// Set URL
    pub fn with_url(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    /// Set license
    pub fn with_license(mut self, license: String) -> Self {
        self.license = Some(license);
        self
    }

    /// Set the minimum platform version required for activation
    pub fn with_requires_platform(mut self, version: String) -> Self {
        self.requires_platform = Some(version);
        self
    }

    /// Set the text domain used for translation lookups
    pub fn with_text_domain(mut self, text_domain: String) -> Self {
        self.text_domain = Some(text_domain);
        self
    }

    /// Override the API version this plugin targets
    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    /// Check if plugin is compatible with an API version
    pub fn is_compatible_with_api(&self, api_version: u32) -> bool {
        // Simple compatibility check - same major version (year)
        self.api_version / 10000 == api_version / 10000
    }

    /// Text domain for this plugin, falling back to the slug
    pub fn text_domain_or<'a>(&'a self, slug: &'a str) -> &'a str {
        self.text_domain.as_deref().unwrap_or(slug)
    }
}

/// Capability interface every plugin implements.
///
/// `manifest` is the only required method. Each lifecycle stage receives the
/// plugin's [`PluginContext`]; a failing callback is reported through the
/// dispatch outcome and never unwinds the request.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Get plugin metadata information
    fn manifest(&self) -> &PluginManifest;

    /// Option defaults written at install time and merged in on upgrade
    fn default_options(&self) -> OptionsMap {
        OptionsMap::new()
    }

    /// Runs while the plugin is being installed on the platform
    async fn construct(&mut self, _context: &PluginContext) -> PluginResult<()> {
        Ok(())
    }

    /// Runs at the plugins-loaded stage, after the options state machine
    /// and text domain loading
    async fn loaded(&mut self, _context: &PluginContext) -> PluginResult<()> {
        Ok(())
    }

    /// Runs at the init stage
    async fn initialize(&mut self, _context: &PluginContext) -> PluginResult<()> {
        Ok(())
    }

    /// Runs when this plugin is activated
    async fn activate(&mut self, _context: &PluginContext) -> PluginResult<()> {
        Ok(())
    }

    /// Runs when this plugin is deactivated
    async fn deactivate(&mut self, _context: &PluginContext) -> PluginResult<()> {
        Ok(())
    }

    /// Runs when the stored options version lags the declared version.
    ///
    /// `previous_version` is the version that last wrote the stored record;
    /// the merged options are already in place and the new version is
    /// stamped only after this callback succeeds.
    async fn upgrade(
        &mut self,
        _context: &PluginContext,
        _previous_version: &str,
    ) -> PluginResult<()> {
        Ok(())
    }

    /// Runs at request teardown, before the options record is persisted
    async fn terminate(&mut self, _context: &PluginContext) -> PluginResult<()> {
        Ok(())
    }
}
