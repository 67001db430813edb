//! Platform Configuration
//!
//! Typed configuration for an embedding platform, loaded from TOML through a
//! discovery hierarchy. Hosts that configure in code use `Default` and field
//! assignment instead of a file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;

/// Runtime settings shared with every plugin context.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformSettings {
    /// Host platform version plugins gate activation on
    pub platform_version: String,

    /// Locale used when loading text domains
    pub locale: String,

    /// Log recoverable plugin errors at warn level
    pub debug: bool,
}

/// Platform configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Host platform version plugins gate activation on
    pub platform_version: String,

    /// Locale used when loading text domains
    pub locale: String,

    /// Log recoverable plugin errors at warn level
    pub debug: bool,

    /// Directory scanned for on-disk plugin manifests
    pub plugins_dir: Option<PathBuf>,

    /// When set, options records persist as one JSON file per plugin in
    /// this directory
    pub options_dir: Option<PathBuf>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            platform_version: "1.0.0".to_string(),
            locale: "en_US".to_string(),
            debug: false,
            plugins_dir: None,
            options_dir: None,
        }
    }
}

impl PlatformConfig {
    /// Load configuration using the discovery hierarchy.
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                info!("Loading configuration from: {}", path.display());
                return Self::load_from_file(&path);
            }
        }

        info!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from an explicit file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: PlatformConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Successfully loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Runtime settings handed to plugin contexts.
    pub fn settings(&self) -> PlatformSettings {
        PlatformSettings {
            platform_version: self.platform_version.clone(),
            locale: self.locale.clone(),
            debug: self.debug,
        }
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $PLUGBASE_CONFIG
    if let Ok(env_path) = env::var("PLUGBASE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    // 2. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("plugbase").join("config.toml"));
    }

    // 3. Home directory
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".plugbase.toml"));
    }

    // 4. Project local
    paths.push(PathBuf::from("./plugbase.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}
