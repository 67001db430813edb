//! Text Domain Loading
//!
//! Translation catalogs keyed by text domain. Each plugin's entry loads its
//! domain at the plugins-loaded stage; lookups fall back to the untranslated
//! key, so a missing catalog is never an error.

use std::collections::HashMap;
use std::path::Path;

use dashmap::DashMap;
use log::debug;

use crate::plugin::error::{PluginError, PluginResult};

/// Host seam for loading and querying translation catalogs.
pub trait TextDomainLoader: Send + Sync {
    /// Load the catalog for `domain` in `locale` from a languages directory.
    ///
    /// Returns false when no catalog exists for the locale; plugins then see
    /// untranslated keys.
    fn load_text_domain(
        &self,
        domain: &str,
        languages_dir: &Path,
        locale: &str,
    ) -> PluginResult<bool>;

    /// Look up a translation in a loaded catalog.
    fn lookup(&self, domain: &str, key: &str) -> Option<String>;
}

/// JSON-file catalogs: `<languages_dir>/<domain>-<locale>.json` holding a
/// flat string map.
#[derive(Debug, Default)]
pub struct JsonFileTextDomains {
    catalogs: DashMap<String, HashMap<String, String>>,
}

impl JsonFileTextDomains {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog directly, for hosts that keep translations inline.
    pub fn insert_catalog<S: Into<String>>(&self, domain: S, catalog: HashMap<String, String>) {
        self.catalogs.insert(domain.into(), catalog);
    }

    /// Whether a catalog is loaded for the domain.
    pub fn has_domain(&self, domain: &str) -> bool {
        self.catalogs.contains_key(domain)
    }
}

impl TextDomainLoader for JsonFileTextDomains {
    fn load_text_domain(
        &self,
        domain: &str,
        languages_dir: &Path,
        locale: &str,
    ) -> PluginResult<bool> {
        let path = languages_dir.join(format!("{domain}-{locale}.json"));
        if !path.exists() {
            debug!(
                "no catalog for text domain '{}' at {}",
                domain,
                path.display()
            );
            return Ok(false);
        }

        let raw = std::fs::read_to_string(&path).map_err(|err| {
            PluginError::generic(format!("IO error reading '{}': {}", path.display(), err))
        })?;
        let catalog: HashMap<String, String> = serde_json::from_str(&raw).map_err(|err| {
            PluginError::generic(format!("catalog parse error in '{}': {}", path.display(), err))
        })?;

        debug!(
            "loaded {} translations for text domain '{}' ({})",
            catalog.len(),
            domain,
            locale
        );
        self.catalogs.insert(domain.to_string(), catalog);
        Ok(true)
    }

    fn lookup(&self, domain: &str, key: &str) -> Option<String> {
        self.catalogs.get(domain)?.get(key).cloned()
    }
}
