//! Versioned Plugin Options
//!
//! The persisted key-value record each plugin owns. Every record carries a
//! `version` entry naming the plugin version that last wrote it; the
//! install/upgrade state machine compares that entry against the manifest
//! version to decide whether an upgrade pass is due.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{PluginError, PluginResult};

/// Option key under which the record version is stored
pub const VERSION_KEY: &str = "version";

/// Plugin option values keyed by name
pub type OptionsMap = HashMap<String, Value>;

/// Compare two dotted version strings numerically.
///
/// Missing segments read as zero and non-numeric segments are ignored, so
/// `"10.0"` sorts above `"9.1"` and `"1.2"` equals `"1.2.0"`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<u32> = a.split('.').filter_map(|s| s.parse().ok()).collect();
    let b_parts: Vec<u32> = b.split('.').filter_map(|s| s.parse().ok()).collect();

    for i in 0..std::cmp::max(a_parts.len(), b_parts.len()) {
        let left = a_parts.get(i).copied().unwrap_or(0);
        let right = b_parts.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// The options record for one plugin.
///
/// Serializes transparently as the underlying map, so the stored form is a
/// plain JSON object like `{"version": "1.1", "cache_ttl": 300}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginOptions {
    entries: OptionsMap,
}

impl PluginOptions {
    /// Build the install-time record: the plugin's defaults stamped with the
    /// declared version.
    pub fn from_defaults(defaults: OptionsMap, version: &str) -> Self {
        let mut record = Self { entries: defaults };
        record.set_version(version);
        record
    }

    /// Adopt a stored record as-is.
    pub fn from_map(entries: OptionsMap) -> Self {
        Self { entries }
    }

    /// The version that last wrote this record; a record predating
    /// versioning reads as `"0"`.
    pub fn version(&self) -> &str {
        self.entries
            .get(VERSION_KEY)
            .and_then(Value::as_str)
            .unwrap_or("0")
    }

    /// Stamp the record with a new version.
    pub fn set_version(&mut self, version: &str) {
        self.entries
            .insert(VERSION_KEY.to_string(), Value::String(version.to_string()));
    }

    /// Merge this (stored) record over a fresh defaults map.
    ///
    /// Every stored key survives with its stored value; default keys absent
    /// from the stored record are added. Stored values are never
    /// overwritten.
    pub fn merged_over_defaults(&self, defaults: &OptionsMap) -> PluginOptions {
        let mut entries = defaults.clone();
        entries.extend(self.entries.clone());
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn set<K: Into<String>>(&mut self, key: K, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Flip a boolean option and return the new value. An absent option
    /// counts as false and becomes true; a non-boolean value is a
    /// recoverable error.
    pub fn toggle(&mut self, key: &str) -> PluginResult<bool> {
        let next = match self.entries.get(key) {
            None => true,
            Some(Value::Bool(current)) => !current,
            Some(other) => {
                return Err(PluginError::options_error(format!(
                    "option '{}' is not a boolean (found {})",
                    key, other
                )));
            }
        };
        self.entries.insert(key.to_string(), Value::Bool(next));
        Ok(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
