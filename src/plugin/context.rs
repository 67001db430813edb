//! Plugin Execution Context
//!
//! The explicit context handed to every plugin lifecycle callback. It
//! carries the plugin's identity plus handles to everything a callback may
//! touch; nothing is ambient and nothing reaches for global state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::warn;
use serde_json::Value;
use tokio::sync::RwLock;

use super::error::PluginResult;
use super::notices::{AdminNotices, NoticeKind};
use super::options::PluginOptions;
use crate::config::PlatformSettings;
use crate::hooks::HookRegistry;
use crate::host::{HostServices, ScheduledTask, TaskInterval};

/// Context provided to plugin callbacks during lifecycle dispatch
#[derive(Clone)]
pub struct PluginContext {
    pub(crate) slug: String,
    pub(crate) plugin_file: PathBuf,
    pub(crate) plugin_dir: PathBuf,
    pub(crate) text_domain: String,
    pub(crate) settings: PlatformSettings,
    pub(crate) options: Arc<RwLock<PluginOptions>>,
    pub(crate) notices: Arc<AdminNotices>,
    pub(crate) services: HostServices,
    pub(crate) hooks: Arc<HookRegistry>,
}

impl PluginContext {
    /// The plugin's stable identifier.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// The plugin's own file path, as resolved at install time.
    pub fn plugin_file(&self) -> &Path {
        &self.plugin_file
    }

    /// The directory containing the plugin.
    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    /// The text domain this plugin translates under.
    pub fn text_domain(&self) -> &str {
        &self.text_domain
    }

    /// The running host platform version.
    pub fn platform_version(&self) -> &str {
        &self.settings.platform_version
    }

    /// The host locale.
    pub fn locale(&self) -> &str {
        &self.settings.locale
    }

    /// Whether the platform runs with the debug flag set.
    pub fn is_debug(&self) -> bool {
        self.settings.debug
    }

    /// Read one option value.
    pub async fn option(&self, key: &str) -> Option<Value> {
        self.options.read().await.get(key).cloned()
    }

    /// Write one option value. The change persists when the request shuts
    /// down.
    pub async fn set_option<K: Into<String>>(&self, key: K, value: Value) {
        self.options.write().await.set(key, value);
    }

    /// Flip a boolean option, returning the new value.
    pub async fn toggle_option(&self, key: &str) -> PluginResult<bool> {
        let result = self.options.write().await.toggle(key);
        if let Err(ref err) = result {
            self.log_recoverable("toggle_option", err);
        }
        result
    }

    /// A point-in-time copy of the whole options record.
    pub async fn options_snapshot(&self) -> PluginOptions {
        self.options.read().await.clone()
    }

    /// Queue an admin notice for this request.
    pub fn add_notice(&self, kind: NoticeKind, message: &str) -> PluginResult<()> {
        let result = self.notices.add(kind, message);
        if let Err(ref err) = result {
            self.log_recoverable("add_notice", err);
        }
        result
    }

    /// Ask the host to run `hook` for this plugin on a recurring interval.
    pub fn schedule_recurring(&self, hook: &str, interval: TaskInterval) -> PluginResult<()> {
        self.services
            .scheduler
            .schedule(&self.slug, ScheduledTask::recurring(hook, interval))
    }

    /// Drop every recurring task this plugin owns.
    pub fn clear_scheduled(&self) -> usize {
        self.services.scheduler.clear_owner(&self.slug)
    }

    /// Recurring tasks currently recorded for this plugin.
    pub fn scheduled_tasks(&self) -> Vec<ScheduledTask> {
        self.services.scheduler.tasks_for(&self.slug)
    }

    /// The shared hook registry, for registering filters.
    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Translate a key through this plugin's text domain, falling back to
    /// the key itself.
    pub fn text(&self, key: &str) -> String {
        self.services
            .text_domains
            .lookup(&self.text_domain, key)
            .unwrap_or_else(|| key.to_string())
    }

    fn log_recoverable(&self, operation: &str, err: &super::error::PluginError) {
        if self.settings.debug && err.is_recoverable() {
            warn!("[{}] {} rejected: {}", self.slug, operation, err);
        }
    }
}
