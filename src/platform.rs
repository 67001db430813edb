//! Platform Runtime
//!
//! The request-scoped host runtime. A platform owns the hook registry, the
//! host service bundle and every installed plugin entry; one instance
//! models one request from plugins-loaded through shutdown.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use serde_json::Value;
use uuid::Uuid;

use crate::config::{PlatformConfig, PlatformSettings};
use crate::hooks::{
    ActionPayload, DispatchOutcome, HookPoint, HookRegistry, ADMIN_NOTICES_FILTER,
};
use crate::host::{HostServices, JsonFileOptionsStore};
use crate::plugin::entry::{PluginEntry, PluginSource};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::identity;
use crate::plugin::traits::Plugin;

/// Request-scoped plugin host.
pub struct Platform {
    settings: PlatformSettings,
    request_id: Uuid,
    hooks: Arc<HookRegistry>,
    services: HostServices,
    entries: HashMap<String, PluginEntry>,
}

impl Platform {
    /// Platform with default settings and in-memory host services.
    pub fn new() -> Self {
        Self::with_services(PlatformConfig::default().settings(), HostServices::in_memory())
    }

    pub fn with_services(settings: PlatformSettings, services: HostServices) -> Self {
        let request_id = Uuid::now_v7();
        debug!("Platform request {} started", request_id);

        Self {
            settings,
            request_id,
            hooks: Arc::new(HookRegistry::new()),
            services,
            entries: HashMap::new(),
        }
    }

    /// Build a platform from configuration. A configured options directory
    /// switches persistence to JSON files under it.
    pub fn from_config(config: &PlatformConfig) -> Self {
        let services = match &config.options_dir {
            Some(dir) => HostServices::in_memory()
                .with_options_store(Arc::new(JsonFileOptionsStore::new(dir))),
            None => HostServices::in_memory(),
        };

        Self::with_services(config.settings(), services)
    }

    /// Install a plugin handler, returning the slug it registered under.
    ///
    /// Fails without side effects when the slug is already taken or the
    /// entry rejects the handler.
    pub async fn install(
        &mut self,
        handler: Box<dyn Plugin>,
        source: PluginSource,
    ) -> PluginResult<String> {
        let slug = identity::derive_slug(source.plugin_file())?;
        if self.entries.contains_key(&slug) {
            return Err(PluginError::already_installed(&slug));
        }

        let entry = PluginEntry::install(
            handler,
            source,
            self.settings.clone(),
            self.services.clone(),
            Arc::clone(&self.hooks),
        )
        .await?;

        info!("Platform installed plugin '{}'", slug);
        self.entries.insert(slug.clone(), entry);
        Ok(slug)
    }

    /// Run the boot sequence: plugins-loaded, then init.
    pub async fn boot(&self) -> DispatchOutcome {
        let payload = ActionPayload::broadcast();
        let loaded = self.hooks.do_action(HookPoint::PluginsLoaded, &payload).await;
        let init = self.hooks.do_action(HookPoint::Init, &payload).await;

        DispatchOutcome {
            dispatched: loaded.dispatched + init.dispatched,
            failures: loaded.failures + init.failures,
        }
    }

    /// Fire the activation hook targeted at one plugin file. Entries for
    /// other files ignore the event.
    pub async fn activate<P: Into<PathBuf>>(&self, plugin_file: P) -> DispatchOutcome {
        self.hooks
            .do_action(
                HookPoint::ActivatePlugin,
                &ActionPayload::for_plugin_file(plugin_file),
            )
            .await
    }

    /// Fire the deactivation hook targeted at one plugin file.
    pub async fn deactivate<P: Into<PathBuf>>(&self, plugin_file: P) -> DispatchOutcome {
        self.hooks
            .do_action(
                HookPoint::DeactivatePlugin,
                &ActionPayload::for_plugin_file(plugin_file),
            )
            .await
    }

    /// Collect every plugin's pending notices as ready-to-emit markup.
    ///
    /// Each entry contributes through the admin-notices filter chain; a
    /// second call within the same request yields an empty string.
    pub fn render_admin_notices(&self) -> String {
        let rendered = self
            .hooks
            .apply_filters(ADMIN_NOTICES_FILTER, Value::String(String::new()));
        rendered.as_str().unwrap_or_default().to_string()
    }

    /// Fire the shutdown hook; every entry runs its terminate callback and
    /// persists its options record.
    pub async fn shutdown(&self) -> DispatchOutcome {
        self.hooks
            .do_action(HookPoint::Shutdown, &ActionPayload::broadcast())
            .await
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn settings(&self) -> &PlatformSettings {
        &self.settings
    }

    pub fn services(&self) -> &HostServices {
        &self.services
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Look up an installed plugin by slug.
    pub fn plugin(&self, slug: &str) -> Option<&PluginEntry> {
        self.entries.get(slug)
    }

    /// Slugs of every installed plugin, sorted.
    pub fn slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self.entries.keys().cloned().collect();
        slugs.sort();
        slugs
    }

    pub fn plugin_count(&self) -> usize {
        self.entries.len()
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new()
    }
}
