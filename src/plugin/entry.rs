//! Plugin Entry
//!
//! The per-plugin lifecycle driver. Installing a plugin creates one entry,
//! wires it into the fixed hook points, and runs the handler's construct
//! callback. From then on the entry drives every stage from hook
//! dispatches: the install/upgrade state machine at plugins-loaded,
//! guarded activation and deactivation, and options persistence at
//! shutdown.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use super::context::PluginContext;
use super::error::{PluginError, PluginResult};
use super::identity;
use super::notices::{AdminNotices, NoticeKind};
use super::options::{compare_versions, PluginOptions};
use super::traits::{Plugin, PluginManifest};
use crate::config::PlatformSettings;
use crate::hooks::{
    ActionHandler, ActionPayload, HookPoint, HookRegistry, ADMIN_NOTICES_FILTER, DEFAULT_PRIORITY,
};
use crate::host::HostServices;
use crate::version;

/// Explicit install context naming the plugin's own file.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSource {
    plugin_file: PathBuf,
}

impl PluginSource {
    pub fn new<P: Into<PathBuf>>(plugin_file: P) -> Self {
        Self { plugin_file: plugin_file.into() }
    }

    pub fn plugin_file(&self) -> &Path {
        &self.plugin_file
    }
}

/// Install/upgrade progress of a plugin's options record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// The state machine has not run yet this request
    Uninitialized,
    /// First install: defaults were written this request
    Installed,
    /// Stored version lags the declared version; upgrade pending or failed
    NeedsUpgrade,
    /// Stored record matches the declared version
    Current,
}

#[derive(Debug)]
struct EntryStatus {
    install_state: InstallState,
    active: bool,
}

/// One installed plugin: handler, manifest snapshot, options record,
/// notices and lifecycle state.
pub struct PluginEntry {
    shared: Arc<EntryShared>,
}

struct EntryShared {
    manifest: PluginManifest,
    handler: Mutex<Box<dyn Plugin>>,
    status: parking_lot::RwLock<EntryStatus>,
    context: PluginContext,
}

impl PluginEntry {
    /// Validate the source, run the handler's construct callback, and wire
    /// the entry into the hook registry.
    ///
    /// Fails fast with a fatal error when the plugin file is unresolvable,
    /// the manifest targets an incompatible API version, or the construct
    /// callback errors; nothing is wired on failure.
    pub(crate) async fn install(
        mut handler: Box<dyn Plugin>,
        source: PluginSource,
        settings: PlatformSettings,
        services: HostServices,
        hooks: Arc<HookRegistry>,
    ) -> PluginResult<Self> {
        let plugin_file = source.plugin_file;
        if plugin_file.as_os_str().is_empty() {
            return Err(PluginError::install_failed("plugin file path is empty"));
        }
        let slug = identity::derive_slug(&plugin_file)?;
        let plugin_dir = plugin_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let manifest = handler.manifest().clone();
        if !version::is_api_compatible(manifest.api_version as i64) {
            return Err(PluginError::version_incompatible(format!(
                "Plugin '{}' targets API version {} but the platform provides {}",
                manifest.name,
                manifest.api_version,
                version::get_api_version()
            )));
        }

        let text_domain = manifest.text_domain_or(&slug).to_string();
        let options = Arc::new(RwLock::new(PluginOptions::from_defaults(
            handler.default_options(),
            &manifest.version,
        )));
        let notices = Arc::new(AdminNotices::new());

        let context = PluginContext {
            slug: slug.clone(),
            plugin_file,
            plugin_dir,
            text_domain,
            settings,
            options,
            notices,
            services,
            hooks: Arc::clone(&hooks),
        };

        handler.construct(&context).await.map_err(|err| {
            PluginError::install_failed(format!(
                "construct callback failed for '{}': {}",
                slug, err
            ))
        })?;

        let shared = Arc::new(EntryShared {
            manifest,
            handler: Mutex::new(handler),
            status: parking_lot::RwLock::new(EntryStatus {
                install_state: InstallState::Uninitialized,
                active: false,
            }),
            context,
        });

        hooks.add_action(Arc::new(EntryHook { shared: Arc::clone(&shared) }));

        let filter_shared = Arc::clone(&shared);
        hooks.add_filter(
            ADMIN_NOTICES_FILTER,
            shared.slug(),
            DEFAULT_PRIORITY,
            move |value: Value| {
                let mut markup = value.as_str().unwrap_or_default().to_string();
                markup.push_str(&filter_shared.context.notices.render_once());
                Value::String(markup)
            },
        );

        info!(
            "[{}] installed plugin '{}' {}",
            shared.slug(),
            shared.manifest.name,
            shared.manifest.version
        );
        Ok(Self { shared })
    }

    pub fn slug(&self) -> &str {
        self.shared.slug()
    }

    pub fn plugin_file(&self) -> &Path {
        &self.shared.context.plugin_file
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.shared.manifest
    }

    pub fn install_state(&self) -> InstallState {
        self.shared.status.read().install_state
    }

    pub fn is_active(&self) -> bool {
        self.shared.status.read().active
    }

    /// This plugin's notice accumulator.
    pub fn notices(&self) -> &AdminNotices {
        &self.shared.context.notices
    }

    /// The context handed to this plugin's callbacks.
    pub fn context(&self) -> &PluginContext {
        &self.shared.context
    }

    /// A point-in-time copy of the options record.
    pub async fn options_snapshot(&self) -> PluginOptions {
        self.shared.context.options.read().await.clone()
    }
}

impl EntryShared {
    fn slug(&self) -> &str {
        &self.context.slug
    }

    fn set_install_state(&self, state: InstallState) {
        self.status.write().install_state = state;
    }

    async fn on_plugins_loaded(&self) -> PluginResult<()> {
        self.run_options_state_machine().await?;
        self.load_text_domain();

        let mut handler = self.handler.lock().await;
        handler
            .loaded(&self.context)
            .await
            .map_err(|err| PluginError::lifecycle_failed("loaded", err.to_string()))
    }

    /// Decide between first install, upgrade and steady state from the
    /// stored record.
    async fn run_options_state_machine(&self) -> PluginResult<()> {
        let declared = self.manifest.version.clone();
        let defaults = { self.handler.lock().await.default_options() };
        let stored = self.context.services.options.load(self.slug()).await?;

        match stored {
            None => {
                let record = PluginOptions::from_defaults(defaults, &declared);
                self.context.services.options.save(self.slug(), &record).await?;
                *self.context.options.write().await = record;
                self.set_install_state(InstallState::Installed);
                info!(
                    "[{}] installed default options (version {})",
                    self.slug(),
                    declared
                );
                Ok(())
            }
            Some(stored_record) if compare_versions(&declared, stored_record.version())
                == Ordering::Greater =>
            {
                self.set_install_state(InstallState::NeedsUpgrade);
                let previous = stored_record.version().to_string();

                // Stored values win; new default keys are added
                let merged = stored_record.merged_over_defaults(&defaults);
                *self.context.options.write().await = merged;
                info!(
                    "[{}] upgrading options {} -> {}",
                    self.slug(),
                    previous,
                    declared
                );

                let upgraded = {
                    let mut handler = self.handler.lock().await;
                    handler.upgrade(&self.context, &previous).await
                };
                match upgraded {
                    Ok(()) => {
                        // Version is stamped only after the callback succeeds
                        self.context.options.write().await.set_version(&declared);
                        self.set_install_state(InstallState::Current);
                        debug!("[{}] upgrade complete", self.slug());
                        Ok(())
                    }
                    Err(err) => {
                        error!("[{}] upgrade callback failed: {}", self.slug(), err);
                        let _ = self.context.add_notice(
                            NoticeKind::Error,
                            &format!(
                                "Upgrade of '{}' to {} failed: {}",
                                self.manifest.name, declared, err
                            ),
                        );
                        Err(PluginError::lifecycle_failed("upgrade", err.to_string()))
                    }
                }
            }
            Some(stored_record) => {
                *self.context.options.write().await = stored_record;
                self.set_install_state(InstallState::Current);
                debug!("[{}] options current at version {}", self.slug(), declared);
                Ok(())
            }
        }
    }

    fn load_text_domain(&self) {
        let languages_dir = self.context.plugin_dir.join("languages");
        let loaded = self.context.services.text_domains.load_text_domain(
            &self.context.text_domain,
            &languages_dir,
            &self.context.settings.locale,
        );
        match loaded {
            Ok(true) => debug!(
                "[{}] text domain '{}' loaded",
                self.slug(),
                self.context.text_domain
            ),
            Ok(false) => debug!(
                "[{}] no translation catalog for locale {}",
                self.slug(),
                self.context.settings.locale
            ),
            Err(err) => warn!("[{}] text domain load failed: {}", self.slug(), err),
        }
    }

    async fn on_init(&self) -> PluginResult<()> {
        let mut handler = self.handler.lock().await;
        handler
            .initialize(&self.context)
            .await
            .map_err(|err| PluginError::lifecycle_failed("initialize", err.to_string()))
    }

    async fn on_activate(&self, payload: &ActionPayload) -> PluginResult<()> {
        // The event must concern this exact plugin file
        if !payload.targets(&self.context.plugin_file) {
            return Ok(());
        }

        if let Some(required) = self.manifest.requires_platform.as_deref() {
            let running = &self.context.settings.platform_version;
            if compare_versions(required, running) == Ordering::Greater {
                let message = format!(
                    "'{}' requires platform {} but this platform is {}",
                    self.manifest.name, required, running
                );
                error!("[{}] activation refused: {}", self.slug(), message);
                let _ = self.context.add_notice(NoticeKind::Error, &message);
                self.status.write().active = false;
                return Err(PluginError::version_incompatible(message));
            }
        }

        let activated = {
            let mut handler = self.handler.lock().await;
            handler.activate(&self.context).await
        };
        match activated {
            Ok(()) => {
                self.status.write().active = true;
                info!("[{}] activated", self.slug());
                Ok(())
            }
            Err(err) => {
                self.status.write().active = false;
                let _ = self.context.add_notice(
                    NoticeKind::Error,
                    &format!("Activation of '{}' failed: {}", self.manifest.name, err),
                );
                Err(PluginError::lifecycle_failed("activate", err.to_string()))
            }
        }
    }

    async fn on_deactivate(&self, payload: &ActionPayload) -> PluginResult<()> {
        if !payload.targets(&self.context.plugin_file) {
            return Ok(());
        }

        let deactivated = {
            let mut handler = self.handler.lock().await;
            handler.deactivate(&self.context).await
        };

        // Schedules are cleared and the plugin marked inactive even when
        // the callback fails
        let cleared = self.context.clear_scheduled();
        if cleared > 0 {
            debug!("[{}] cleared {} scheduled task(s)", self.slug(), cleared);
        }
        self.status.write().active = false;
        info!("[{}] deactivated", self.slug());

        deactivated.map_err(|err| PluginError::lifecycle_failed("deactivate", err.to_string()))
    }

    async fn on_shutdown(&self) -> PluginResult<()> {
        let terminated = {
            let mut handler = self.handler.lock().await;
            handler.terminate(&self.context).await
        };
        if let Err(ref err) = terminated {
            warn!("[{}] terminate callback failed: {}", self.slug(), err);
        }

        if self.status.read().install_state == InstallState::Uninitialized {
            debug!(
                "[{}] skipping options persist; plugins-loaded never ran",
                self.slug()
            );
        } else {
            // The whole record persists at request shutdown whether or not
            // it changed
            let snapshot = self.context.options.read().await.clone();
            self.context
                .services
                .options
                .save(self.slug(), &snapshot)
                .await?;
            debug!("[{}] options persisted at request shutdown", self.slug());
        }

        terminated.map_err(|err| PluginError::lifecycle_failed("terminate", err.to_string()))
    }
}

struct EntryHook {
    shared: Arc<EntryShared>,
}

#[async_trait::async_trait]
impl ActionHandler for EntryHook {
    fn id(&self) -> &str {
        self.shared.slug()
    }

    fn points(&self) -> Vec<HookPoint> {
        vec![
            HookPoint::PluginsLoaded,
            HookPoint::Init,
            HookPoint::ActivatePlugin,
            HookPoint::DeactivatePlugin,
            HookPoint::Shutdown,
        ]
    }

    async fn handle(&self, point: HookPoint, payload: &ActionPayload) -> PluginResult<()> {
        match point {
            HookPoint::PluginsLoaded => self.shared.on_plugins_loaded().await,
            HookPoint::Init => self.shared.on_init().await,
            HookPoint::ActivatePlugin => self.shared.on_activate(payload).await,
            HookPoint::DeactivatePlugin => self.shared.on_deactivate(payload).await,
            HookPoint::Shutdown => self.shared.on_shutdown().await,
        }
    }
}
