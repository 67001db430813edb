//! Lifecycle hook point definitions and action payloads.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default handler priority; lower values dispatch earlier.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Name of the built-in filter through which admin notice markup flows.
pub const ADMIN_NOTICES_FILTER: &str = "admin_notices";

/// Enumeration of the fixed lifecycle hook points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Fired once every plugin is installed for the request.
    PluginsLoaded,
    /// Fired after the loaded stage, once per request.
    Init,
    /// Fired when a specific plugin is being activated.
    ActivatePlugin,
    /// Fired when a specific plugin is being deactivated.
    DeactivatePlugin,
    /// Fired at request teardown.
    Shutdown,
}

impl HookPoint {
    /// Returns the string name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PluginsLoaded => "plugins_loaded",
            Self::Init => "init",
            Self::ActivatePlugin => "activate_plugin",
            Self::DeactivatePlugin => "deactivate_plugin",
            Self::Shutdown => "shutdown",
        }
    }

    /// Whether dispatches at this point target a single plugin file.
    pub fn is_targeted(&self) -> bool {
        matches!(self, Self::ActivatePlugin | Self::DeactivatePlugin)
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Data passed along with an action dispatch.
///
/// Activation and deactivation dispatches name the plugin file they target;
/// handlers for other plugins treat the event as a no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    pub plugin_file: Option<PathBuf>,
}

impl ActionPayload {
    /// Payload for an untargeted broadcast.
    pub fn broadcast() -> Self {
        Self { plugin_file: None }
    }

    /// Payload targeting one plugin file.
    pub fn for_plugin_file<P: Into<PathBuf>>(plugin_file: P) -> Self {
        Self { plugin_file: Some(plugin_file.into()) }
    }

    /// Whether this payload targets exactly the given plugin file.
    pub fn targets(&self, plugin_file: &Path) -> bool {
        self.plugin_file.as_deref() == Some(plugin_file)
    }
}
