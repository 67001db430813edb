//! Plugin Error Types
//!
//! Comprehensive error handling for plugin lifecycle operations with
//! context-aware error types.

use thiserror::Error;

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Comprehensive error types for plugin lifecycle operations
#[derive(Error, Debug, Clone)]
pub enum PluginError {
    /// Plugin installation failed
    #[error("Plugin installation failed: {message}")]
    InstallFailed { message: String },

    /// Plugin already installed under this slug
    #[error("Plugin already installed: {slug}")]
    AlreadyInstalled { slug: String },

    /// Plugin not found
    #[error("Plugin not found: {slug}")]
    PluginNotFound { slug: String },

    /// Version compatibility error
    #[error("Version compatibility error: {message}")]
    VersionIncompatible { message: String },

    /// A lifecycle callback returned an error
    #[error("Lifecycle callback '{stage}' failed: {message}")]
    LifecycleFailed { stage: String, message: String },

    /// Options record or options store error
    #[error("Options error: {message}")]
    OptionsError { message: String },

    /// Manifest parsing or validation error
    #[error("Manifest error: {message}")]
    ManifestError { message: String },

    /// Plugin discovery error
    #[error("Plugin discovery error: {message}")]
    DiscoveryError { message: String },

    /// Notice rejected because the message was empty
    #[error("Notice rejected: message is empty")]
    EmptyNotice,

    /// Notice added after the request already rendered its notices
    #[error("Notices already rendered for this request")]
    NoticesSpent,

    /// Task scheduling error
    #[error("Scheduler error: {message}")]
    SchedulerError { message: String },

    /// Generic plugin error
    #[error("Plugin error: {message}")]
    Generic { message: String },
}

impl PluginError {
    /// Create an installation error
    pub fn install_failed<S: Into<String>>(message: S) -> Self {
        Self::InstallFailed { message: message.into() }
    }

    /// Create an already installed error
    pub fn already_installed<S: Into<String>>(slug: S) -> Self {
        Self::AlreadyInstalled { slug: slug.into() }
    }

    /// Create a plugin not found error
    pub fn plugin_not_found<S: Into<String>>(slug: S) -> Self {
        Self::PluginNotFound { slug: slug.into() }
    }

    /// Create a version incompatible error
    pub fn version_incompatible<S: Into<String>>(message: S) -> Self {
        Self::VersionIncompatible { message: message.into() }
    }

    /// Create a lifecycle callback error
    pub fn lifecycle_failed<S: Into<String>, M: Into<String>>(stage: S, message: M) -> Self {
        Self::LifecycleFailed { stage: stage.into(), message: message.into() }
    }

    /// Create an options error
    pub fn options_error<S: Into<String>>(message: S) -> Self {
        Self::OptionsError { message: message.into() }
    }

    /// Create a manifest error
    pub fn manifest_error<S: Into<String>>(message: S) -> Self {
        Self::ManifestError { message: message.into() }
    }

    /// Create a discovery error
    pub fn discovery_error<S: Into<String>>(message: S) -> Self {
        Self::DiscoveryError { message: message.into() }
    }

    /// Create a scheduler error
    pub fn scheduler_error<S: Into<String>>(message: S) -> Self {
        Self::SchedulerError { message: message.into() }
    }

    /// Create a generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic { message: message.into() }
    }

    /// Check if the error is fatal for the request.
    ///
    /// Fatal errors are configuration-class failures raised while installing
    /// a plugin; the host is expected to abort the request rather than limp
    /// on with a half-wired plugin.
    pub fn is_fatal(&self) -> bool {
        matches!(self,
            PluginError::InstallFailed { .. } |
            PluginError::AlreadyInstalled { .. } |
            PluginError::VersionIncompatible { .. } |
            PluginError::ManifestError { .. } |
            PluginError::DiscoveryError { .. }
        )
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self,
            PluginError::LifecycleFailed { .. } |
            PluginError::OptionsError { .. } |
            PluginError::SchedulerError { .. } |
            PluginError::EmptyNotice |
            PluginError::NoticesSpent
        )
    }

    /// Check if the error is a notice accumulator misuse
    pub fn is_notice_error(&self) -> bool {
        matches!(self, PluginError::EmptyNotice | PluginError::NoticesSpent)
    }
}

// Allow conversion from common error types
impl From<std::io::Error> for PluginError {
    fn from(err: std::io::Error) -> Self {
        PluginError::generic(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        PluginError::options_error(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for PluginError {
    fn from(err: serde_yaml::Error) -> Self {
        PluginError::manifest_error(format!("YAML error: {}", err))
    }
}
