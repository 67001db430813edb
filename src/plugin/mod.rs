//! Plugin System Module
//!
//! Provides the base behavior every plugin inherits: lifecycle dispatch
//! from the platform's fixed hook points, an install/upgrade state machine
//! over the stored options record, file-guarded activation, and render-once
//! admin notices.
//!
//! # Example Usage
//!
//! ```no_run
//! use plugbase::platform::Platform;
//! use plugbase::plugin::PluginSource;
//!
//! # async fn run(handler: Box<dyn plugbase::plugin::Plugin>) -> plugbase::plugin::PluginResult<()> {
//! let mut platform = Platform::new();
//! platform.install(handler, PluginSource::new("plugins/acme/plugin.yaml")).await?;
//! platform.boot().await;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod discovery;
pub mod entry;
pub mod error;
pub mod identity;
pub mod notices;
pub mod options;
pub mod traits;

#[cfg(test)]
pub mod tests;

// Re-export core types for easier access
pub use error::{PluginError, PluginResult};
pub use traits::{Plugin, PluginManifest};

// Per-plugin runtime pieces
pub use context::PluginContext;
pub use entry::{InstallState, PluginEntry, PluginSource};
pub use notices::{AdminNotices, NoticeKind};
pub use options::{OptionsMap, PluginOptions};

// Discovery
pub use discovery::{DiscoveredPlugin, ManifestDiscovery, PluginDiscovery};
