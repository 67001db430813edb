//! Plugin API Version Management
//!
//! Provides build-time API version reading from Cargo.toml metadata.
//! The version is defined in Cargo.toml under package.metadata.plugbase.api_version
//! and ensures reproducible builds across all developers and environments.

// Include the build-generated API version constant
include!(concat!(env!("OUT_DIR"), "/version_api.rs"));

/// Get the current plugin API version.
///
/// The version is defined in package.metadata.plugbase.api_version and
/// provides reproducible builds - same source code always produces the same
/// API version.
///
/// To increment the API version:
/// 1. Edit Cargo.toml: package.metadata.plugbase.api_version = NEW_VERSION
/// 2. Commit the change to source control
/// 3. Build - new version will be used
///
/// Version format: YYYYMMDD (e.g., 20250810 = 10 August 2025)
pub fn get_api_version() -> i64 {
    BASE_API_VERSION
}

/// Check whether a plugin's target API version is compatible with this
/// build's API version. Versions are compatible when the year part matches.
pub fn is_api_compatible(plugin_api_version: i64) -> bool {
    plugin_api_version / 10000 == get_api_version() / 10000
}

/// Convert a YYYYMMDD version to a human-readable date string.
pub fn api_version_date(version: i64) -> String {
    let year = version / 10000;
    let month = (version % 10000) / 100;
    let day = version % 100;
    format!("{year:04}-{month:02}-{day:02}")
}
