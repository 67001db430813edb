//! Plugin Identity Derivation
//!
//! Derives the stable plugin identifier (slug) from the plugin's file path.
//! The slug doubles as the persisted-options key and the default text domain,
//! so derivation is deterministic and fails fast when no identifier can be
//! produced.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::error::{PluginError, PluginResult};

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9_-]+").unwrap())
}

/// Normalize a raw name into slug form: lowercase, with everything outside
/// `[a-z0-9_-]` stripped.
pub fn sanitize_slug(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    slug_pattern().replace_all(&lowered, "").into_owned()
}

/// Derive the plugin slug from the plugin's own file path.
///
/// The identifier is the sanitized name of the containing directory; a file
/// with no usable parent component falls back to its file stem. A path that
/// yields neither is a fatal installation error.
pub fn derive_slug(plugin_file: &Path) -> PluginResult<String> {
    if let Some(dir_name) = plugin_file.parent().and_then(|p| p.file_name()) {
        let slug = sanitize_slug(&dir_name.to_string_lossy());
        if !slug.is_empty() {
            return Ok(slug);
        }
    }

    if let Some(stem) = plugin_file.file_stem() {
        let slug = sanitize_slug(&stem.to_string_lossy());
        if !slug.is_empty() {
            return Ok(slug);
        }
    }

    Err(PluginError::install_failed(format!(
        "cannot derive plugin identifier from '{}'",
        plugin_file.display()
    )))
}
