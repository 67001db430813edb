//! Integration tests for discovery-driven installation
//!
//! Scans a plugins directory the way a host would at startup, pairs each
//! discovered manifest with a handler, and boots the resulting platform.

use std::fs;
use std::path::Path;

use async_trait::async_trait;

use plugbase::config::PlatformConfig;
use plugbase::platform::Platform;
use plugbase::plugin::{
    DiscoveredPlugin, InstallState, ManifestDiscovery, Plugin, PluginDiscovery, PluginManifest,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Handler carrying nothing but its manifest; base behavior does the rest.
struct ManifestOnlyPlugin {
    manifest: PluginManifest,
}

impl ManifestOnlyPlugin {
    fn from_discovered(discovered: &DiscoveredPlugin) -> Self {
        Self {
            manifest: discovered.manifest.clone(),
        }
    }
}

#[async_trait]
impl Plugin for ManifestOnlyPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }
}

fn write_manifest(plugins_dir: &Path, plugin: &str, yaml: &str) {
    let dir = plugins_dir.join(plugin);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("plugin.yaml"), yaml).unwrap();
}

#[tokio::test]
async fn test_discovered_plugins_install_and_boot() {
    init_logging();
    let temp = tempfile::TempDir::new().unwrap();
    let plugins_dir = temp.path().join("plugins");
    let options_dir = temp.path().join("options");
    fs::create_dir_all(&plugins_dir).unwrap();

    write_manifest(
        &plugins_dir,
        "site-analytics",
        "name: Site Analytics\nversion: \"1.3.0\"\ndescription: Page view counters\nauthor: Example Author\ntext_domain: site-analytics\n",
    );
    write_manifest(
        &plugins_dir,
        "contact-form",
        "name: Contact Form\nversion: \"2.1.0\"\ndescription: Contact form shortcode\nauthor: Example Author\n",
    );
    // A manifest no entry could be installed from
    write_manifest(&plugins_dir, "broken", "name: Broken\nversion: nope\n");

    let config = PlatformConfig {
        plugins_dir: Some(plugins_dir.clone()),
        options_dir: Some(options_dir.clone()),
        ..PlatformConfig::default()
    };

    let discovery = ManifestDiscovery::new(config.plugins_dir.as_ref().unwrap()).unwrap();
    let discovered = discovery.discover().await.unwrap();
    assert_eq!(discovered.len(), 2);

    let mut platform = Platform::from_config(&config);
    for plugin in &discovered {
        let handler = Box::new(ManifestOnlyPlugin::from_discovered(plugin));
        platform
            .install(handler, plugin.source.clone())
            .await
            .unwrap();
    }

    assert_eq!(platform.slugs(), vec!["contact-form", "site-analytics"]);

    let outcome = platform.boot().await;
    assert_eq!(outcome.failures, 0);

    for slug in platform.slugs() {
        assert_eq!(
            platform.plugin(&slug).unwrap().install_state(),
            InstallState::Installed
        );
    }

    platform.shutdown().await;
    assert!(options_dir.join("site-analytics.json").exists());
    assert!(options_dir.join("contact-form.json").exists());
}

#[tokio::test]
async fn test_discovered_manifest_drives_the_entry_identity() {
    init_logging();
    let temp = tempfile::TempDir::new().unwrap();

    write_manifest(
        temp.path(),
        "site-analytics",
        "name: Site Analytics\nversion: \"1.3.0\"\ntext_domain: analytics-domain\n",
    );

    let discovery = ManifestDiscovery::new(temp.path()).unwrap();
    let discovered = discovery.discover().await.unwrap();
    assert_eq!(discovered.len(), 1);
    assert_eq!(discovered[0].slug().unwrap(), "site-analytics");

    let mut platform = Platform::new();
    let slug = platform
        .install(
            Box::new(ManifestOnlyPlugin::from_discovered(&discovered[0])),
            discovered[0].source.clone(),
        )
        .await
        .unwrap();

    let entry = platform.plugin(&slug).unwrap();
    assert_eq!(entry.manifest().name, "Site Analytics");
    assert_eq!(entry.context().text_domain(), "analytics-domain");
    assert_eq!(
        entry.plugin_file(),
        temp.path().join("site-analytics").join("plugin.yaml")
    );
}

#[tokio::test]
async fn test_rediscovery_after_install_is_stable() {
    init_logging();
    let temp = tempfile::TempDir::new().unwrap();

    write_manifest(
        temp.path(),
        "stable",
        "name: Stable\nversion: \"1.0.0\"\n",
    );

    let discovery = ManifestDiscovery::new(temp.path()).unwrap();
    let first = discovery.discover().await.unwrap();
    let second = discovery.discover().await.unwrap();

    assert_eq!(first, second);
}
