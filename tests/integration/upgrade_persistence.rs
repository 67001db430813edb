//! Integration tests for upgrade and persistence across requests
//!
//! Each request is a fresh platform over the same JSON file store, the way
//! a real host would rebuild the world per request. Proves that defaults
//! land on first install, customizations survive upgrades, and the version
//! stamp only moves after a successful upgrade callback.

use std::sync::Arc;

use async_trait::async_trait;

use plugbase::config::PlatformConfig;
use plugbase::host::{HostServices, JsonFileOptionsStore};
use plugbase::platform::Platform;
use plugbase::plugin::{
    InstallState, OptionsMap, Plugin, PluginContext, PluginError, PluginManifest, PluginResult,
    PluginSource,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct CounterPlugin {
    manifest: PluginManifest,
    fail_upgrade: bool,
}

impl CounterPlugin {
    fn new(version: &str) -> Self {
        let manifest = PluginManifest::new(
            "Counter".to_string(),
            version.to_string(),
            "Counts things between requests".to_string(),
            "Integration Test".to_string(),
        );

        Self {
            manifest,
            fail_upgrade: false,
        }
    }

    fn with_failing_upgrade(mut self) -> Self {
        self.fail_upgrade = true;
        self
    }
}

#[async_trait]
impl Plugin for CounterPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn default_options(&self) -> OptionsMap {
        let mut defaults = OptionsMap::new();
        defaults.insert("count".to_string(), serde_json::json!(0));
        defaults.insert("label".to_string(), serde_json::json!("default"));
        defaults
    }

    async fn upgrade(
        &mut self,
        context: &PluginContext,
        previous_version: &str,
    ) -> PluginResult<()> {
        if self.fail_upgrade {
            return Err(PluginError::generic("upgrade rejected"));
        }
        context
            .set_option("upgraded_from", serde_json::json!(previous_version))
            .await;
        Ok(())
    }
}

fn file_backed_platform(dir: &std::path::Path) -> Platform {
    let services = HostServices::in_memory()
        .with_options_store(Arc::new(JsonFileOptionsStore::new(dir)));
    Platform::with_services(PlatformConfig::default().settings(), services)
}

async fn run_request(
    dir: &std::path::Path,
    plugin: CounterPlugin,
    mutate: impl FnOnce(&Platform, &str),
) -> InstallState {
    let mut platform = file_backed_platform(dir);
    let slug = platform
        .install(
            Box::new(plugin),
            PluginSource::new("plugins/counter/plugin.yaml"),
        )
        .await
        .unwrap();
    platform.boot().await;
    mutate(&platform, &slug);
    let state = platform.plugin(&slug).unwrap().install_state();
    platform.shutdown().await;
    state
}

#[tokio::test]
async fn test_options_survive_requests_and_upgrades() {
    init_logging();
    let temp = tempfile::TempDir::new().unwrap();

    // Request 1: first install writes defaults and stamps 1.0.0
    let state = run_request(temp.path(), CounterPlugin::new("1.0.0"), |_, _| {}).await;
    assert_eq!(state, InstallState::Installed);
    assert!(temp.path().join("counter.json").exists());

    // Request 2: same version customizes an option
    {
        let mut platform = file_backed_platform(temp.path());
        let slug = platform
            .install(
                Box::new(CounterPlugin::new("1.0.0")),
                PluginSource::new("plugins/counter/plugin.yaml"),
            )
            .await
            .unwrap();
        platform.boot().await;

        let entry = platform.plugin(&slug).unwrap();
        assert_eq!(entry.install_state(), InstallState::Current);
        entry
            .context()
            .set_option("label", serde_json::json!("customized"))
            .await;
        platform.shutdown().await;
    }

    // Request 3: version bump upgrades, merging over the customization
    {
        let mut platform = file_backed_platform(temp.path());
        let slug = platform
            .install(
                Box::new(CounterPlugin::new("1.1.0")),
                PluginSource::new("plugins/counter/plugin.yaml"),
            )
            .await
            .unwrap();
        platform.boot().await;

        let entry = platform.plugin(&slug).unwrap();
        assert_eq!(entry.install_state(), InstallState::Current);

        let options = entry.options_snapshot().await;
        assert_eq!(options.version(), "1.1.0");
        assert_eq!(options.get("label"), Some(&serde_json::json!("customized")));
        assert_eq!(
            options.get("upgraded_from"),
            Some(&serde_json::json!("1.0.0"))
        );
        platform.shutdown().await;
    }

    // Request 4: steady state, no further upgrade
    let state = run_request(temp.path(), CounterPlugin::new("1.1.0"), |_, _| {}).await;
    assert_eq!(state, InstallState::Current);
}

#[tokio::test]
async fn test_failed_upgrade_is_retried_on_the_next_request() {
    init_logging();
    let temp = tempfile::TempDir::new().unwrap();

    let state = run_request(temp.path(), CounterPlugin::new("1.0.0"), |_, _| {}).await;
    assert_eq!(state, InstallState::Installed);

    // The bumped plugin refuses to upgrade; the stamp must not move
    let state = run_request(
        temp.path(),
        CounterPlugin::new("2.0.0").with_failing_upgrade(),
        |platform, slug| {
            assert_eq!(platform.plugin(slug).unwrap().notices().pending(), 1);
        },
    )
    .await;
    assert_eq!(state, InstallState::NeedsUpgrade);

    // A healthy request later completes the upgrade from 1.0.0
    {
        let mut platform = file_backed_platform(temp.path());
        let slug = platform
            .install(
                Box::new(CounterPlugin::new("2.0.0")),
                PluginSource::new("plugins/counter/plugin.yaml"),
            )
            .await
            .unwrap();
        platform.boot().await;

        let entry = platform.plugin(&slug).unwrap();
        assert_eq!(entry.install_state(), InstallState::Current);

        let options = entry.options_snapshot().await;
        assert_eq!(options.version(), "2.0.0");
        assert_eq!(
            options.get("upgraded_from"),
            Some(&serde_json::json!("1.0.0"))
        );
    }
}

#[tokio::test]
async fn test_from_config_persists_to_the_configured_directory() {
    init_logging();
    let temp = tempfile::TempDir::new().unwrap();

    let config = PlatformConfig {
        options_dir: Some(temp.path().to_path_buf()),
        ..PlatformConfig::default()
    };

    let mut platform = Platform::from_config(&config);
    platform
        .install(
            Box::new(CounterPlugin::new("1.0.0")),
            PluginSource::new("plugins/counter/plugin.yaml"),
        )
        .await
        .unwrap();
    platform.boot().await;
    platform.shutdown().await;

    let raw = std::fs::read_to_string(temp.path().join("counter.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["version"], serde_json::json!("1.0.0"));
    assert_eq!(parsed["count"], serde_json::json!(0));
}
