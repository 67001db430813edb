//! Integration tests for a complete simulated request
//!
//! Drives a platform through install, boot, activation, notice rendering,
//! deactivation and shutdown with plugins that exercise the context API
//! from inside their callbacks.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use plugbase::host::TaskInterval;
use plugbase::platform::Platform;
use plugbase::plugin::{
    NoticeKind, Plugin, PluginContext, PluginManifest, PluginResult, PluginSource,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Plugin that records callbacks and drives the context from inside them.
struct GreeterPlugin {
    manifest: PluginManifest,
    calls: Arc<Mutex<Vec<String>>>,
}

impl GreeterPlugin {
    fn new() -> Self {
        let manifest = PluginManifest::new(
            "Greeter".to_string(),
            "1.0.0".to_string(),
            "Greets the admin on activation".to_string(),
            "Integration Test".to_string(),
        );

        Self {
            manifest,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl Plugin for GreeterPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    async fn construct(&mut self, _context: &PluginContext) -> PluginResult<()> {
        self.record("construct");
        Ok(())
    }

    async fn loaded(&mut self, _context: &PluginContext) -> PluginResult<()> {
        self.record("loaded");
        Ok(())
    }

    async fn initialize(&mut self, _context: &PluginContext) -> PluginResult<()> {
        self.record("initialize");
        Ok(())
    }

    async fn activate(&mut self, context: &PluginContext) -> PluginResult<()> {
        self.record("activate");
        context.add_notice(NoticeKind::Updated, "Greeter is ready")?;
        context.schedule_recurring("greeter_digest", TaskInterval::Daily)?;
        Ok(())
    }

    async fn deactivate(&mut self, _context: &PluginContext) -> PluginResult<()> {
        self.record("deactivate");
        Ok(())
    }

    async fn terminate(&mut self, _context: &PluginContext) -> PluginResult<()> {
        self.record("terminate");
        Ok(())
    }
}

#[tokio::test]
async fn test_request_cycle_end_to_end() {
    init_logging();

    let mut platform = Platform::new();
    let plugin = GreeterPlugin::new();
    let calls = plugin.calls_handle();

    let slug = platform
        .install(
            Box::new(plugin),
            PluginSource::new("plugins/greeter/plugin.yaml"),
        )
        .await
        .unwrap();
    assert_eq!(slug, "greeter");

    let boot = platform.boot().await;
    assert_eq!(boot.failures, 0);

    let activation = platform.activate("plugins/greeter/plugin.yaml").await;
    assert_eq!(activation.failures, 0);

    let entry = platform.plugin(&slug).unwrap();
    assert!(entry.is_active());
    assert_eq!(entry.context().scheduled_tasks().len(), 1);

    // The activation notice renders exactly once per request
    let markup = platform.render_admin_notices();
    assert_eq!(
        markup,
        "<div class=\"updated\"><p>Greeter is ready</p></div>\n"
    );
    assert_eq!(platform.render_admin_notices(), "");

    platform.deactivate("plugins/greeter/plugin.yaml").await;
    assert!(!entry.is_active());
    assert!(entry.context().scheduled_tasks().is_empty());

    let shutdown = platform.shutdown().await;
    assert_eq!(shutdown.failures, 0);

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            "construct",
            "loaded",
            "initialize",
            "activate",
            "deactivate",
            "terminate"
        ]
    );
}

#[tokio::test]
async fn test_two_plugins_share_one_request() {
    init_logging();

    let mut platform = Platform::new();
    let greeter = GreeterPlugin::new();
    let bystander = GreeterPlugin::new();
    let bystander_calls = bystander.calls_handle();

    platform
        .install(
            Box::new(greeter),
            PluginSource::new("plugins/greeter/plugin.yaml"),
        )
        .await
        .unwrap();
    platform
        .install(
            Box::new(bystander),
            PluginSource::new("plugins/bystander/plugin.yaml"),
        )
        .await
        .unwrap();

    platform.boot().await;
    platform.activate("plugins/greeter/plugin.yaml").await;

    // The bystander booted but never activated
    let recorded = bystander_calls.lock().unwrap().clone();
    assert!(recorded.contains(&"loaded".to_string()));
    assert!(recorded.contains(&"initialize".to_string()));
    assert!(!recorded.contains(&"activate".to_string()));

    assert!(platform.plugin("greeter").unwrap().is_active());
    assert!(!platform.plugin("bystander").unwrap().is_active());
}

#[tokio::test]
async fn test_filter_chain_reaches_every_plugin() {
    init_logging();

    let mut platform = Platform::new();
    platform
        .install(
            Box::new(GreeterPlugin::new()),
            PluginSource::new("plugins/aaa/plugin.yaml"),
        )
        .await
        .unwrap();
    platform
        .install(
            Box::new(GreeterPlugin::new()),
            PluginSource::new("plugins/bbb/plugin.yaml"),
        )
        .await
        .unwrap();

    platform.boot().await;
    platform.activate("plugins/aaa/plugin.yaml").await;
    platform.activate("plugins/bbb/plugin.yaml").await;

    let markup = platform.render_admin_notices();
    let blocks = markup.matches("<div class=\"updated\">").count();
    assert_eq!(blocks, 2);
}
