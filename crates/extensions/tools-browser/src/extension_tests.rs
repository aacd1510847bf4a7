use std::sync::Arc;

use agentpage_core::ToolRegistry;
use serde_json::json;

use super::*;

fn context(config: serde_json::Value, registry: Arc<ToolRegistry>) -> ExtensionContext {
    ExtensionContext::new(config, registry, PathBuf::from("."))
}

#[test]
fn test_extension_manifest() {
    let ext = BrowserToolsExtension::new();
    assert_eq!(ext.manifest().id, "tools-browser");
    assert_eq!(ext.manifest().name, "Browser Tools");
    assert!(ext.manifest().description.contains("CDP"));
    assert!(ext.manifest().provides_tool("browser_execute_action"));
}

#[test]
fn test_all_tools_provided() {
    let ext = BrowserToolsExtension::new();
    let tools = &ext.manifest().tools;
    assert_eq!(tools.len(), 9);
    for id in TOOL_IDS {
        assert!(tools.contains(&id.to_string()), "missing {id}");
    }
}

#[test]
fn test_builder_chain() {
    let ext = BrowserToolsExtension::new()
        .viewport(800, 600)
        .debug_port(9333)
        .headless(true)
        .profile_dir("/custom/profile");

    assert_eq!(ext.config.viewport_width, 800);
    assert_eq!(ext.config.viewport_height, 600);
    assert_eq!(ext.config.debug_port, 9333);
    assert!(ext.config.headless);
    assert_eq!(ext.config.profile_dir, Some(PathBuf::from("/custom/profile")));
}

#[test]
fn test_settle_and_walker_builders() {
    let settle = SettleConfig {
        dom_idle_ms: 300,
        ..Default::default()
    };
    let walker = WalkerConfig {
        max_nodes: 1000,
        ..Default::default()
    };
    let ext = BrowserToolsExtension::new()
        .settle_defaults(settle)
        .walker_limits(walker);

    assert_eq!(ext.config.settle.dom_idle_ms, 300);
    assert_eq!(ext.config.walker.max_nodes, 1000);
}

#[test]
fn test_from_config() {
    let mut config = Config::default();
    config.browser.debug_port = 9444;
    config.settle.global_timeout_ms = 5000;

    let ext = BrowserToolsExtension::from_config(&config);
    assert_eq!(ext.config.debug_port, 9444);
    assert_eq!(ext.config.settle.global_timeout_ms, 5000);
}

#[test]
fn test_manager_initially_none() {
    let ext = BrowserToolsExtension::new();
    assert!(ext.manager().is_none());
}

#[test]
fn test_as_any() {
    let ext: Box<dyn Extension> = Box::new(BrowserToolsExtension::new().debug_port(9333));
    let concrete = ext.as_any().downcast_ref::<BrowserToolsExtension>().unwrap();
    assert_eq!(concrete.config.debug_port, 9333);
}

#[tokio::test]
async fn test_initialize_registers_tools() {
    let registry = Arc::new(ToolRegistry::new());
    let mut ext = BrowserToolsExtension::new();

    ext.initialize(context(json!({}), registry.clone())).await.unwrap();

    assert_eq!(registry.len(), 9);
    for id in TOOL_IDS {
        assert!(registry.get(id).is_some(), "{id} not registered");
    }
    assert!(ext.manager().is_some());
}

#[tokio::test]
async fn test_initialize_applies_context_config() {
    let registry = Arc::new(ToolRegistry::new());
    let mut ext = BrowserToolsExtension::new();

    ext.initialize(context(
        json!({"settle": {"dom_idle_ms": 250}, "walker": {"max_nodes": 100}}),
        registry,
    ))
    .await
    .unwrap();

    let manager = ext.manager().unwrap();
    assert_eq!(manager.config().settle.dom_idle_ms, 250);
    assert_eq!(manager.config().walker.max_nodes, 100);
}

#[tokio::test]
async fn test_initialize_rejects_malformed_section() {
    let registry = Arc::new(ToolRegistry::new());
    let mut ext = BrowserToolsExtension::new();

    let err = ext
        .initialize(context(json!({"settle": {"dom_idle_ms": "soon"}}), registry.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtensionError::InvalidConfig { ref key, .. } if key == "settle"));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_initialize_twice_clashes() {
    let registry = Arc::new(ToolRegistry::new());
    BrowserToolsExtension::new()
        .initialize(context(json!({}), registry.clone()))
        .await
        .unwrap();

    let err = BrowserToolsExtension::new()
        .initialize(context(json!({}), registry))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtensionError::AlreadyRegistered(_)));
}

#[tokio::test]
async fn test_shutdown_without_browser() {
    let registry = Arc::new(ToolRegistry::new());
    let mut ext = BrowserToolsExtension::new();
    ext.initialize(context(json!({}), registry)).await.unwrap();

    assert!(ext.shutdown().await.is_ok());
}
