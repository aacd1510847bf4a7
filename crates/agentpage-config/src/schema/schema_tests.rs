use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.browser.debug_port, 9222);
    assert!(!config.browser.headless);
    assert_eq!(config.settle.dom_idle_ms, 500);
    assert_eq!(config.settle.global_timeout_ms, 10_000);
    assert_eq!(config.walker.max_nodes, 20_000);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_browser_config_default() {
    let browser = BrowserConfig::default();
    assert_eq!(browser.viewport_width, 1280);
    assert_eq!(browser.viewport_height, 720);
    assert_eq!(browser.command_timeout_ms, 60_000);
    assert!(browser.profile_dir.is_none());
}

#[test]
fn test_resolved_profile_dir() {
    let mut browser = BrowserConfig::default();
    assert!(browser.resolved_profile_dir().ends_with(".agentpage/browser-profile"));

    browser.profile_dir = Some("/tmp/profile".into());
    assert_eq!(browser.resolved_profile_dir(), std::path::PathBuf::from("/tmp/profile"));
}

#[test]
fn test_settle_config_default() {
    let settle = SettleConfig::default();
    assert_eq!(settle.network_idle_ms, 500);
    assert_eq!(settle.dialog_timeout_ms, 1_000);
    assert_eq!(settle.grace_ms, 100);
    assert!(settle.ignored_selectors.is_empty());
    assert!(settle.loading_selectors.is_empty());
}

#[test]
fn test_walker_config_default() {
    let walker = WalkerConfig::default();
    assert_eq!(walker.max_text_len, 200);
    assert_eq!(walker.option_preview, 5);
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let config: Config = toml::from_str(
        r#"
        [settle]
        dom_idle_ms = 250
        ignored_attributes = ["data-ts"]
        "#,
    )
    .unwrap();
    assert_eq!(config.settle.dom_idle_ms, 250);
    assert_eq!(config.settle.network_idle_ms, 500);
    assert_eq!(config.settle.ignored_attributes, vec!["data-ts"]);
    assert_eq!(config.browser.debug_port, 9222);
}

#[test]
fn test_config_serialization_roundtrip() {
    let config = Config::default();
    let text = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed.walker.max_nodes, config.walker.max_nodes);
    assert_eq!(parsed.logging.dir, config.logging.dir);
}
