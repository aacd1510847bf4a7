use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;

use super::*;
use crate::page::snapshot::fixtures::SnapshotBuilder;
use crate::testing::FakeDriver;

fn login_form(with_password: bool) -> Value {
    let mut b = SnapshotBuilder::new();
    let form = b.element(0, "form", json!({}));
    b.input(form, "email", json!({"id": "email"}), "");
    if with_password {
        b.input(form, "password", json!({"id": "password"}), "");
    }
    let button = b.element(form, "button", json!({"type": "submit"}));
    b.text(button, "Sign in");
    b.build()
}

/// A page whose snapshot is read from a shared slot.
fn page() -> (Arc<FakeDriver>, Arc<Mutex<Value>>, AgentPage) {
    let fake = Arc::new(FakeDriver::new());
    let snapshot = Arc::new(Mutex::new(login_form(false)));
    let slot = snapshot.clone();
    fake.on_invoke("snapshot", move |_| Ok(slot.lock().clone()));
    let page = AgentPage::new(fake.clone(), SettleOptions::default(), WalkerConfig::default());
    (fake, snapshot, page)
}

#[tokio::test]
async fn test_navigate_rejects_bad_urls() {
    let (fake, _, page) = page();

    for url in ["not a url", "javascript:alert(1)", ""] {
        let err = page.navigate(url).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidUrl { .. }), "{url}: {err}");
    }
    assert!(fake.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_navigate_settles_and_maps() {
    let (fake, _, page) = page();

    let navigation = page.navigate("https://example.com/login").await.unwrap();
    assert!(navigation.outcome.is_ok());
    let update = navigation.update;

    assert_eq!(fake.navigations(), vec!["https://example.com/login".to_string()]);
    let settle = update.settle.as_ref().unwrap();
    assert!(settle.navigated);
    assert!(update.content.contains("(ID: email)"));
    assert_eq!(update.manifest.url, "https://example.com/login");
    assert_eq!(update.diff.added.len(), 2);

    let tags = &fake.invocations("applyTags")[0][0];
    assert_eq!(tags[0], json!([2, "email", "input", "fill"]));
    assert!(page.manifest().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_navigation_failure_still_maps_current_document() {
    let (fake, _, page) = page();
    fake.fail_navigation(DriverError::Navigation("net::ERR_NAME_NOT_RESOLVED".into()));

    let navigation = page.navigate("https://nowhere.invalid/").await.unwrap();

    assert!(matches!(navigation.outcome, Err(DriverError::Navigation(_))));
    assert!(navigation.update.content.contains("(ID: email)"));
    assert!(!navigation.update.settle.unwrap().settled);
    assert!(page.manifest().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_navigation_failure_without_walkable_page_is_an_error() {
    let (fake, _, page) = page();
    fake.fail_navigation(DriverError::Navigation("net::ERR_NAME_NOT_RESOLVED".into()));
    fake.on_invoke("snapshot", |_| Err(DriverError::Closed));

    let err = page.navigate("https://nowhere.invalid/").await.unwrap_err();
    assert!(matches!(err, AgentError::Driver(DriverError::Navigation(_))));
}

#[tokio::test(start_paused = true)]
async fn test_slow_load_is_not_cut_by_settle_timeout() {
    let (fake, _, page) = page();
    fake.delay_navigation(Duration::from_secs(15));
    assert!(page.settle_defaults().global_timeout < Duration::from_secs(15));

    let navigation = page.navigate("https://example.com/slow").await.unwrap();

    assert!(navigation.outcome.is_ok());
    assert!(navigation.update.settle.unwrap().settled);
}

#[tokio::test(start_paused = true)]
async fn test_failed_dispatch_still_returns_manifest() {
    let (fake, _, page) = page();
    fake.on_invoke("execute", |_| {
        Ok(json!({"ok": false, "error": "ElementNotFound", "message": "gone"}))
    });

    let report = page
        .execute_action("missing-id", ActionParams::default(), true)
        .await
        .unwrap();

    let err = report.outcome.unwrap_err();
    assert!(err.to_string().contains("missing-id"));
    assert!(report.update.content.contains("(ID: email)"));
    assert!(!report.update.settle.unwrap().settled);
}

#[tokio::test(start_paused = true)]
async fn test_execute_with_settlement() {
    let (fake, _, page) = page();

    let report = page
        .execute_action("email", ActionParams::with_value("a@b.c"), true)
        .await
        .unwrap();

    assert!(report.outcome.is_ok());
    assert!(report.update.settle.unwrap().settled);
    assert_eq!(fake.invocations("watch").len(), 1);
    assert_eq!(fake.invocations("execute")[0][1], json!({"value": "a@b.c"}));
}

#[tokio::test]
async fn test_execute_without_settlement() {
    let (fake, _, page) = page();

    let report = page
        .execute_action("submit-sign-in", ActionParams::default(), false)
        .await
        .unwrap();

    assert!(report.outcome.is_ok());
    assert!(report.update.settle.is_none());
    assert!(fake.invocations("watch").is_empty());
    assert_eq!(fake.invocations("snapshot").len(), 1);
}

#[tokio::test]
async fn test_generate_page_uses_cache() {
    let (fake, _, page) = page();

    let first = page.generate_page().await.unwrap();
    let second = page.generate_page().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fake.invocations("snapshot").len(), 1);
}

#[tokio::test]
async fn test_discover_actions_served_from_cache() {
    let (fake, snapshot, page) = page();

    let first = page.discover_actions().await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].id, "email");
    assert_eq!(fake.invocations("snapshot").len(), 1);

    // Later page changes show up only after an explicit remap.
    *snapshot.lock() = login_form(true);
    let cached = page.discover_actions().await.unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(fake.invocations("snapshot").len(), 1);

    page.remap_page(Duration::from_secs(5), None).await.unwrap();
    let fresh = page.discover_actions().await.unwrap();
    assert_eq!(fresh.len(), 3);
    assert_eq!(fake.invocations("snapshot").len(), 2);
}

#[tokio::test]
async fn test_remap_reports_diff() {
    let (_, snapshot, page) = page();
    page.discover_actions().await.unwrap();
    *snapshot.lock() = login_form(true);

    let update = page.remap_page(Duration::from_secs(5), None).await.unwrap();

    assert_eq!(update.diff.added, vec!["password".to_string()]);
    assert!(update.diff.removed.is_empty());
    assert!(update.settle.is_none());
    assert!(update.render().contains("+1 added (password)"));
}

#[tokio::test(start_paused = true)]
async fn test_remap_waits_for_selector() {
    let (fake, _, page) = page();
    fake.set_selector_delay(Some(Duration::from_millis(300)));

    let update = page
        .remap_page(Duration::from_secs(5), Some("#results"))
        .await
        .unwrap();

    assert!(update.settle.unwrap().settled);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_changes_passes_text() {
    let (fake, _, page) = page();

    let update = page
        .wait_for_changes(Duration::from_secs(2), None, Some("Welcome back"))
        .await
        .unwrap();

    assert_eq!(fake.invocations("textPresent")[0][0], json!("Welcome back"));
    let rendered = update.render();
    assert!(rendered.contains("---\nChanges: Settled in"));
}

#[tokio::test(start_paused = true)]
async fn test_operations_do_not_overlap() {
    let (fake, _, page) = page();
    fake.delay_invoke("execute", Duration::from_millis(200));
    let page = Arc::new(page);

    let a = tokio::spawn({
        let page = page.clone();
        async move { page.execute_action("email", ActionParams::with_value("x"), true).await }
    });
    let b = tokio::spawn({
        let page = page.clone();
        async move { page.execute_action("email", ActionParams::with_value("y"), true).await }
    });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    // Each attempt runs watch .. unwatch .. snapshot before the next arms.
    let methods: Vec<String> = fake
        .methods()
        .into_iter()
        .filter(|m| matches!(m.as_str(), "watch" | "unwatch" | "applyTags"))
        .collect();
    assert_eq!(
        methods,
        vec!["watch", "unwatch", "applyTags", "watch", "unwatch", "applyTags"]
    );
}

#[test]
fn test_validate_url_normalizes() {
    assert_eq!(validate_url(" https://example.com ").unwrap(), "https://example.com/");
    assert!(validate_url("about:blank").is_ok());
    assert!(validate_url("ftp://example.com").is_err());
}
