//! Scripted [`PageDriver`] for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::driver::{DialogEvent, DialogKind, DriverError, PageDriver};
use crate::script::{INSTALL_SCRIPT, INVOKE_FN};

type Handler = Arc<dyn Fn(&[Value]) -> Result<Value, DriverError> + Send + Sync>;

/// A page driver whose agent-script methods are answered by closures.
///
/// Unregistered methods get a neutral default answer: the watcher is
/// immediately quiet, no loading indicators, an empty snapshot.
pub struct FakeDriver {
    handlers: Mutex<HashMap<String, Handler>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    url: Arc<Mutex<String>>,
    url_delay: Mutex<Option<Duration>>,
    title: Mutex<String>,
    navigations: Mutex<Vec<String>>,
    navigate_error: Mutex<Option<DriverError>>,
    navigate_delay: Mutex<Option<Duration>>,
    missing_until_install: AtomicBool,
    install_sticks: AtomicBool,
    installed: AtomicBool,
    installs: AtomicUsize,
    network_idle_after: Mutex<Option<Duration>>,
    network_count: AtomicU64,
    selector_delay: Mutex<Option<Duration>>,
    dialogs: broadcast::Sender<DialogEvent>,
    accepted: Mutex<Vec<Option<String>>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        let (dialogs, _) = broadcast::channel(16);
        Self {
            handlers: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            url: Arc::new(Mutex::new("https://example.com/".to_string())),
            url_delay: Mutex::new(None),
            title: Mutex::new("Example".to_string()),
            navigations: Mutex::new(Vec::new()),
            navigate_error: Mutex::new(None),
            navigate_delay: Mutex::new(None),
            missing_until_install: AtomicBool::new(false),
            install_sticks: AtomicBool::new(true),
            installed: AtomicBool::new(false),
            installs: AtomicUsize::new(0),
            network_idle_after: Mutex::new(Some(Duration::ZERO)),
            network_count: AtomicU64::new(0),
            selector_delay: Mutex::new(None),
            dialogs,
            accepted: Mutex::new(Vec::new()),
        }
    }

    /// Answer `method` with `handler`, called with the method's arguments.
    pub fn on_invoke<F>(&self, method: &str, handler: F)
    where
        F: Fn(&[Value]) -> Result<Value, DriverError> + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .insert(method.to_string(), Arc::new(handler));
    }

    /// Sleep for `delay` before answering `method`.
    pub fn delay_invoke(&self, method: &str, delay: Duration) {
        self.delays.lock().insert(method.to_string(), delay);
    }

    /// Report the agent script as missing until the install script runs.
    pub fn set_missing_until_install(&self, missing: bool) {
        self.missing_until_install.store(missing, Ordering::SeqCst);
    }

    /// Whether running the install script makes the agent script present.
    pub fn set_install_sticks(&self, sticks: bool) {
        self.install_sticks.store(sticks, Ordering::SeqCst);
    }

    pub fn install_count(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    /// Arguments of every call to `method`, oldest first.
    pub fn invocations(&self, method: &str) -> Vec<Vec<Value>> {
        self.calls
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, args)| args.clone())
            .collect()
    }

    /// Names of every agent-script method called, oldest first.
    pub fn methods(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(m, _)| m.clone()).collect()
    }

    /// Shared handle so handlers can simulate navigation.
    pub fn url_handle(&self) -> Arc<Mutex<String>> {
        self.url.clone()
    }

    pub fn set_url(&self, url: &str) {
        *self.url.lock() = url.to_string();
    }

    /// Sleep for `delay` before answering every `url()` call.
    pub fn delay_url(&self, delay: Duration) {
        *self.url_delay.lock() = Some(delay);
    }

    pub fn set_title(&self, title: &str) {
        *self.title.lock() = title.to_string();
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    /// Sleep for `delay` inside every `navigate()`, like a slow load.
    pub fn delay_navigation(&self, delay: Duration) {
        *self.navigate_delay.lock() = Some(delay);
    }

    pub fn fail_navigation(&self, error: DriverError) {
        *self.navigate_error.lock() = Some(error);
    }

    /// `None` keeps the network busy forever.
    pub fn set_network_idle_after(&self, after: Option<Duration>) {
        *self.network_idle_after.lock() = after;
    }

    pub fn add_network_requests(&self, count: u64) {
        self.network_count.fetch_add(count, Ordering::SeqCst);
    }

    /// `None` makes selector and function waits resolve immediately.
    pub fn set_selector_delay(&self, delay: Option<Duration>) {
        *self.selector_delay.lock() = delay;
    }

    pub fn open_dialog(&self, kind: DialogKind, message: &str) {
        let _ = self.dialogs.send(DialogEvent {
            kind,
            message: message.to_string(),
            default_prompt: None,
        });
    }

    /// Sender for handlers that open dialogs mid-call.
    pub fn dialog_sender(&self) -> broadcast::Sender<DialogEvent> {
        self.dialogs.clone()
    }

    pub fn accepted_dialogs(&self) -> Vec<Option<String>> {
        self.accepted.lock().clone()
    }

    fn default_answer(method: &str, args: &[Value]) -> Value {
        match method {
            "watch" => json!(true),
            "awaitWatch" => json!({"active": true, "quiet": true, "mutations": 0, "added": 0, "removed": 0}),
            "unwatch" => json!({"active": true, "mutations": 0, "added": 0, "removed": 0}),
            "loadingGone" | "textPresent" => json!(true),
            "snapshot" => json!({"nodes": [], "truncated": false}),
            "applyTags" => json!(args.first().and_then(Value::as_array).map_or(0, Vec::len)),
            "execute" => json!({"ok": true, "action": "click"}),
            _ => Value::Null,
        }
    }

    async fn answer(&self, method: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        if self.missing_until_install.load(Ordering::SeqCst) && !self.installed.load(Ordering::SeqCst)
        {
            return Ok(json!({"__agentPageMissing": true}));
        }

        self.calls.lock().push((method.to_string(), args.clone()));
        let delay = self.delays.lock().get(method).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let handler = self.handlers.lock().get(method).cloned();
        match handler {
            Some(handler) => handler(&args),
            None => Ok(Self::default_answer(method, &args)),
        }
    }

    async fn wait_for(&self, delay: Option<Duration>, timeout: Duration) -> Result<(), DriverError> {
        match delay {
            Some(delay) if delay > timeout => {
                tokio::time::sleep(timeout).await;
                Err(DriverError::Timeout("fake wait".to_string()))
            }
            Some(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Default for FakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn evaluate(&self, function: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        if function == INVOKE_FN {
            let method = args
                .first()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let inner = args
                .get(1)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            return self.answer(&method, inner).await;
        }
        if function == INSTALL_SCRIPT {
            self.installs.fetch_add(1, Ordering::SeqCst);
            if self.install_sticks.load(Ordering::SeqCst) {
                self.installed.store(true, Ordering::SeqCst);
            }
            return Ok(json!(true));
        }
        Ok(Value::Null)
    }

    async fn url(&self) -> Result<String, DriverError> {
        let delay = *self.url_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.url.lock().clone())
    }

    async fn title(&self) -> Result<String, DriverError> {
        Ok(self.title.lock().clone())
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let delay = *self.navigate_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.navigate_error.lock().clone() {
            return Err(error);
        }
        self.navigations.lock().push(url.to_string());
        *self.url.lock() = url.to_string();
        // A new document drops the agent script.
        self.installed.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn wait_for_network_idle(
        &self,
        idle: Duration,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let after = *self.network_idle_after.lock();
        match after {
            Some(after) => self.wait_for(Some(after.max(idle)), timeout).await,
            None => {
                tokio::time::sleep(timeout).await;
                Err(DriverError::Timeout("network busy".to_string()))
            }
        }
    }

    async fn wait_for_selector(&self, _selector: &str, timeout: Duration) -> Result<(), DriverError> {
        let delay = *self.selector_delay.lock();
        self.wait_for(delay, timeout).await
    }

    async fn wait_for_function(&self, _predicate: &str, timeout: Duration) -> Result<(), DriverError> {
        let delay = *self.selector_delay.lock();
        self.wait_for(delay, timeout).await
    }

    fn subscribe_dialogs(&self) -> broadcast::Receiver<DialogEvent> {
        self.dialogs.subscribe()
    }

    async fn accept_dialog(&self, prompt_text: Option<&str>) -> Result<(), DriverError> {
        self.accepted.lock().push(prompt_text.map(str::to_string));
        Ok(())
    }

    fn network_request_count(&self) -> u64 {
        self.network_count.load(Ordering::SeqCst)
    }
}
