//! Scoped page-side observers for one settlement attempt.
//!
//! A [`SettleScope`] owns the mutation watcher and the dialog interceptor.
//! [`SettleScope::release`] tears both down; if the scope is dropped
//! without being released (the caller's future was cancelled), `Drop`
//! aborts the interceptor and schedules the unwatch on the runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::driver::{DialogKind, DriverError, PageDriver};
use crate::script;

use super::options::SettleOptions;

const UNWATCH_TIMEOUT: Duration = Duration::from_millis(1000);

/// Counters reported by the page-side watcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct WatchCounts {
    pub active: bool,
    pub quiet: bool,
    pub mutations: u64,
    pub added: u64,
    pub removed: u64,
}

impl WatchCounts {
    pub(crate) fn from_value(value: Value) -> Result<Self, DriverError> {
        serde_json::from_value(value)
            .map_err(|e| DriverError::Script(format!("Malformed watcher reply: {}", e)))
    }
}

/// One-shot dialog interceptor running in the background.
pub(crate) struct DialogInterceptor {
    task: JoinHandle<Option<DialogKind>>,
    seen: Arc<AtomicBool>,
}

impl DialogInterceptor {
    /// Subscribe now, accept the first dialog that opens.
    fn spawn(driver: Arc<dyn PageDriver>) -> Self {
        let mut rx = driver.subscribe_dialogs();
        let seen = Arc::new(AtomicBool::new(false));
        let flag = seen.clone();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(dialog) => {
                        flag.store(true, Ordering::SeqCst);
                        debug!("Accepting {} dialog: {}", dialog.kind, dialog.message);
                        if let Err(e) = driver.accept_dialog(dialog.default_prompt.as_deref()).await {
                            warn!("Failed to accept {} dialog: {}", dialog.kind, e);
                        }
                        return Some(dialog.kind);
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return None,
                }
            }
        });
        Self { task, seen }
    }

    /// Dialog kind if one was handled. Waits up to `timeout` only when a
    /// dialog was already seen.
    pub(crate) async fn resolve(self, timeout: Duration) -> Option<DialogKind> {
        let Self { mut task, seen } = self;
        if task.is_finished() || seen.load(Ordering::SeqCst) {
            match tokio::time::timeout(timeout, &mut task).await {
                Ok(Ok(kind)) => return kind,
                Ok(Err(_)) => return None,
                Err(_) => {}
            }
        }
        task.abort();
        None
    }
}

/// Page-side observers armed for one attempt.
pub(crate) struct SettleScope {
    driver: Arc<dyn PageDriver>,
    watching: bool,
    dialogs: Option<DialogInterceptor>,
}

impl SettleScope {
    pub(crate) fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            watching: false,
            dialogs: None,
        }
    }

    pub(crate) fn intercept_dialogs(&mut self) {
        self.dialogs = Some(DialogInterceptor::spawn(self.driver.clone()));
    }

    /// Install the mutation watcher.
    pub(crate) async fn watch(&mut self, options: &SettleOptions) -> Result<(), DriverError> {
        script::invoke(self.driver.as_ref(), "watch", vec![options.watch_config()]).await?;
        self.watching = true;
        Ok(())
    }

    pub(crate) fn is_watching(&self) -> bool {
        self.watching
    }

    pub(crate) fn take_dialogs(&mut self) -> Option<DialogInterceptor> {
        self.dialogs.take()
    }

    /// Disconnect everything. Returns the watcher's final counters, or
    /// `None` when the page does not answer within `budget`; the unwatch
    /// then finishes in the background.
    pub(crate) async fn release(mut self, budget: Duration) -> Option<WatchCounts> {
        if let Some(dialogs) = self.dialogs.take() {
            dialogs.task.abort();
        }
        if !self.watching {
            return None;
        }
        let unwatch = script::invoke(self.driver.as_ref(), "unwatch", Vec::new());
        let reply = tokio::time::timeout(budget, unwatch).await;
        // Cancelled before this point, `Drop` still unwatches.
        self.watching = false;
        match reply {
            Ok(Ok(value)) => WatchCounts::from_value(value).ok(),
            Ok(Err(e)) => {
                debug!("Unwatch failed: {}", e);
                None
            }
            Err(_) => {
                debug!("Unwatch did not answer in {}ms, retrying in the background", budget.as_millis());
                spawn_unwatch(self.driver.clone());
                None
            }
        }
    }
}

/// Fire-and-forget unwatch for scopes that cannot wait for the page.
fn spawn_unwatch(driver: Arc<dyn PageDriver>) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                let unwatch = script::invoke(driver.as_ref(), "unwatch", Vec::new());
                if tokio::time::timeout(UNWATCH_TIMEOUT, unwatch).await.is_err() {
                    warn!("Page watcher did not disconnect");
                }
            });
        }
        Err(_) => warn!("Settle scope dropped outside a runtime; page watcher left armed"),
    }
}

impl Drop for SettleScope {
    fn drop(&mut self) {
        if let Some(dialogs) = self.dialogs.take() {
            dialogs.task.abort();
        }
        if !self.watching {
            return;
        }
        spawn_unwatch(self.driver.clone());
    }
}
