//! BrowserManager core: state, connection and teardown.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::agent::AgentPage;
use crate::cdp::{CdpClient, PageSession};
use super::launch;
use super::{BrowserError, BrowserManagerConfig};

const LAUNCH_POLL_ATTEMPTS: u32 = 30;
const LAUNCH_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One open page.
pub(super) struct PageState {
    /// CDP target behind the page. Absent for pages not backed by a tab.
    pub(super) session: Option<Arc<PageSession>>,
    pub(super) page: Arc<AgentPage>,
}

/// Open pages keyed by `page_N` id.
#[derive(Default)]
pub(super) struct PageTable {
    pub(super) next: u64,
    pub(super) open: HashMap<String, PageState>,
}

impl PageTable {
    pub(super) fn insert(&mut self, state: PageState) -> String {
        self.next += 1;
        let page_id = format!("page_{}", self.next);
        self.open.insert(page_id.clone(), state);
        page_id
    }
}

/// Owns the browser connection and one [`AgentPage`] per open tab.
pub struct BrowserManager {
    pub(super) config: BrowserManagerConfig,
    client: RwLock<Option<Arc<CdpClient>>>,
    pub(super) pages: RwLock<PageTable>,
    /// Chrome we launched ourselves; dropped (and killed) on shutdown.
    chrome: Mutex<Option<Child>>,
}

impl BrowserManager {
    pub fn new(config: BrowserManagerConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
            pages: RwLock::new(PageTable::default()),
            chrome: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BrowserManagerConfig {
        &self.config
    }

    /// Connect over CDP, launching Chrome first when nothing listens on the
    /// debug port.
    pub async fn connect(&self) -> Result<(), BrowserError> {
        let mut client = self.client.write().await;
        if client.is_some() {
            return Ok(());
        }

        let endpoint = self.config.endpoint();
        if launch::endpoint_alive(&endpoint).await {
            info!("Using Chrome already listening on {}", endpoint);
        } else {
            let child = launch::spawn_chrome(&self.config)?;
            *self.chrome.lock().await = Some(child);
            if !launch::wait_for_endpoint(&endpoint, LAUNCH_POLL_ATTEMPTS, LAUNCH_POLL_INTERVAL).await {
                return Err(BrowserError::LaunchFailed(format!(
                    "no debug endpoint on {} after {}ms",
                    endpoint,
                    LAUNCH_POLL_ATTEMPTS as u128 * LAUNCH_POLL_INTERVAL.as_millis()
                )));
            }
        }

        let connected = CdpClient::connect(&endpoint, self.config.command_timeout).await?;
        *client = Some(Arc::new(connected));
        info!("Connected to Chrome at {}", endpoint);
        Ok(())
    }

    /// The CDP client, connecting on first use.
    pub(super) async fn client(&self) -> Result<Arc<CdpClient>, BrowserError> {
        if let Some(client) = self.client.read().await.clone() {
            return Ok(client);
        }
        self.connect().await?;
        self.client
            .read()
            .await
            .clone()
            .ok_or(BrowserError::NotConnected)
    }

    pub async fn is_connected(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Forget every page and drop the connection. Tabs stay open.
    pub async fn close(&self) -> Result<(), BrowserError> {
        let dropped = std::mem::take(&mut self.pages.write().await.open).len();
        self.client.write().await.take();
        info!("Browser connection closed ({} pages dropped)", dropped);
        Ok(())
    }

    /// Close the connection and stop Chrome if this manager launched it.
    pub async fn shutdown_chrome(&self) -> Result<(), BrowserError> {
        self.close().await?;
        if let Some(mut child) = self.chrome.lock().await.take() {
            info!("Stopping Chrome");
            if let Err(e) = child.kill().await {
                warn!("Failed to stop Chrome: {}", e);
            }
        }
        Ok(())
    }
}
