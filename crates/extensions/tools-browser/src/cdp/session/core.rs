//! Core session struct and CDP command dispatch.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::CdpEvent;
use crate::cdp::transport::Transport;
use crate::driver::DialogEvent;

use super::events::pump_events;
use super::network::NetworkTracker;

/// A session attached to a single page target.
pub struct PageSession {
    pub(super) target_id: String,
    pub(super) session_id: String,
    pub(super) transport: Arc<Transport>,
    pub(super) events: broadcast::Sender<CdpEvent>,
    pub(super) dialogs: broadcast::Sender<DialogEvent>,
    pub(super) network: Arc<NetworkTracker>,
    pump: tokio::task::JoinHandle<()>,
}

impl PageSession {
    /// Wire up event routing for an attached target and enable its domains.
    pub(crate) async fn attach(
        target_id: String,
        session_id: String,
        transport: Arc<Transport>,
    ) -> Result<Self, CdpError> {
        let rx = transport.subscribe(&session_id);
        let (events, _) = broadcast::channel(256);
        let (dialogs, _) = broadcast::channel(16);
        let network = Arc::new(NetworkTracker::new());

        let pump = tokio::spawn(pump_events(
            rx,
            events.clone(),
            dialogs.clone(),
            network.clone(),
        ));

        let session = Self {
            target_id,
            session_id,
            transport,
            events,
            dialogs,
            network,
            pump,
        };
        session.enable_domains().await?;
        Ok(session)
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Raw session events from now on.
    pub fn subscribe_events(&self) -> broadcast::Receiver<CdpEvent> {
        self.events.subscribe()
    }

    async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        self.call("Network.enable", None).await?;
        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.pump.abort();
        self.transport.unsubscribe(&self.session_id);
    }
}
