//! Session event pump: fans raw events out and derives dialog and network state.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, trace};

use crate::cdp::protocol::{CdpEvent, DialogOpeningEvent, FrameNavigatedEvent, NetworkRequestEvent};
use crate::driver::{DialogEvent, DialogKind};

use super::network::NetworkTracker;

pub(super) async fn pump_events(
    mut rx: mpsc::UnboundedReceiver<CdpEvent>,
    events: broadcast::Sender<CdpEvent>,
    dialogs: broadcast::Sender<DialogEvent>,
    network: Arc<NetworkTracker>,
) {
    while let Some(event) = rx.recv().await {
        trace!("Session event: {}", event.method);
        if let Some(dialog) = apply_event(&event, &network) {
            debug!("Dialog opened: {} {:?}", dialog.kind, dialog.message);
            let _ = dialogs.send(dialog);
        }
        // No subscribers is fine.
        let _ = events.send(event);
    }
}

/// Update network state from `event`; return a dialog if one opened.
pub(super) fn apply_event(event: &CdpEvent, network: &NetworkTracker) -> Option<DialogEvent> {
    match event.method.as_str() {
        "Network.requestWillBeSent" => {
            if let Ok(req) = serde_json::from_value::<NetworkRequestEvent>(event.params.clone()) {
                network.request_started(&req.request_id, req.loader_id.as_deref());
            }
            None
        }
        "Network.loadingFinished" | "Network.loadingFailed" => {
            if let Ok(req) = serde_json::from_value::<NetworkRequestEvent>(event.params.clone()) {
                network.request_finished(&req.request_id);
            }
            None
        }
        "Page.frameNavigated" => {
            if let Ok(nav) = serde_json::from_value::<FrameNavigatedEvent>(event.params.clone()) {
                if nav.frame.parent_id.is_none() {
                    trace!("Main frame {} navigated", nav.frame.id);
                    network.document_replaced(nav.frame.loader_id.as_deref());
                }
            }
            None
        }
        "Page.javascriptDialogOpening" => {
            let opening =
                serde_json::from_value::<DialogOpeningEvent>(event.params.clone()).ok()?;
            Some(DialogEvent {
                kind: DialogKind::from_cdp(&opening.dialog_type),
                message: opening.message,
                default_prompt: opening.default_prompt.filter(|p| !p.is_empty()),
            })
        }
        _ => None,
    }
}
