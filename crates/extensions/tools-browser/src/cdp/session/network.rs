//! In-flight request tracking for network-idle detection.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::cdp::error::CdpError;

use super::core::PageSession;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

struct NetworkState {
    /// Request id to the loader (document) that issued it.
    in_flight: HashMap<String, Option<String>>,
    started: u64,
    last_change: Instant,
}

/// Requests currently in flight for one page.
pub(crate) struct NetworkTracker {
    state: Mutex<NetworkState>,
}

impl NetworkTracker {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(NetworkState {
                in_flight: HashMap::new(),
                started: 0,
                last_change: Instant::now(),
            }),
        }
    }

    pub(crate) fn request_started(&self, request_id: &str, loader_id: Option<&str>) {
        let mut state = self.state.lock();
        // Redirects reuse the request id.
        if state
            .in_flight
            .insert(request_id.to_string(), loader_id.map(str::to_string))
            .is_none()
        {
            state.started += 1;
        }
        state.last_change = Instant::now();
    }

    pub(crate) fn request_finished(&self, request_id: &str) {
        let mut state = self.state.lock();
        if state.in_flight.remove(request_id).is_some() {
            state.last_change = Instant::now();
        }
    }

    /// The main frame committed a new document: requests of older documents
    /// never report completion, so drop everything not issued by `loader_id`.
    pub(crate) fn document_replaced(&self, loader_id: Option<&str>) {
        let mut state = self.state.lock();
        let before = state.in_flight.len();
        state
            .in_flight
            .retain(|_, loader| loader.is_some() && loader.as_deref() == loader_id);
        if state.in_flight.len() != before {
            state.last_change = Instant::now();
        }
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    pub(crate) fn started(&self) -> u64 {
        self.state.lock().started
    }

    /// How long the page has had nothing in flight, or `None` while busy.
    pub(crate) fn idle_for(&self) -> Option<Duration> {
        let state = self.state.lock();
        if state.in_flight.is_empty() {
            Some(state.last_change.elapsed())
        } else {
            None
        }
    }

    /// Poll until idle for `idle` or `timeout` elapses.
    pub(crate) async fn wait_idle(&self, idle: Duration, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.idle_for().is_some_and(|d| d >= idle) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

impl PageSession {
    /// Wait until no request has been in flight for `idle`.
    pub async fn wait_for_network_idle(
        &self,
        idle: Duration,
        timeout: Duration,
    ) -> Result<(), CdpError> {
        if self.network.wait_idle(idle, timeout).await {
            Ok(())
        } else {
            Err(CdpError::Timeout(format!(
                "Network not idle ({} requests in flight)",
                self.network.in_flight()
            )))
        }
    }

    /// Requests started since the session was attached.
    pub fn network_request_count(&self) -> u64 {
        self.network.started()
    }
}
