//! [`PageDriver`] implementation backed by a CDP session.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::driver::{DialogEvent, DriverError, PageDriver};

use super::core::PageSession;

#[async_trait]
impl PageDriver for PageSession {
    async fn evaluate(&self, function: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        Ok(self.call_function(function, &args).await?)
    }

    async fn url(&self) -> Result<String, DriverError> {
        Ok(self.get_url().await?)
    }

    async fn title(&self) -> Result<String, DriverError> {
        Ok(self.get_title().await?)
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        PageSession::navigate(self, url).await?;
        Ok(())
    }

    async fn wait_for_network_idle(
        &self,
        idle: Duration,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        Ok(PageSession::wait_for_network_idle(self, idle, timeout).await?)
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        Ok(PageSession::wait_for_selector(self, selector, timeout).await?)
    }

    async fn wait_for_function(&self, predicate: &str, timeout: Duration) -> Result<(), DriverError> {
        Ok(PageSession::wait_for_function(self, predicate, timeout).await?)
    }

    fn subscribe_dialogs(&self) -> broadcast::Receiver<DialogEvent> {
        self.dialogs.subscribe()
    }

    async fn accept_dialog(&self, prompt_text: Option<&str>) -> Result<(), DriverError> {
        Ok(PageSession::accept_dialog(self, prompt_text).await?)
    }

    fn network_request_count(&self) -> u64 {
        PageSession::network_request_count(self)
    }
}
