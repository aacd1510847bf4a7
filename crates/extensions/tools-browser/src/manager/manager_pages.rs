//! BrowserManager page lifecycle.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::agent::{AgentError, AgentPage, NavigationUpdate, PageUpdate};
use crate::driver::PageDriver;
use crate::settle::SettleOptions;
use super::manager_core::PageState;
use super::{BrowserError, BrowserManager};

/// Summary of one open page, from its latest walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageListing {
    pub page_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub elements: usize,
}

impl BrowserManager {
    /// Open a tab, optionally navigating it to `url`.
    ///
    /// A tab whose first navigation fails is closed again.
    pub async fn open_page(
        &self,
        url: Option<&str>,
    ) -> Result<(String, Option<PageUpdate>), BrowserError> {
        let client = self.client().await?;
        let session = Arc::new(client.new_page(None).await?);
        let driver: Arc<dyn PageDriver> = session.clone();
        let page = Arc::new(self.new_agent_page(driver));
        let page_id = self
            .register(PageState {
                session: Some(session),
                page: page.clone(),
            })
            .await;
        debug!("Created page {}", page_id);

        let Some(url) = url else {
            return Ok((page_id, None));
        };
        let failure = match page.navigate(url).await {
            Ok(NavigationUpdate { update, outcome: Ok(()) }) => return Ok((page_id, Some(update))),
            Ok(NavigationUpdate { outcome: Err(e), .. }) => AgentError::Driver(e),
            Err(e) => e,
        };
        if let Err(close_err) = self.close_page(&page_id).await {
            warn!("Failed to close {} after navigation error: {}", page_id, close_err);
        }
        Err(failure.into())
    }

    /// Close a page and its tab.
    pub async fn close_page(&self, page_id: &str) -> Result<(), BrowserError> {
        let state = self
            .pages
            .write()
            .await
            .open
            .remove(page_id)
            .ok_or_else(|| BrowserError::PageNotFound(page_id.to_string()))?;
        if let Some(session) = state.session {
            let client = self.client().await?;
            client.close_page(&session).await?;
        }
        debug!("Closed page {}", page_id);
        Ok(())
    }

    /// All open pages, ordered by id.
    pub async fn list_pages(&self) -> Vec<PageListing> {
        let pages = self.pages.read().await;
        let mut listings: Vec<PageListing> = pages
            .open
            .iter()
            .map(|(page_id, state)| {
                let manifest = state.page.manifest();
                PageListing {
                    page_id: page_id.clone(),
                    url: manifest.as_ref().map(|m| m.url.clone()),
                    title: manifest.as_ref().map(|m| m.title.clone()),
                    elements: manifest.map_or(0, |m| m.len()),
                }
            })
            .collect();
        listings.sort_by_key(|l| page_number(&l.page_id));
        listings
    }

    /// Look up a page's controller.
    pub async fn get_page(&self, page_id: &str) -> Result<Arc<AgentPage>, BrowserError> {
        let pages = self.pages.read().await;
        let state = pages
            .open
            .get(page_id)
            .ok_or_else(|| BrowserError::PageNotFound(page_id.to_string()))?;
        Ok(state.page.clone())
    }

    pub(super) fn new_agent_page(&self, driver: Arc<dyn PageDriver>) -> AgentPage {
        AgentPage::new(
            driver,
            SettleOptions::from(&self.config.settle),
            self.config.walker.clone(),
        )
    }

    async fn register(&self, state: PageState) -> String {
        self.pages.write().await.insert(state)
    }

    /// Register a page driven by `driver` without opening a tab.
    #[cfg(test)]
    pub(crate) async fn insert_page(&self, driver: Arc<dyn PageDriver>) -> String {
        let page = Arc::new(self.new_agent_page(driver));
        self.register(PageState { session: None, page }).await
    }
}

fn page_number(page_id: &str) -> u64 {
    page_id
        .strip_prefix("page_")
        .and_then(|n| n.parse().ok())
        .unwrap_or(u64::MAX)
}
