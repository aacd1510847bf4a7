//! Controller API for one page.
//!
//! [`AgentPage`] ties the pieces together: it runs actions under the
//! settlement orchestrator, re-walks the page afterwards and keeps the
//! latest manifest. Every public operation holds a per-page lock, so two
//! walks or two settlement attempts never run against the same document.

use std::sync::Arc;
use std::time::Duration;

use agentpage_config::WalkerConfig;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::dispatch::{dispatch, ActionParams, DispatchError, DispatchOutcome};
use crate::driver::{DriverError, PageDriver, NAVIGATION_TIMEOUT};
use crate::page::{DomTree, ElementTag, InteractiveElement, Manifest, ManifestCache, ManifestDiff, PageWalker};
use crate::script;
use crate::settle::{settle, SettleOptions, SettleResult};

/// URL schemes `navigate` accepts.
const NAVIGABLE_SCHEMES: &[&str] = &["http", "https", "file", "about", "data"];

/// Controller API errors.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Malformed page snapshot: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Fresh view of the page after an operation.
#[derive(Debug, Clone, Serialize)]
pub struct PageUpdate {
    pub content: String,
    #[serde(skip)]
    pub manifest: Arc<Manifest>,
    pub diff: ManifestDiff,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settle: Option<SettleResult>,
}

impl PageUpdate {
    /// One-line change summary.
    pub fn change_summary(&self) -> String {
        match &self.settle {
            Some(settle) => format!("{}. {}", settle.summary(), self.diff.summary()),
            None => self.diff.summary(),
        }
    }

    /// Manifest text followed by the change summary.
    pub fn render(&self) -> String {
        format!("{}\n\n---\nChanges: {}", self.content.trim_end(), self.change_summary())
    }
}

/// Result of `execute_action`: the page after the action plus the raw
/// dispatch outcome. A failed dispatch still carries a fresh manifest.
#[derive(Debug)]
pub struct ActionUpdate {
    pub update: PageUpdate,
    pub outcome: Result<DispatchOutcome, DispatchError>,
}

/// Result of `navigate`: the page as the tab now holds it plus the
/// navigation outcome. A failed or timed-out load still carries a fresh
/// manifest of whatever document is loaded.
#[derive(Debug)]
pub struct NavigationUpdate {
    pub update: PageUpdate,
    pub outcome: Result<(), DriverError>,
}

/// Settlement-aware, semantically mapped view of one browser page.
pub struct AgentPage {
    driver: Arc<dyn PageDriver>,
    op_lock: Mutex<()>,
    cache: ManifestCache,
    walker: PageWalker,
    settle_defaults: SettleOptions,
}

impl AgentPage {
    pub fn new(driver: Arc<dyn PageDriver>, settle_defaults: SettleOptions, walker: WalkerConfig) -> Self {
        Self {
            driver,
            op_lock: Mutex::new(()),
            cache: ManifestCache::new(),
            walker: PageWalker::new(walker),
            settle_defaults,
        }
    }

    pub fn settle_defaults(&self) -> &SettleOptions {
        &self.settle_defaults
    }

    /// Manifest of the most recent walk, if any.
    pub fn manifest(&self) -> Option<Arc<Manifest>> {
        self.cache.get()
    }

    /// Navigate to `url`, wait for the page to settle and map it.
    ///
    /// The load gets its own budget; the settle timeout starts once it
    /// returns. Only an invalid URL, or a failed load whose page cannot be
    /// walked either, is an `Err`.
    pub async fn navigate(&self, url: &str) -> Result<NavigationUpdate, AgentError> {
        let target = validate_url(url)?;
        let _guard = self.op_lock.lock().await;
        info!("Navigating to {}", target);

        let options = self
            .settle_defaults
            .clone()
            .with_action_timeout(NAVIGATION_TIMEOUT);
        let driver = self.driver.clone();
        let (outcome, verdict) = settle(self.driver.clone(), &options, || async move {
            driver.navigate(&target).await
        })
        .await;

        match (self.walk(Some(verdict)).await, outcome) {
            (Ok(update), outcome) => {
                if let Err(e) = &outcome {
                    warn!("Navigation failed, mapped the current document: {}", e);
                }
                Ok(NavigationUpdate { update, outcome })
            }
            (Err(walk_err), Ok(())) => Err(walk_err),
            (Err(walk_err), Err(e)) => {
                debug!("Walk after failed navigation: {}", walk_err);
                Err(e.into())
            }
        }
    }

    /// Perform the action tagged on `id`.
    ///
    /// With `wait_for_changes` the action runs under the settlement
    /// orchestrator. Either way the page is re-walked, also when the
    /// dispatch itself failed.
    pub async fn execute_action(
        &self,
        id: &str,
        params: ActionParams,
        wait_for_changes: bool,
    ) -> Result<ActionUpdate, AgentError> {
        let _guard = self.op_lock.lock().await;
        debug!("Executing action on {}", id);

        let driver = self.driver.clone();
        let (outcome, verdict) = if wait_for_changes {
            let (outcome, verdict) = settle(self.driver.clone(), &self.settle_defaults, || async move {
                dispatch(driver.as_ref(), id, &params).await
            })
            .await;
            (outcome, Some(verdict))
        } else {
            (dispatch(driver.as_ref(), id, &params).await, None)
        };

        if let Err(e) = &outcome {
            warn!("Action on {} failed: {}", id, e);
        }
        let update = self.walk(verdict).await?;
        Ok(ActionUpdate { update, outcome })
    }

    /// Interactive elements of the current manifest. The page is walked
    /// only when no manifest exists yet; `remap_page` forces a fresh walk.
    pub async fn discover_actions(&self) -> Result<Vec<InteractiveElement>, AgentError> {
        Ok(self.generate_page().await?.elements.clone())
    }

    /// The page manifest, served from the cache when a walk has happened.
    pub async fn generate_page(&self) -> Result<Arc<Manifest>, AgentError> {
        let _guard = self.op_lock.lock().await;
        if let Some(manifest) = self.cache.get() {
            return Ok(manifest);
        }
        Ok(self.walk(None).await?.manifest)
    }

    /// Re-walk the page, first waiting up to `timeout` for `selector` when given.
    pub async fn remap_page(
        &self,
        timeout: Duration,
        selector: Option<&str>,
    ) -> Result<PageUpdate, AgentError> {
        let _guard = self.op_lock.lock().await;
        let verdict = match selector {
            Some(selector) => {
                let options = self
                    .settle_defaults
                    .clone()
                    .with_global_timeout(timeout)
                    .with_selector(selector);
                Some(self.settle_idle(&options).await)
            }
            None => None,
        };
        self.walk(verdict).await
    }

    /// Wait for the page to settle on its own, then re-walk it.
    pub async fn wait_for_changes(
        &self,
        timeout: Duration,
        selector: Option<&str>,
        text: Option<&str>,
    ) -> Result<PageUpdate, AgentError> {
        let _guard = self.op_lock.lock().await;
        let mut options = self.settle_defaults.clone().with_global_timeout(timeout);
        if let Some(selector) = selector {
            options = options.with_selector(selector);
        }
        if let Some(text) = text {
            options = options.with_text(text);
        }
        let verdict = self.settle_idle(&options).await;
        self.walk(Some(verdict)).await
    }

    async fn settle_idle(&self, options: &SettleOptions) -> SettleResult {
        let (_, verdict) = settle(self.driver.clone(), options, || async {
            Ok::<(), DriverError>(())
        })
        .await;
        verdict
    }

    /// Snapshot, map and tag the page. Callers hold `op_lock`.
    async fn walk(&self, settle: Option<SettleResult>) -> Result<PageUpdate, AgentError> {
        let driver = self.driver.as_ref();
        let raw = script::invoke(driver, "snapshot", vec![json!(self.walker.config().max_nodes)]).await?;
        let tree = DomTree::from_value(raw).map_err(|e| AgentError::Snapshot(e.to_string()))?;

        let url = driver.url().await?;
        let title = match driver.title().await {
            Ok(title) => title,
            Err(e) => {
                debug!("Title unavailable: {}", e);
                String::new()
            }
        };
        let output = self.walker.walk(&tree, &url, &title);

        let tags: Vec<Value> = output.tags.iter().map(ElementTag::to_value).collect();
        let expected = tags.len() as u64;
        let tagged = script::invoke(driver, "applyTags", vec![Value::Array(tags)]).await?;
        if tagged.as_u64() != Some(expected) {
            warn!("Tagged {} of {} elements; the page changed during the walk", tagged, expected);
        }

        let (manifest, previous) = self.cache.replace(output.manifest);
        let diff = ManifestDiff::compute(previous.as_deref(), &manifest);
        debug!(
            "Walked {}: {} nodes, {} elements ({})",
            url,
            tree.len(),
            manifest.len(),
            diff.summary()
        );
        Ok(PageUpdate {
            content: manifest.content.clone(),
            manifest,
            diff,
            settle,
        })
    }
}

fn validate_url(url: &str) -> Result<String, AgentError> {
    let parsed = url::Url::parse(url.trim()).map_err(|e| AgentError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !NAVIGABLE_SCHEMES.contains(&parsed.scheme()) {
        return Err(AgentError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(parsed.into())
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
