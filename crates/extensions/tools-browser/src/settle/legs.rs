//! The independent race legs.

use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use crate::driver::{DriverError, PageDriver};
use crate::script;

use super::options::SettleOptions;
use super::scope::WatchCounts;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Share of the budget left for the `awaitWatch` reply to travel back.
const ROUND_TRIP_MARGIN: Duration = Duration::from_millis(100);

/// Mutation watcher: resolves on quiet or within `budget`. The page gives
/// up a little early so its answer arrives before the host does.
pub(crate) async fn dom_leg(
    driver: &dyn PageDriver,
    budget: Duration,
) -> Result<WatchCounts, DriverError> {
    let page_wait = budget.saturating_sub(ROUND_TRIP_MARGIN.min(budget / 2));
    let call = script::invoke(driver, "awaitWatch", vec![json!(page_wait.as_millis() as u64)]);
    match tokio::time::timeout(budget, call).await {
        Ok(value) => WatchCounts::from_value(value?),
        Err(_) => Err(DriverError::Timeout("Mutation watcher did not answer".to_string())),
    }
}

/// Network idle: `Ok(true)` once idle, `Ok(false)` if still busy at `budget`.
pub(crate) async fn network_leg(
    driver: &dyn PageDriver,
    idle: Duration,
    budget: Duration,
) -> Result<bool, DriverError> {
    match tokio::time::timeout(budget, driver.wait_for_network_idle(idle, budget)).await {
        Ok(Ok(())) => Ok(true),
        Ok(Err(DriverError::Timeout(_))) | Err(_) => Ok(false),
        Ok(Err(e)) => Err(e),
    }
}

/// Caller conditions, all of which must hold. `None` when none were set.
pub(crate) async fn condition_leg(
    driver: &dyn PageDriver,
    options: &SettleOptions,
    budget: Duration,
) -> Option<Result<bool, DriverError>> {
    if !options.has_condition() {
        return None;
    }
    let deadline = Instant::now() + budget;
    let all = async {
        if let Some(selector) = &options.wait_for_selector {
            driver
                .wait_for_selector(selector, remaining(deadline))
                .await?;
        }
        if let Some(predicate) = &options.wait_for_function {
            driver
                .wait_for_function(predicate, remaining(deadline))
                .await?;
        }
        if let Some(text) = &options.wait_for_text {
            wait_for_text(driver, text, deadline).await?;
        }
        Ok::<bool, DriverError>(true)
    };
    let outcome = match tokio::time::timeout(budget, all).await {
        Ok(Ok(met)) => Ok(met),
        Ok(Err(DriverError::Timeout(_))) | Err(_) => Ok(false),
        Ok(Err(e)) => Err(e),
    };
    Some(outcome)
}

async fn wait_for_text(driver: &dyn PageDriver, text: &str, deadline: Instant) -> Result<(), DriverError> {
    loop {
        let present = script::invoke(driver, "textPresent", vec![json!(text)]).await?;
        if present.as_bool() == Some(true) {
            return Ok(());
        }
        if Instant::now() + POLL_INTERVAL > deadline {
            return Err(DriverError::Timeout(format!("Text '{}' did not appear", text)));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Loading indicators: `Ok(true)` once none is visible.
pub(crate) async fn loading_leg(
    driver: &dyn PageDriver,
    selectors: &[String],
    budget: Duration,
) -> Result<bool, DriverError> {
    if selectors.is_empty() {
        return Ok(true);
    }
    let deadline = Instant::now() + budget;
    let poll = async {
        loop {
            let gone = script::invoke(driver, "loadingGone", vec![json!(selectors)]).await?;
            if gone.as_bool() == Some(true) {
                return Ok::<bool, DriverError>(true);
            }
            if Instant::now() + POLL_INTERVAL > deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };
    match tokio::time::timeout(budget, poll).await {
        Ok(result) => result,
        Err(_) => Ok(false),
    }
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}
