//! Settlement orchestrator.
//!
//! `ARMED -> ACTION_RUNNING -> RACING -> verdict`. Observers are installed
//! before the action runs so its synchronous effects are counted. The race
//! waits for the mutation watcher, the caller's condition and the loading
//! indicators; network idle runs alongside and gets at most one more idle
//! period once those are done. Every leg is capped by the global deadline,
//! and the whole attempt returns by the deadline plus the grace period.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::driver::{DriverError, PageDriver};

use super::legs::{condition_leg, dom_leg, loading_leg, network_leg};
use super::options::SettleOptions;
use super::result::{SettleChanges, SettleResult};
use super::scope::{SettleScope, WatchCounts};

/// Budget for each arming call.
const ARM_TIMEOUT: Duration = Duration::from_secs(1);
const URL_TIMEOUT: Duration = Duration::from_millis(500);

/// Run `action` and wait for the page to settle.
///
/// The action's own result is returned untouched next to the verdict. If
/// the action outlives its budget (the global timeout, or
/// [`SettleOptions::action_timeout`] when set) it fails with a
/// [`DriverError::Timeout`]. Settlement problems never fail the call; they
/// end up in [`SettleResult::error`].
pub async fn settle<T, E, F, Fut>(
    driver: Arc<dyn PageDriver>,
    options: &SettleOptions,
    action: F,
) -> (Result<T, E>, SettleResult)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<DriverError> + Display,
{
    let start = Instant::now();
    let mut deadline = start + options.global_timeout;
    let mut errors: Vec<String> = Vec::new();

    // ARMED
    let mut scope = SettleScope::new(driver.clone());
    scope.intercept_dialogs();
    let pre_url = match tokio::time::timeout(ARM_TIMEOUT.min(left(deadline)), driver.url()).await {
        Ok(Ok(url)) => Some(url),
        Ok(Err(e)) => {
            errors.push(format!("url: {}", e));
            None
        }
        Err(_) => None,
    };
    let requests_before = driver.network_request_count();
    match tokio::time::timeout(ARM_TIMEOUT.min(left(deadline)), scope.watch(options)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => errors.push(format!("mutation watcher: {}", e)),
        Err(_) => errors.push("mutation watcher: install timed out".to_string()),
    }

    // ACTION_RUNNING
    let action_budget = options.action_timeout.unwrap_or_else(|| left(deadline));
    let outcome = match tokio::time::timeout(action_budget, action()).await {
        Ok(outcome) => outcome,
        Err(_) => Err(E::from(DriverError::Timeout(format!(
            "Action did not finish within {}ms",
            action_budget.as_millis()
        )))),
    };
    if options.action_timeout.is_some() {
        deadline = Instant::now() + options.global_timeout;
    }

    // RACING
    let mut watch: Option<WatchCounts> = None;
    let mut network_idle = false;
    let mut condition_met: Option<bool> = None;
    if let Err(e) = &outcome {
        errors.push(format!("action failed: {}", e));
    } else {
        let budget = left(deadline);
        let driver_ref = driver.as_ref();
        let watching = scope.is_watching();

        let primary = async {
            let dom = async {
                if watching {
                    Some(dom_leg(driver_ref, budget).await)
                } else {
                    None
                }
            };
            tokio::join!(
                dom,
                condition_leg(driver_ref, options, budget),
                loading_leg(driver_ref, &options.loading_selectors, budget),
            )
        };
        let network = network_leg(driver_ref, options.network_idle, budget);
        tokio::pin!(primary);
        tokio::pin!(network);

        let mut network_out = None;
        let (dom, condition, loading) = loop {
            tokio::select! {
                out = &mut primary => break out,
                out = &mut network, if network_out.is_none() => network_out = Some(out),
            }
        };
        if network_out.is_none() {
            let extra = options.network_idle.min(left(deadline));
            network_out = tokio::time::timeout(extra, &mut network).await.ok();
        }

        match dom {
            Some(Ok(counts)) => watch = Some(counts),
            Some(Err(e)) => errors.push(format!("mutation watcher: {}", e)),
            None => {}
        }
        match network_out {
            Some(Ok(idle)) => network_idle = idle,
            Some(Err(e)) => errors.push(format!("network: {}", e)),
            None => debug!("Network leg abandoned"),
        }
        match condition {
            Some(Ok(met)) => condition_met = Some(met),
            Some(Err(e)) => {
                errors.push(format!("condition: {}", e));
                condition_met = Some(false);
            }
            None => {}
        }
        match loading {
            Ok(true) => {}
            Ok(false) => debug!("Loading indicators still visible"),
            Err(e) => errors.push(format!("loading indicators: {}", e)),
        }
    }

    // Verdict. Stabilizing happens inside the deadline; the reads after it
    // share the grace period past the deadline.
    let finish_by = deadline + options.grace;
    let dialog = match scope.take_dialogs() {
        Some(dialogs) => dialogs.resolve(options.dialog_timeout.min(left(finish_by))).await,
        None => None,
    };
    tokio::time::sleep(options.grace.min(left(deadline))).await;
    let post_url = match tokio::time::timeout(URL_TIMEOUT.min(left(finish_by)), driver.url()).await {
        Ok(Ok(url)) => Some(url),
        _ => None,
    };
    let final_counts = scope.release(left(finish_by)).await;

    let navigated = matches!((&pre_url, &post_url), (Some(a), Some(b)) if a != b);
    // The watcher on a replaced document reports itself inactive.
    let counts = match (watch, final_counts) {
        (Some(w), Some(f)) if f.active && f.mutations >= w.mutations => f,
        (Some(w), _) => w,
        (None, Some(f)) if f.active => f,
        _ => WatchCounts::default(),
    };
    let dom_quiet = watch.is_some_and(|w| w.active && w.quiet);

    let signal = dom_quiet || network_idle;
    let settled = outcome.is_ok()
        && match condition_met {
            Some(met) => met && (signal || navigated),
            None => signal,
        };
    if navigated {
        // Observers die with the old document.
        errors.retain(|e| e.starts_with("action failed"));
    }

    let changes = SettleChanges {
        dom_mutations: counts.mutations > 0,
        mutation_count: counts.mutations,
        new_elements: counts.added,
        removed_elements: counts.removed,
        network_activity: driver.network_request_count() > requests_before,
        url_changed: navigated,
        dialog_type: dialog,
    };
    let result = SettleResult {
        settled,
        has_changes: changes.dom_mutations || navigated || dialog.is_some(),
        navigated,
        dialog_handled: dialog.is_some(),
        changes,
        duration: start.elapsed(),
        error: if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        },
    };
    info!(
        duration_ms = result.duration.as_millis() as u64,
        settled = result.settled,
        mutations = result.changes.mutation_count,
        navigated = result.navigated,
        dialog = ?result.changes.dialog_type,
        "Page settle finished"
    );
    (outcome, result)
}

fn left(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
