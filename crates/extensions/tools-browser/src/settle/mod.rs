//! Page settlement detection.
//!
//! ```rust,ignore
//! let (outcome, verdict) = settle(driver.clone(), &options, || async {
//!     dispatch(driver.as_ref(), "submit-login", &ActionParams::default()).await
//! })
//! .await;
//! ```

mod legs;
mod options;
mod orchestrator;
mod result;
mod scope;

pub use options::SettleOptions;
pub use orchestrator::settle;
pub use result::{SettleChanges, SettleResult};
