//! Locating, launching and waiting for a debuggable Chrome.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserManagerConfig};

/// Environment variable naming the browser binary.
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
];

#[cfg(target_os = "linux")]
const CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

#[cfg(target_os = "windows")]
const CANDIDATES: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const CANDIDATES: &[&str] = &[];

/// Chrome-compatible executable: `$CHROME_PATH` if it exists, else the
/// first well-known install location present.
pub fn find_chrome() -> Option<PathBuf> {
    pick_executable(std::env::var_os(CHROME_PATH_ENV), CANDIDATES, |p| p.exists())
}

fn pick_executable(
    explicit: Option<OsString>,
    candidates: &[&str],
    exists: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    if let Some(path) = explicit.map(PathBuf::from) {
        if exists(&path) {
            return Some(path);
        }
        warn!("{} points at missing {}", CHROME_PATH_ENV, path.display());
    }
    candidates.iter().map(PathBuf::from).find(|p| exists(p))
}

/// Command-line flags for a debuggable Chrome with a persistent profile.
pub(super) fn chrome_args(config: &BrowserManagerConfig, profile_dir: &Path) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={}", config.debug_port),
        format!("--user-data-dir={}", profile_dir.display()),
        format!("--window-size={},{}", config.viewport_width, config.viewport_height),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-sync".to_string(),
        "--disable-translate".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }
    args
}

/// Spawn Chrome. The child is killed when its handle drops.
pub(super) fn spawn_chrome(config: &BrowserManagerConfig) -> Result<Child, BrowserError> {
    let chrome = find_chrome().ok_or(BrowserError::ChromeNotFound)?;
    let profile_dir = config.get_profile_dir();
    if let Err(e) = std::fs::create_dir_all(&profile_dir) {
        warn!("Cannot create profile directory {}: {}", profile_dir.display(), e);
    }

    info!(
        chrome = %chrome.display(),
        profile = %profile_dir.display(),
        headless = config.headless,
        "Launching Chrome"
    );
    let child = Command::new(&chrome)
        .args(chrome_args(config, &profile_dir))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| BrowserError::LaunchFailed(format!("{}: {}", chrome.display(), e)))?;
    debug!("Chrome pid {:?}", child.id());
    Ok(child)
}

/// Whether something answers `/json/version` on `endpoint`.
pub(super) async fn endpoint_alive(endpoint: &str) -> bool {
    reqwest::get(format!("{}/json/version", endpoint))
        .await
        .is_ok_and(|r| r.status().is_success())
}

/// Poll `endpoint` until it answers or `attempts` run out.
pub(super) async fn wait_for_endpoint(endpoint: &str, attempts: u32, interval: Duration) -> bool {
    for _ in 0..attempts {
        tokio::time::sleep(interval).await;
        if endpoint_alive(endpoint).await {
            return true;
        }
    }
    false
}
