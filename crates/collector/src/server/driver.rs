// Browser executable and profile discovery
//
// Locates a Chromium-family browser to drive. The collector talks plain
// DevTools protocol, so anything in that family works; Firefox-specific
// profiles of the original harness map onto user-data directories here.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Candidate executable names probed on PATH, most specific first.
const EXECUTABLE_NAMES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
    "msedge",
];

/// Locate the browser executable to launch
///
/// The search order is:
/// 1. `JS_COLLECTOR_BROWSER` environment variable (user override)
/// 2. Candidate names resolved through `which`/`where`
/// 3. Well-known install locations for the current platform
///
/// # Errors
///
/// Returns `Error::BrowserNotFound` if no executable can be located.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Some(path) = try_env_override()? {
        return Ok(path);
    }

    for name in EXECUTABLE_NAMES {
        if let Some(path) = try_path_lookup(name) {
            return Ok(path);
        }
    }

    for location in common_locations() {
        let path = PathBuf::from(location);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(Error::BrowserNotFound)
}

/// Try the JS_COLLECTOR_BROWSER environment variable
fn try_env_override() -> Result<Option<PathBuf>> {
    if let Ok(value) = std::env::var("JS_COLLECTOR_BROWSER") {
        let path = PathBuf::from(&value);
        if !path.exists() {
            return Err(Error::Config(format!(
                "JS_COLLECTOR_BROWSER points at '{value}' which does not exist"
            )));
        }
        return Ok(Some(path));
    }
    Ok(None)
}

/// Resolve an executable name through the platform's PATH lookup command
fn try_path_lookup(name: &str) -> Option<PathBuf> {
    #[cfg(not(windows))]
    let which_cmd = "which";
    #[cfg(windows)]
    let which_cmd = "where";

    let output = Command::new(which_cmd).arg(name).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next()?.trim();
    if first.is_empty() {
        return None;
    }

    let path = PathBuf::from(first);
    path.exists().then_some(path)
}

#[cfg(not(windows))]
fn common_locations() -> &'static [&'static str] {
    &[
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/local/bin/chromium",
        "/opt/google/chrome/chrome",
        "/snap/bin/chromium",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    ]
}

#[cfg(windows)]
fn common_locations() -> &'static [&'static str] {
    &[
        "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
        "C:\\Program Files (x86)\\Google\\Chrome\\Application\\chrome.exe",
        "C:\\Program Files (x86)\\Microsoft\\Edge\\Application\\msedge.exe",
    ]
}

/// Resolve the directory for a named persistent profile
///
/// Profiles live under `JS_COLLECTOR_PROFILE_ROOT` when set, otherwise
/// under the platform's per-user data directory. The directory is
/// created on first use.
pub fn profile_dir(name: &str) -> Result<PathBuf> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(Error::InvalidArgument(format!(
            "invalid profile name: '{name}'"
        )));
    }

    let root = profiles_root()?;
    let dir = root.join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn profiles_root() -> Result<PathBuf> {
    if let Some(root) = std::env::var_os("JS_COLLECTOR_PROFILE_ROOT") {
        return Ok(PathBuf::from(root));
    }

    #[cfg(windows)]
    {
        let base = std::env::var_os("LOCALAPPDATA")
            .ok_or_else(|| Error::Config("LOCALAPPDATA is not set".to_string()))?;
        Ok(Path::new(&base).join("js-error-collector").join("profiles"))
    }

    #[cfg(not(windows))]
    {
        let home = std::env::var_os("HOME")
            .ok_or_else(|| Error::Config("HOME is not set".to_string()))?;
        Ok(Path::new(&home)
            .join(".local")
            .join("share")
            .join("js-error-collector")
            .join("profiles"))
    }
}
