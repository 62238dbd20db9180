// Launch options for Browser::launch_with()
//
// All options are optional; unset fields fall back to the collector's
// defaults (headless, discovered executable, 30s launch timeout).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Options for launching a browser
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Additional arguments to pass to the browser instance
    pub args: Option<Vec<String>>,

    /// Environment variables for the browser process
    pub env: Option<HashMap<String, String>>,

    /// Enable Chromium sandboxing (default: false)
    ///
    /// Off by default so sessions work in containers and as root; turn
    /// it on when driving a browser against untrusted pages.
    pub chromium_sandbox: Option<bool>,

    /// Path to a custom browser executable
    pub executable_path: Option<String>,

    /// Run in headless mode (default: true)
    pub headless: Option<bool>,

    /// Timeout for browser launch and endpoint discovery
    pub timeout: Option<Duration>,
}

impl LaunchOptions {
    /// Creates a new LaunchOptions with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set additional arguments to pass to the browser instance
    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = Some(args);
        self
    }

    /// Enable or disable Chromium sandboxing
    pub fn chromium_sandbox(mut self, enabled: bool) -> Self {
        self.chromium_sandbox = Some(enabled);
        self
    }

    /// Set environment variables for the browser process
    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Set path to a custom browser executable
    pub fn executable_path(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Run in headless mode
    pub fn headless(mut self, enabled: bool) -> Self {
        self.headless = Some(enabled);
        self
    }

    /// Set timeout for browser launch and endpoint discovery
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Normalizes the options into the final browser command line.
    ///
    /// The remote-debugging port (0 = ephemeral), the profile directory
    /// and the first-run suppression flags are always pinned; user args
    /// are appended last so they can override defaults where the
    /// browser allows repeated flags.
    pub(crate) fn effective_args(&self, profile_dir: &Path) -> Vec<String> {
        let mut args = Vec::new();

        if self.headless.unwrap_or(true) {
            args.push("--headless=new".to_string());
        }
        if !self.chromium_sandbox.unwrap_or(false) {
            args.push("--no-sandbox".to_string());
        }
        args.push("--remote-debugging-port=0".to_string());
        args.push(format!("--user-data-dir={}", profile_dir.display()));
        args.push("--no-first-run".to_string());
        args.push("--no-default-browser-check".to_string());

        if let Some(user_args) = &self.args {
            args.extend(user_args.iter().cloned());
        }

        args
    }
}
