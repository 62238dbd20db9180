// Browser process management
//
// Launches the browser with remote debugging enabled, discovers the
// DevTools endpoint it announces on stderr, and guarantees the process
// dies with the handle.

use crate::api::LaunchOptions;
use crate::config::DriverConfig;
use crate::server::driver::{find_browser_executable, profile_dir};
use crate::{Error, Result};
use regex::Regex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};

/// How long to wait for the browser to announce its DevTools endpoint
/// when no launch timeout is configured.
const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Manages the browser process lifecycle
///
/// Wraps the launched browser child process together with the DevTools
/// WebSocket endpoint it announced. Teardown is guaranteed on every
/// exit path: `shutdown()` for the graceful case, and the child is
/// spawned with `kill_on_drop` so dropping the handle (panic, early
/// return, failed test) kills the browser too.
#[derive(Debug)]
pub struct BrowserServer {
    process: Child,
    ws_url: String,
    /// Scratch profile for local-install sessions; removing the handle
    /// removes the directory.
    _profile: Option<TempDir>,
}

impl BrowserServer {
    /// Launch a browser according to the driver configuration
    ///
    /// `LocalInstall` creates a throwaway profile directory;
    /// `LocalProfile` resolves the named persistent profile. A `Remote`
    /// configuration never launches a process and is rejected here.
    ///
    /// # Errors
    ///
    /// Returns `Error::BrowserNotFound` if no executable can be located,
    /// `Error::LaunchFailed` if the process fails to start or exits
    /// before announcing an endpoint, and `Error::Timeout` if the
    /// endpoint is not announced within the launch timeout.
    pub async fn launch(config: &DriverConfig, options: &LaunchOptions) -> Result<Self> {
        let executable = match &options.executable_path {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "executable_path '{}' does not exist",
                        path.display()
                    )));
                }
                path
            }
            None => find_browser_executable()?,
        };

        let (profile_path, scratch) = match config {
            DriverConfig::LocalInstall => {
                let dir = tempfile::Builder::new()
                    .prefix("js-collector-profile-")
                    .tempdir()?;
                (dir.path().to_path_buf(), Some(dir))
            }
            DriverConfig::LocalProfile { name } => (profile_dir(name)?, None),
            DriverConfig::Remote { .. } => {
                return Err(Error::InvalidArgument(
                    "remote driver config attaches to an existing endpoint; nothing to launch"
                        .to_string(),
                ));
            }
        };

        let args = options.effective_args(&profile_path);
        tracing::debug!(executable = %executable.display(), ?args, "launching browser");

        let mut command = Command::new(&executable);
        command
            .args(&args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        if let Some(env) = &options.env {
            command.envs(env);
        }

        let mut child = command.spawn().map_err(|e| {
            Error::LaunchFailed(format!("Failed to spawn {}: {}", executable.display(), e))
        })?;

        let stderr = child.stderr.take().ok_or_else(|| {
            Error::LaunchFailed("Failed to capture browser stderr".to_string())
        })?;

        let timeout = options.timeout.unwrap_or(DEFAULT_LAUNCH_TIMEOUT);
        let ws_url = match tokio::time::timeout(timeout, read_endpoint(stderr)).await {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => {
                let _ = child.start_kill();
                return Err(e);
            }
            Err(_) => {
                let _ = child.start_kill();
                return Err(Error::Timeout(format!(
                    "Browser did not announce a DevTools endpoint within {}ms",
                    timeout.as_millis()
                )));
            }
        };

        tracing::debug!(%ws_url, "browser ready");

        Ok(Self {
            process: child,
            ws_url,
            _profile: scratch,
        })
    }

    /// The DevTools WebSocket endpoint announced by the browser
    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Shut down the browser gracefully
    ///
    /// Kills the process and waits for it to exit. Callers that lose
    /// the handle without calling this still get the kill via
    /// `kill_on_drop`; they only skip the wait.
    pub async fn shutdown(mut self) -> Result<()> {
        self.process
            .kill()
            .await
            .map_err(|e| Error::LaunchFailed(format!("Failed to kill browser process: {}", e)))?;

        let _ = self.process.wait().await;
        Ok(())
    }
}

/// Scans browser stderr for the `DevTools listening on ws://…` line.
///
/// Once the endpoint is found, a background task keeps draining stderr
/// so the browser never blocks on a full pipe.
async fn read_endpoint(stderr: ChildStderr) -> Result<String> {
    let mut lines = BufReader::new(stderr).lines();
    let mut tail: VecDeque<String> = VecDeque::new();

    let url = loop {
        let line = lines.next_line().await.map_err(|e| {
            Error::LaunchFailed(format!("Failed to read browser stderr: {}", e))
        })?;

        let Some(line) = line else {
            let context: Vec<String> = tail.into();
            return Err(Error::LaunchFailed(format!(
                "Browser exited before announcing a DevTools endpoint: {}",
                context.join(" | ")
            )));
        };

        tracing::trace!("browser: {line}");
        if let Some(url) = parse_endpoint_line(&line) {
            break url;
        }

        if tail.len() == 5 {
            tail.pop_front();
        }
        tail.push_back(line);
    };

    tokio::spawn(async move {
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::trace!("browser: {line}");
        }
    });

    Ok(url)
}

/// Extracts the WebSocket URL from a DevTools announcement line.
fn parse_endpoint_line(line: &str) -> Option<String> {
    let re = Regex::new(r"DevTools listening on (ws://\S+)").expect("valid endpoint pattern");
    re.captures(line).map(|c| c[1].to_string())
}
