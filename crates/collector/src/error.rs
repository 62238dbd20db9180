// Error types for js-error-collector

use thiserror::Error;

/// Result type alias for js-error-collector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving a browser session
#[derive(Debug, Error)]
pub enum Error {
    /// No browser executable could be located
    ///
    /// The collector looked at the explicit launch option, the
    /// `JS_COLLECTOR_BROWSER` environment variable and the well-known
    /// install locations for the current platform.
    #[error(
        "No browser executable found. Install Chromium or Chrome, \
        or point JS_COLLECTOR_BROWSER at the binary."
    )]
    BrowserNotFound,

    /// Failed to launch the browser process
    ///
    /// Common causes: missing shared libraries, a profile directory that
    /// is already locked, or insufficient permissions.
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Failed to establish the DevTools WebSocket connection
    #[error("Failed to connect to DevTools endpoint: {0}")]
    ConnectionFailed(String),

    /// Transport-level error (WebSocket communication)
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Protocol-level error (DevTools command rejected or malformed message)
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Timeout waiting for an operation
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Navigation exceeded its timeout before the lifecycle event fired
    #[error("Navigation timeout after {duration_ms}ms navigating to '{url}'")]
    NavigationTimeout { url: String, duration_ms: u64 },

    /// The browser refused or aborted the navigation
    ///
    /// Carries the `errorText` reported by the browser, e.g.
    /// `net::ERR_FILE_NOT_FOUND`.
    #[error("Navigation to '{url}' failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    /// Target was closed (browser or page)
    ///
    /// Occurs when attempting to perform an operation on a closed target.
    #[error("Target closed: cannot perform operation on closed {target_type}. {context}")]
    TargetClosed {
        target_type: String,
        context: String,
    },

    /// Channel closed unexpectedly
    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    /// Invalid argument provided to method
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Driver configuration could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }
}
