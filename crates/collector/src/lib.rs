//! js-error-collector: capture JavaScript runtime errors and console output
//!
//! Drives a real browser over its DevTools WebSocket endpoint and
//! records every script error the page raises, together with the
//! console output that preceded it. The original use case is a test
//! harness: navigate to a page, pull the ordered error records, and
//! compare their rendered form against an expectation.
//!
//! # Examples
//!
//! ## Capturing errors from a fixture page
//!
//! ```ignore
//! use js_error_collector::{Browser, JavaScriptError, fixtures, render_report};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Stage an embedded fixture behind a file:// URL
//!     let fixture = fixtures::stage("withConsoleOutput.html")?;
//!
//!     let browser = Browser::launch().await?;
//!     let page = browser.new_page().await?;
//!     page.goto(fixture.url(), None).await?;
//!
//!     let expected = vec![JavaScriptError::with_console(
//!         "TypeError: null has no properties",
//!         fixture.url(),
//!         8,
//!         "before JS error",
//!     )];
//!     assert_eq!(render_report(&page.read_errors()), render_report(&expected));
//!
//!     browser.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Selecting how the browser is obtained
//!
//! ```ignore
//! use js_error_collector::{Browser, DriverConfig, LaunchOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Resolved from JS_COLLECTOR_DRIVER and friends; defaults to a
//!     // fresh throwaway profile on a locally installed browser.
//!     let config = DriverConfig::from_env()?;
//!     let browser = Browser::launch_with(config, LaunchOptions::new().headless(true)).await?;
//!     let version = browser.version().await?;
//!     println!("driving {version}");
//!     browser.close().await?;
//!     Ok(())
//! }
//! ```

// Internal modules (exposed for integration tests)
#[doc(hidden)]
pub mod server;

pub mod api;
pub mod collector;
pub mod config;
mod error;
pub mod fixtures;
pub mod protocol;
pub mod record;

use std::time::Duration;

/// Default timeout for navigation and lifecycle waits.
///
/// Matches the 30s default the mainstream browser automation clients
/// settled on; override per navigation via `GotoOptions::timeout`.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

// Re-export error types
pub use error::{Error, Result};

// Re-export the session API
pub use protocol::{Browser, GotoOptions, Page, WaitUntil};

// Re-export records and their rendered comparison form
pub use record::{JavaScriptError, render_report};

// Re-export collector state machine (useful for feeding recorded event
// streams in downstream tests)
pub use collector::ErrorCollector;

// Re-export configuration
pub use api::LaunchOptions;
pub use config::DriverConfig;
