// Page protocol object
//
// One attached page session: navigation, script evaluation, and the
// error-record accessor. Runtime events for the session are pumped into
// the page's collector by a background task.

use crate::collector::ErrorCollector;
use crate::error::{Error, Result};
use crate::protocol::format_remote_object;
use crate::record::JavaScriptError;
use crate::server::connection::Connection;
use parking_lot::{Mutex, RwLock};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Which lifecycle event ends a navigation wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// Wait for the `load` event (default)
    Load,
    /// Wait for `DOMContentLoaded`
    DomContentLoaded,
}

/// Options for [`Page::goto`]
#[derive(Debug, Clone, Default)]
pub struct GotoOptions {
    /// Maximum time to wait for the navigation to finish
    pub timeout: Option<Duration>,
    /// Lifecycle event that completes the navigation
    pub wait_until: Option<WaitUntil>,
}

impl GotoOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = Some(wait_until);
        self
    }
}

/// A page within a connected browser.
///
/// Created by `Browser::new_page()`. The page owns an error collector
/// fed from its runtime event stream; `read_errors()` is the accessor
/// tests use to pull the ordered records after navigating.
#[derive(Clone)]
pub struct Page {
    connection: Arc<Connection>,
    target_id: String,
    session_id: String,
    /// Last successfully navigated URL
    url: Arc<RwLock<String>>,
    collector: Arc<Mutex<ErrorCollector>>,
    load_events: watch::Sender<u64>,
    dom_events: watch::Sender<u64>,
}

impl Page {
    /// Wires up a freshly attached target: subscribes to its session
    /// events, starts the event pump, and enables the Page and Runtime
    /// domains so lifecycle and error events flow.
    pub(crate) async fn attach(
        connection: Arc<Connection>,
        target_id: String,
        session_id: String,
    ) -> Result<Self> {
        let mut events = connection.subscribe_session(&session_id);
        let collector = Arc::new(Mutex::new(ErrorCollector::new()));
        let (load_events, _) = watch::channel(0u64);
        let (dom_events, _) = watch::channel(0u64);

        let pump_collector = Arc::clone(&collector);
        let pump_load = load_events.clone();
        let pump_dom = dom_events.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event.method.as_str() {
                    "Runtime.consoleAPICalled" | "Runtime.exceptionThrown" => {
                        pump_collector.lock().on_event(&event.method, &event.params);
                    }
                    "Page.loadEventFired" => {
                        pump_load.send_modify(|n| *n += 1);
                    }
                    "Page.domContentEventFired" => {
                        pump_dom.send_modify(|n| *n += 1);
                    }
                    _ => {
                        tracing::trace!(method = %event.method, "unhandled page event");
                    }
                }
            }
            tracing::debug!("page event pump ended");
        });

        let page = Self {
            connection,
            target_id,
            session_id,
            url: Arc::new(RwLock::new("about:blank".to_string())),
            collector,
            load_events,
            dom_events,
        };

        page.send("Page.enable", Value::Null).await?;
        page.send("Runtime.enable", Value::Null).await?;

        Ok(page)
    }

    async fn send(&self, method: &str, params: Value) -> Result<Value> {
        self.connection
            .send_command(Some(&self.session_id), method, params)
            .await
    }

    /// Returns the last committed URL. Fresh pages are at "about:blank".
    pub fn url(&self) -> String {
        self.url.read().clone()
    }

    /// DevTools session id of this page's flat attachment
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Navigates the page and waits for the configured lifecycle event.
    ///
    /// # Errors
    ///
    /// Returns `Error::NavigationFailed` when the browser reports an
    /// `errorText` (bad scheme, unreachable host, missing file) and
    /// `Error::NavigationTimeout` when the lifecycle event does not
    /// fire within the timeout.
    pub async fn goto(&self, url: &str, options: Option<GotoOptions>) -> Result<()> {
        let opts = options.unwrap_or_default();
        let timeout = opts.timeout.unwrap_or(crate::DEFAULT_NAVIGATION_TIMEOUT);
        let wait_until = opts.wait_until.unwrap_or(WaitUntil::Load);

        // Subscribe before sending so a lifecycle event that fires
        // between the command response and the wait is not lost.
        let mut lifecycle = match wait_until {
            WaitUntil::Load => self.load_events.subscribe(),
            WaitUntil::DomContentLoaded => self.dom_events.subscribe(),
        };
        let seen = *lifecycle.borrow_and_update();

        let result = self.send("Page.navigate", json!({"url": url})).await?;
        if let Some(reason) = result
            .get("errorText")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
        {
            return Err(Error::NavigationFailed {
                url: url.to_string(),
                reason: reason.to_string(),
            });
        }

        let wait = async {
            while *lifecycle.borrow_and_update() <= seen {
                lifecycle.changed().await.map_err(|_| Error::ChannelClosed)?;
            }
            Ok::<(), Error>(())
        };
        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| Error::NavigationTimeout {
                url: url.to_string(),
                duration_ms: timeout.as_millis() as u64,
            })??;

        *self.url.write() = url.to_string();
        Ok(())
    }

    /// Ordered snapshot of the JavaScript errors captured on this page.
    ///
    /// This is the accessor the harness reads after navigation; calling
    /// it does not consume the records.
    pub fn read_errors(&self) -> Vec<JavaScriptError> {
        self.collector.lock().snapshot()
    }

    /// Drops captured errors and buffered console output.
    pub fn clear_errors(&self) {
        self.collector.lock().clear();
    }

    /// Evaluates an expression in the page and returns the result as
    /// display text.
    pub async fn evaluate_value(&self, expression: &str) -> Result<String> {
        let result = self
            .send(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let text = details
                .pointer("/exception/description")
                .and_then(Value::as_str)
                .or_else(|| details.get("text").and_then(Value::as_str))
                .unwrap_or("evaluation failed");
            return Err(Error::ProtocolError(format!("Evaluation failed: {text}")));
        }

        Ok(result
            .get("result")
            .map(format_remote_object)
            .unwrap_or_else(|| "undefined".to_string()))
    }

    /// Closes the page's target and stops routing its events.
    pub async fn close(&self) -> Result<()> {
        self.connection
            .send_command(
                None,
                "Target.closeTarget",
                json!({"targetId": self.target_id}),
            )
            .await?;
        self.connection.unsubscribe_session(&self.session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goto_options_default() {
        let opts = GotoOptions::default();
        assert!(opts.timeout.is_none());
        assert!(opts.wait_until.is_none());
    }

    #[test]
    fn test_goto_options_builder() {
        let opts = GotoOptions::new()
            .timeout(Duration::from_secs(10))
            .wait_until(WaitUntil::DomContentLoaded);
        assert_eq!(opts.timeout, Some(Duration::from_secs(10)));
        assert_eq!(opts.wait_until, Some(WaitUntil::DomContentLoaded));
    }
}
