// Browser protocol object
//
// The entry point: owns the DevTools connection and, for locally
// launched sessions, the browser process.

use crate::api::LaunchOptions;
use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::protocol::Page;
use crate::server::browser_server::BrowserServer;
use crate::server::connection::Connection;
use crate::server::transport::WebSocketTransport;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// A connected browser session.
///
/// Obtained through [`Browser::launch`] (driver configuration from the
/// environment) or [`Browser::launch_with`]. For `local-install` and
/// `local-profile` configurations the browser process belongs to this
/// handle and dies with it; for `remote` the handle only owns the
/// connection.
///
/// # Example
///
/// ```ignore
/// use js_error_collector::{Browser, render_report};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let browser = Browser::launch().await?;
///     let page = browser.new_page().await?;
///
///     page.goto("http://localhost:8000/withConsoleOutput.html", None).await?;
///     let errors = page.read_errors();
///     println!("{}", render_report(&errors));
///
///     browser.close().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Browser {
    connection: Arc<Connection>,
    /// Locally launched browser process, `None` for remote sessions.
    ///
    /// `Option` inside a shared mutex so `close()` can take ownership
    /// for the graceful shutdown while clones keep working.
    server: Arc<Mutex<Option<BrowserServer>>>,
}

impl Browser {
    /// Launches a browser using the driver configuration resolved from
    /// the environment and default launch options.
    pub async fn launch() -> Result<Self> {
        Self::launch_with(DriverConfig::from_env()?, LaunchOptions::default()).await
    }

    /// Launches or attaches according to an explicit configuration.
    ///
    /// This will:
    /// 1. Start the browser process (or skip it for `Remote`)
    /// 2. Connect to the DevTools WebSocket endpoint
    /// 3. Spawn the connection message loop
    pub async fn launch_with(config: DriverConfig, options: LaunchOptions) -> Result<Self> {
        let (server, ws_url) = match &config {
            DriverConfig::Remote { endpoint } => (None, endpoint.clone()),
            _ => {
                let server = BrowserServer::launch(&config, &options).await?;
                let ws_url = server.ws_url().to_string();
                (Some(server), ws_url)
            }
        };

        tracing::debug!(%ws_url, "connecting to DevTools endpoint");
        let (transport, message_rx) = WebSocketTransport::connect(&ws_url).await?;
        let (sender, receiver) = transport.into_parts();
        let connection = Arc::new(Connection::new(sender, receiver, message_rx));

        let conn_for_loop = Arc::clone(&connection);
        tokio::spawn(async move {
            conn_for_loop.run().await;
        });

        Ok(Self {
            connection,
            server: Arc::new(Mutex::new(server)),
        })
    }

    /// Browser product string, e.g. `Chrome/139.0.7258.66`.
    pub async fn version(&self) -> Result<String> {
        let result = self
            .connection
            .send_command(None, "Browser.getVersion", Value::Null)
            .await?;

        result
            .get("product")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::ProtocolError("Browser.getVersion response missing 'product'".to_string())
            })
    }

    /// Opens a fresh page and attaches an error collector to it.
    pub async fn new_page(&self) -> Result<Page> {
        let result = self
            .connection
            .send_command(None, "Target.createTarget", json!({"url": "about:blank"}))
            .await?;

        let target_id = result
            .get("targetId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::ProtocolError("Target.createTarget response missing 'targetId'".to_string())
            })?
            .to_string();

        let result = self
            .connection
            .send_command(
                None,
                "Target.attachToTarget",
                json!({"targetId": target_id, "flatten": true}),
            )
            .await?;

        let session_id = result
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::ProtocolError(
                    "Target.attachToTarget response missing 'sessionId'".to_string(),
                )
            })?
            .to_string();

        Page::attach(Arc::clone(&self.connection), target_id, session_id).await
    }

    /// Closes the browser and tears down the local process if any.
    ///
    /// The browser may drop the socket before acknowledging
    /// `Browser.close`; the command is therefore bounded and its
    /// outcome only logged. The process kill is what actually
    /// guarantees teardown.
    pub async fn close(&self) -> Result<()> {
        let close = self
            .connection
            .send_command(None, "Browser.close", Value::Null);
        match tokio::time::timeout(Duration::from_secs(5), close).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::debug!("Browser.close returned an error: {e}"),
            Err(_) => tracing::debug!("Browser.close timed out"),
        }

        let server = self.server.lock().take();
        if let Some(server) = server {
            server.shutdown().await?;
        }
        Ok(())
    }
}
