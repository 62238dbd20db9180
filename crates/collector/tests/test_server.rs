// Test Server - Local HTTP server for integration tests
//
// Serves the embedded fixture pages over HTTP so capture tests run
// deterministically and offline.

// Note: Functions appear "unused" because each test binary compiles separately,
// but they ARE used across multiple test files. Suppress false-positive warnings.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    extract::Path,
    http::{Response, StatusCode},
    routing::get,
};
use js_error_collector::fixtures;
use std::net::SocketAddr;
use tokio::task::JoinHandle;

/// Test server handle
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start the test server on a random available port
    pub async fn start() -> Self {
        let app = Router::new().route("/{page}", get(serve_fixture));

        // Bind to port 0 to get any available port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");

        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server failed");
        });

        TestServer { addr, handle }
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the URL of a fixture page
    pub fn page_url(&self, name: &str) -> String {
        format!("http://{}/{}", self.addr, name)
    }

    /// Shutdown the test server
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

async fn serve_fixture(Path(page): Path<String>) -> Response<Body> {
    match fixtures::page(&page) {
        Some(content) => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/html")
            .body(Body::from(content))
            .unwrap(),
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("no such fixture"))
            .unwrap(),
    }
}
