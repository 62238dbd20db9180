// DevTools transport layer
//
// Handles bidirectional communication with the browser. The DevTools
// endpoint is a WebSocket regardless of how the browser was obtained
// (launched locally or attached remotely), so WebSocket is the only
// transport.

use crate::Result;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::pin::Pin;

pub mod websocket;

pub use websocket::WebSocketTransport;

/// Transport trait for abstracting communication mechanisms
pub trait Transport: Send {
    /// Send a JSON message to the browser
    fn send(&mut self, message: JsonValue) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Trait for the sending half of a transport
pub trait TransportSender: Send + Unpin {
    fn send(&mut self, message: JsonValue)
    -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Trait for the receiving half of a transport
pub trait TransportReceiver: Send + Unpin {
    /// Run the receive loop
    fn run(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
