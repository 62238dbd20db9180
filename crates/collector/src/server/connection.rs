//! Connection layer for the DevTools protocol
//!
//! Correlates command responses by id and routes session-scoped events
//! to their subscribers. One connection serves the browser-level
//! session and every flat page session attached over it.

use crate::error::{Error, Result};
use crate::protocol::{Event, Message, Request, parse_protocol_error};
use crate::server::transport::{TransportReceiver, TransportSender};
use parking_lot::Mutex as ParkingLotMutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex as TokioMutex;
use tokio::sync::{mpsc, oneshot};

type SubscriberMap = HashMap<String, mpsc::UnboundedSender<Event>>;

/// A live DevTools connection
pub struct Connection {
    last_id: AtomicU32,
    callbacks: Arc<TokioMutex<HashMap<u32, oneshot::Sender<Result<Value>>>>>,
    sender: Arc<TokioMutex<Box<dyn TransportSender>>>,
    message_rx: Arc<TokioMutex<Option<mpsc::UnboundedReceiver<Value>>>>,
    transport_receiver: Arc<TokioMutex<Option<Box<dyn TransportReceiver>>>>,
    subscribers: Arc<ParkingLotMutex<SubscriberMap>>,
}

impl Connection {
    pub fn new(
        sender: impl TransportSender + 'static,
        receiver: impl TransportReceiver + 'static,
        message_rx: mpsc::UnboundedReceiver<Value>,
    ) -> Self {
        Self {
            last_id: AtomicU32::new(0),
            callbacks: Arc::new(TokioMutex::new(HashMap::new())),
            sender: Arc::new(TokioMutex::new(Box::new(sender))),
            message_rx: Arc::new(TokioMutex::new(Some(message_rx))),
            transport_receiver: Arc::new(TokioMutex::new(Some(Box::new(receiver)))),
            subscribers: Arc::new(ParkingLotMutex::new(HashMap::new())),
        }
    }

    /// Sends a command and awaits its response.
    ///
    /// `session_id` addresses a flat page session; `None` addresses the
    /// browser itself (Target.*, Browser.*).
    pub async fn send_command(
        &self,
        session_id: Option<&str>,
        method: &str,
        params: Value,
    ) -> Result<Value> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::debug!(id, method, session = session_id.unwrap_or("<browser>"), "sending command");

        let (tx, rx) = oneshot::channel();
        self.callbacks.lock().await.insert(id, tx);

        let request = Request {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };

        let request_value = serde_json::to_value(&request)?;

        if let Err(e) = self.sender.lock().await.send(request_value).await {
            tracing::error!(id, method, error = %e, "failed to send command");
            self.callbacks.lock().await.remove(&id);
            return Err(e);
        }

        rx.await
            .map_err(|_| Error::ChannelClosed)
            .and_then(|result| result)
    }

    /// Registers a subscriber for events carrying the given session id.
    ///
    /// Later registrations for the same session replace earlier ones.
    pub fn subscribe_session(&self, session_id: &str) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().insert(session_id.to_string(), tx);
        rx
    }

    /// Drops the subscriber for a session; its events are discarded.
    pub fn unsubscribe_session(&self, session_id: &str) {
        self.subscribers.lock().remove(session_id);
    }

    /// Runs the message loop until the transport closes.
    ///
    /// Must be spawned once, right after construction.
    pub async fn run(self: &Arc<Self>) {
        let mut transport_receiver = self
            .transport_receiver
            .lock()
            .await
            .take()
            .expect("run() can only be called once - transport receiver already taken");

        let transport_handle = tokio::spawn(async move {
            if let Err(e) = transport_receiver.run().await {
                tracing::error!("Transport error: {}", e);
            }
        });

        let mut message_rx = self
            .message_rx
            .lock()
            .await
            .take()
            .expect("run() can only be called once - message receiver already taken");

        while let Some(message_value) = message_rx.recv().await {
            match serde_json::from_value::<Message>(message_value) {
                Ok(message) => {
                    if let Err(e) = self.dispatch_internal(message).await {
                        tracing::error!("Error dispatching message: {}", e);
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to parse message: {}", e);
                }
            }
        }

        tracing::debug!("Message loop ended (transport closed)");
        let _ = transport_handle.await;
    }

    async fn dispatch_internal(self: &Arc<Self>, message: Message) -> Result<()> {
        match message {
            Message::Response(response) => {
                tracing::debug!(id = response.id, "processing response");
                let callback = self
                    .callbacks
                    .lock()
                    .await
                    .remove(&response.id)
                    .ok_or_else(|| {
                        Error::ProtocolError(format!(
                            "Cannot find request to respond: id={}",
                            response.id
                        ))
                    })?;

                let result = if let Some(error) = response.error {
                    Err(parse_protocol_error(error))
                } else {
                    Ok(response.result.unwrap_or(Value::Null))
                };

                let _ = callback.send(result);
                Ok(())
            }
            Message::Event(event) => {
                let Some(session_id) = event.session_id.clone() else {
                    // Browser-level events (Target.targetCreated and
                    // friends) have no consumer here.
                    tracing::trace!(method = %event.method, "browser-level event");
                    return Ok(());
                };

                let subscriber = self.subscribers.lock().get(&session_id).cloned();
                match subscriber {
                    Some(tx) => {
                        if tx.send(event).is_err() {
                            // Subscriber side was dropped; stop routing
                            // this session.
                            self.subscribers.lock().remove(&session_id);
                        }
                        Ok(())
                    }
                    None => {
                        tracing::warn!(
                            method = %event.method,
                            session = %session_id,
                            "event for unknown session"
                        );
                        Ok(())
                    }
                }
            }
        }
    }
}
