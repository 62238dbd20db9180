//! DevTools protocol message types and protocol objects

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod browser;
mod page;

pub use browser::Browser;
pub use page::{GotoOptions, Page, WaitUntil};

/// Protocol command sent to the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u32,
    pub method: String,
    #[serde(skip_serializing_if = "is_value_null")]
    pub params: Value,
    /// Flat-session discriminator; absent for browser-level commands
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

fn is_value_null(v: &Value) -> bool {
    v.is_null()
}

/// Protocol response from the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Protocol event pushed by the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Any inbound protocol message: a response carries an `id`, an event
/// carries a `method`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Response(Response),
    Event(Event),
}

/// Converts a protocol error payload into a typed error.
///
/// Commands addressed to a target or session that has gone away come
/// back as plain protocol errors; those are surfaced as `TargetClosed`
/// so callers can tell a torn-down session from a genuine protocol
/// problem.
pub(crate) fn parse_protocol_error(payload: ErrorPayload) -> Error {
    let message = &payload.message;

    if message.contains("No target with given id")
        || message.contains("Session with given id not found")
        || message.contains("Target closed")
    {
        return Error::TargetClosed {
            target_type: "page".to_string(),
            context: message.clone(),
        };
    }

    match payload.data {
        Some(data) => Error::ProtocolError(format!("{} (code {}): {}", message, payload.code, data)),
        None => Error::ProtocolError(format!("{} (code {})", message, payload.code)),
    }
}

/// Renders a DevTools remote object as display text.
///
/// Primitive values render as their JavaScript source text, objects as
/// their description; `undefined` has neither and renders literally.
pub(crate) fn format_remote_object(object: &Value) -> String {
    if let Some(s) = object.get("value").and_then(Value::as_str) {
        return s.to_string();
    }
    if let Some(v) = object.get("value") {
        return v.to_string();
    }
    if let Some(v) = object.get("unserializableValue").and_then(Value::as_str) {
        return v.to_string();
    }
    if let Some(d) = object.get("description").and_then(Value::as_str) {
        return d.to_string();
    }
    "undefined".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_absent_session_id() {
        let request = Request {
            id: 1,
            method: "Browser.getVersion".to_string(),
            params: Value::Null,
            session_id: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("sessionId").is_none());
        assert!(value.get("params").is_none());
    }

    #[test]
    fn test_message_parses_response_and_event() {
        let response: Message =
            serde_json::from_value(json!({"id": 3, "result": {"product": "Chrome"}})).unwrap();
        assert!(matches!(response, Message::Response(_)));

        let event: Message = serde_json::from_value(json!({
            "method": "Page.loadEventFired",
            "params": {"timestamp": 12.5},
            "sessionId": "SESSION"
        }))
        .unwrap();
        match event {
            Message::Event(e) => {
                assert_eq!(e.method, "Page.loadEventFired");
                assert_eq!(e.session_id.as_deref(), Some("SESSION"));
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn test_event_without_params_defaults_to_null() {
        let event: Event =
            serde_json::from_value(json!({"method": "Inspector.detached"})).unwrap();
        assert!(event.params.is_null());
    }

    #[test]
    fn test_missing_target_errors_map_to_target_closed() {
        let err = parse_protocol_error(ErrorPayload {
            code: -32602,
            message: "No target with given id found".to_string(),
            data: None,
        });
        assert!(matches!(err, Error::TargetClosed { .. }), "got: {err:?}");
    }

    #[test]
    fn test_other_errors_stay_protocol_errors() {
        let err = parse_protocol_error(ErrorPayload {
            code: -32601,
            message: "'Page.unknown' wasn't found".to_string(),
            data: None,
        });
        assert!(matches!(err, Error::ProtocolError(_)), "got: {err:?}");
    }

    #[test]
    fn test_format_remote_object_variants() {
        assert_eq!(
            format_remote_object(&json!({"type": "string", "value": "before JS error"})),
            "before JS error"
        );
        assert_eq!(format_remote_object(&json!({"type": "number", "value": 42})), "42");
        assert_eq!(format_remote_object(&json!({"type": "object", "value": null})), "null");
        assert_eq!(
            format_remote_object(&json!({"type": "number", "unserializableValue": "NaN"})),
            "NaN"
        );
        assert_eq!(
            format_remote_object(
                &json!({"type": "object", "className": "Date", "description": "Tue Aug 04 2026"})
            ),
            "Tue Aug 04 2026"
        );
        assert_eq!(format_remote_object(&json!({"type": "undefined"})), "undefined");
    }
}
