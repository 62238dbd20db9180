// Error collection
//
// Folds DevTools runtime events into ordered JavaScriptError records.
// This is the replacement for the original capturing add-on: instead of
// an extension inside the browser, the runtime event stream of the
// attached session is observed from outside.

use crate::protocol::format_remote_object;
use crate::record::JavaScriptError;
use serde_json::Value;

/// Accumulates console output and script errors for one page session.
///
/// Fed from the page's event pump with `Runtime.consoleAPICalled` and
/// `Runtime.exceptionThrown` events; produces records in event arrival
/// order. Purely synchronous so it can be unit-tested with synthetic
/// event payloads.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    console: Vec<String>,
    errors: Vec<JavaScriptError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one runtime event into the collector.
    ///
    /// Unknown methods are ignored so the pump can forward every
    /// session event without filtering first.
    pub fn on_event(&mut self, method: &str, params: &Value) {
        match method {
            "Runtime.consoleAPICalled" => self.on_console(params),
            "Runtime.exceptionThrown" => self.on_exception(params),
            _ => {}
        }
    }

    /// Ordered snapshot of the records collected so far.
    pub fn snapshot(&self) -> Vec<JavaScriptError> {
        self.errors.clone()
    }

    /// Drops collected records and buffered console output.
    pub fn clear(&mut self) {
        self.console.clear();
        self.errors.clear();
    }

    fn on_console(&mut self, params: &Value) {
        let line = match params.get("args").and_then(Value::as_array) {
            Some(args) => args
                .iter()
                .map(format_remote_object)
                .collect::<Vec<_>>()
                .join(" "),
            None => return,
        };
        tracing::debug!(%line, "console output");
        self.console.push(line);
    }

    fn on_exception(&mut self, params: &Value) {
        let details = &params["exceptionDetails"];

        // Thrown Error objects carry "TypeError: ...\n    at ..." in the
        // exception description; the record wants the first line only.
        // Parse errors and throws of non-Error values fall back to the
        // top-level text field.
        let message = details
            .get("exception")
            .and_then(|e| e.get("description"))
            .and_then(Value::as_str)
            .map(|d| d.lines().next().unwrap_or(d).to_string())
            .unwrap_or_else(|| {
                details
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or("Uncaught error")
                    .to_string()
            });

        let url = details
            .get("url")
            .and_then(Value::as_str)
            .or_else(|| {
                details
                    .pointer("/stackTrace/callFrames/0/url")
                    .and_then(Value::as_str)
            })
            .unwrap_or("")
            .to_string();

        // DevTools line numbers are 0-based; records are 1-based.
        let line = details.get("lineNumber").and_then(Value::as_u64).unwrap_or(0) as u32 + 1;

        let console = if self.console.is_empty() {
            None
        } else {
            Some(self.console.join("\n"))
        };

        tracing::debug!(%message, %url, line, "script error captured");
        self.errors.push(JavaScriptError {
            message,
            url,
            line,
            console,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn console_event(text: &str) -> Value {
        json!({
            "type": "log",
            "args": [{"type": "string", "value": text}],
            "executionContextId": 1,
            "timestamp": 1000.0
        })
    }

    fn exception_event(description: &str, url: &str, line_zero_based: u64) -> Value {
        json!({
            "timestamp": 1001.0,
            "exceptionDetails": {
                "exceptionId": 1,
                "text": "Uncaught",
                "lineNumber": line_zero_based,
                "columnNumber": 0,
                "url": url,
                "exception": {
                    "type": "object",
                    "subtype": "error",
                    "className": "TypeError",
                    "description": description
                }
            }
        })
    }

    #[test]
    fn test_exception_after_console_attaches_console_text() {
        let mut collector = ErrorCollector::new();
        collector.on_event("Runtime.consoleAPICalled", &console_event("before JS error"));
        collector.on_event(
            "Runtime.exceptionThrown",
            &exception_event(
                "TypeError: null has no properties\n    at file:///tmp/withConsoleOutput.html:8:1",
                "file:///tmp/withConsoleOutput.html",
                7,
            ),
        );

        let errors = collector.snapshot();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "TypeError: null has no properties");
        assert_eq!(errors[0].url, "file:///tmp/withConsoleOutput.html");
        assert_eq!(errors[0].line, 8);
        assert_eq!(errors[0].console.as_deref(), Some("before JS error"));
    }

    #[test]
    fn test_exception_without_console_has_none() {
        let mut collector = ErrorCollector::new();
        collector.on_event(
            "Runtime.exceptionThrown",
            &exception_event("TypeError: null has no properties", "http://x/simple.html", 4),
        );

        let errors = collector.snapshot();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 5);
        assert!(errors[0].console.is_none());
    }

    #[test]
    fn test_multiple_errors_stay_ordered() {
        let mut collector = ErrorCollector::new();
        collector.on_event(
            "Runtime.exceptionThrown",
            &exception_event("Error: first", "http://x/a.html", 0),
        );
        collector.on_event(
            "Runtime.exceptionThrown",
            &exception_event("Error: second", "http://x/a.html", 10),
        );

        let errors = collector.snapshot();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Error: first");
        assert_eq!(errors[1].message, "Error: second");
    }

    #[test]
    fn test_console_lines_join_with_newline() {
        let mut collector = ErrorCollector::new();
        collector.on_event("Runtime.consoleAPICalled", &console_event("one"));
        collector.on_event("Runtime.consoleAPICalled", &console_event("two"));
        collector.on_event(
            "Runtime.exceptionThrown",
            &exception_event("Error: boom", "http://x/", 1),
        );

        let errors = collector.snapshot();
        assert_eq!(errors[0].console.as_deref(), Some("one\ntwo"));
    }

    #[test]
    fn test_multi_arg_console_call_joins_with_space() {
        let mut collector = ErrorCollector::new();
        collector.on_event(
            "Runtime.consoleAPICalled",
            &json!({
                "type": "log",
                "args": [
                    {"type": "string", "value": "count:"},
                    {"type": "number", "value": 3}
                ]
            }),
        );
        collector.on_event(
            "Runtime.exceptionThrown",
            &exception_event("Error: boom", "http://x/", 1),
        );
        assert_eq!(collector.snapshot()[0].console.as_deref(), Some("count: 3"));
    }

    #[test]
    fn test_exception_without_error_object_uses_text() {
        let mut collector = ErrorCollector::new();
        collector.on_event(
            "Runtime.exceptionThrown",
            &json!({
                "timestamp": 1002.0,
                "exceptionDetails": {
                    "exceptionId": 2,
                    "text": "Uncaught SyntaxError: Unexpected token '}'",
                    "lineNumber": 11,
                    "columnNumber": 0,
                    "url": "http://x/broken.html"
                }
            }),
        );

        let errors = collector.snapshot();
        assert_eq!(errors[0].message, "Uncaught SyntaxError: Unexpected token '}'");
        assert_eq!(errors[0].line, 12);
    }

    #[test]
    fn test_url_falls_back_to_top_stack_frame() {
        let mut collector = ErrorCollector::new();
        collector.on_event(
            "Runtime.exceptionThrown",
            &json!({
                "exceptionDetails": {
                    "text": "Uncaught",
                    "lineNumber": 2,
                    "exception": {"description": "Error: boom"},
                    "stackTrace": {
                        "callFrames": [
                            {"url": "http://x/inner.js", "lineNumber": 2, "columnNumber": 4}
                        ]
                    }
                }
            }),
        );
        assert_eq!(collector.snapshot()[0].url, "http://x/inner.js");
    }

    #[test]
    fn test_clear_resets_records_and_console() {
        let mut collector = ErrorCollector::new();
        collector.on_event("Runtime.consoleAPICalled", &console_event("stale"));
        collector.on_event(
            "Runtime.exceptionThrown",
            &exception_event("Error: boom", "http://x/", 1),
        );
        collector.clear();

        assert!(collector.snapshot().is_empty());
        collector.on_event(
            "Runtime.exceptionThrown",
            &exception_event("Error: again", "http://x/", 1),
        );
        assert!(collector.snapshot()[0].console.is_none());
    }

    #[test]
    fn test_unrelated_events_are_ignored() {
        let mut collector = ErrorCollector::new();
        collector.on_event("Page.loadEventFired", &json!({"timestamp": 1.0}));
        assert!(collector.snapshot().is_empty());
    }
}
