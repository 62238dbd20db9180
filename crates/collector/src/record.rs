// JavaScript error records
//
// The structured representation of a captured browser-side script error,
// and the loose rendered form tests compare against.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A JavaScript runtime error captured from a browser session.
///
/// Records are produced in the order the browser raised them. The
/// `console` field carries any console output the page emitted before
/// the error (lines joined with `\n`), or `None` when nothing was
/// logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaScriptError {
    /// Error text, e.g. `TypeError: null has no properties`
    pub message: String,
    /// Source URL of the document that raised the error
    pub url: String,
    /// 1-based line number within the source document
    pub line: u32,
    /// Console output preceding the error, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console: Option<String>,
}

impl JavaScriptError {
    /// Creates a record with no preceding console output.
    pub fn new(message: impl Into<String>, url: impl Into<String>, line: u32) -> Self {
        Self {
            message: message.into(),
            url: url.into(),
            line,
            console: None,
        }
    }

    /// Creates a record carrying the console output that preceded the error.
    pub fn with_console(
        message: impl Into<String>,
        url: impl Into<String>,
        line: u32,
        console: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            url: url.into(),
            line,
            console: Some(console.into()),
        }
    }
}

/// Renders as `"{message} (line {line})"`.
///
/// This is the partial form used for test comparison: source URL and
/// console output are deliberately excluded.
impl fmt::Display for JavaScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.line)
    }
}

/// Concatenates the rendered form of every record, in order.
///
/// An empty slice renders as the empty string. Tests assert equality of
/// rendered reports rather than structural equality of the records.
pub fn render_report(errors: &[JavaScriptError]) -> String {
    errors.iter().map(|e| e.to_string()).collect()
}
