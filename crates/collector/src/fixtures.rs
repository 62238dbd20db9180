// Fixture pages
//
// Embedded HTML pages addressed by file name, plus staging onto disk
// behind a file:// URL. Line positions inside the page sources are
// load-bearing: the capture tests assert the exact line a script error
// is raised on, so edits here must keep the <script> blocks where they
// are.

use crate::error::{Error, Result};
use std::path::Path;
use tempfile::TempDir;
use url::Url;

/// Page logging to the console and then raising a TypeError on line 8.
const WITH_CONSOLE_OUTPUT: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>With console output</title>
<script>
console.log('before JS error');
var data = null;
throw new TypeError('null has no properties');
</script>
</head>
<body>
<p>A page logging to the console before raising a script error.</p>
</body>
</html>
"#;

/// Page raising a TypeError on line 5 with no console output.
const SIMPLE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Simple page</title>
<script>
throw new TypeError('null has no properties');
</script>
</head>
<body><p>A page raising a script error with no console output.</p></body>
</html>
"#;

/// Page with a script that completes without errors.
const WITHOUT_ERROR: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Without error</title>
<script>
document.title = 'Without error';
</script>
</head>
<body><p>A page whose script runs cleanly.</p></body>
</html>
"#;

/// Returns the embedded fixture page with the given file name.
pub fn page(name: &str) -> Option<&'static str> {
    match name {
        "withConsoleOutput.html" => Some(WITH_CONSOLE_OUTPUT),
        "simple.html" => Some(SIMPLE),
        "withoutError.html" => Some(WITHOUT_ERROR),
        _ => None,
    }
}

/// A fixture page written to a scratch directory.
///
/// Owns the directory: the file exists for as long as the handle is
/// alive, and is removed with the directory when dropped.
#[derive(Debug)]
pub struct StagedFixture {
    _dir: TempDir,
    url: Url,
}

impl StagedFixture {
    /// The file:// URL of the staged page.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

/// Writes the named fixture page into a fresh scratch directory and
/// returns its file:// URL, percent-escaped per RFC 3986.
pub fn stage(name: &str) -> Result<StagedFixture> {
    let content =
        page(name).ok_or_else(|| Error::InvalidArgument(format!("unknown fixture page: {name}")))?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join(name);
    std::fs::write(&path, content)?;
    let url = file_url(&path)?;

    Ok(StagedFixture { _dir: dir, url })
}

/// Builds a file:// URL for an absolute path.
fn file_url(path: &Path) -> Result<Url> {
    Url::from_file_path(path)
        .map_err(|_| Error::InvalidArgument(format!("not an absolute path: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_pages_resolve() {
        assert!(page("withConsoleOutput.html").is_some());
        assert!(page("simple.html").is_some());
        assert!(page("withoutError.html").is_some());
        assert!(page("missing.html").is_none());
    }

    #[test]
    fn test_error_lines_are_where_tests_expect_them() {
        let with_console: Vec<&str> = WITH_CONSOLE_OUTPUT.lines().collect();
        assert!(with_console[5].contains("before JS error"));
        assert!(with_console[7].contains("null has no properties"), "line 8 moved");

        let simple: Vec<&str> = SIMPLE.lines().collect();
        assert!(simple[4].contains("null has no properties"), "line 5 moved");
    }

    #[test]
    fn test_stage_produces_file_url_ending_in_name() {
        let staged = stage("withConsoleOutput.html").unwrap();
        assert!(staged.url().starts_with("file:///"));
        assert!(staged.url().ends_with("/withConsoleOutput.html"));
    }

    #[test]
    fn test_staged_file_contains_page_source() {
        let staged = stage("simple.html").unwrap();
        let path = Url::parse(staged.url()).unwrap().to_file_path().unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, SIMPLE);
    }

    #[test]
    fn test_unknown_page_fails_to_stage() {
        let err = stage("nope.html").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "got: {err:?}");
    }

    #[test]
    fn test_file_url_escapes_spaces_but_keeps_separators() {
        let dir = tempfile::tempdir().unwrap();
        let spaced = dir.path().join("with space dir");
        std::fs::create_dir(&spaced).unwrap();
        let path = spaced.join("page.html");
        std::fs::write(&path, "<html></html>").unwrap();

        let url = file_url(&path).unwrap();
        let escaped = urlencoding::encode("with space dir");
        assert!(url.as_str().contains(escaped.as_ref()), "got: {url}");
        assert!(url.as_str().starts_with("file:///"));
        assert!(!url.as_str().contains(' '));
    }
}
