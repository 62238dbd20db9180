// Stage an embedded fixture page and capture its error over file://
//
// Shows: the fixture loader, file URL staging, and the loose record
// comparison the harness uses

use js_error_collector::{Browser, JavaScriptError, fixtures, render_report};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let fixture = fixtures::stage("withConsoleOutput.html")?;
    println!("Staged fixture at {}", fixture.url());

    let expected = vec![JavaScriptError::with_console(
        "TypeError: null has no properties",
        fixture.url(),
        8,
        "before JS error",
    )];

    let browser = Browser::launch().await?;
    let page = browser.new_page().await?;
    page.goto(fixture.url(), None).await?;

    let errors = page.read_errors();
    assert_eq!(render_report(&expected), render_report(&errors));
    println!("Captured as expected: {}", render_report(&errors));

    browser.close().await?;
    Ok(())
}
