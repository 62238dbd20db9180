// Collect script errors from a URL given on the command line
//
// Shows: driver config resolution, navigation, the rendered error report

use js_error_collector::{Browser, render_report};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    let browser = Browser::launch().await?;
    println!("Driving {}", browser.version().await?);

    let page = browser.new_page().await?;
    println!("Navigating to {url} ...");
    page.goto(&url, None).await?;

    let errors = page.read_errors();
    if errors.is_empty() {
        println!("No JavaScript errors captured");
    } else {
        println!("Captured {} error(s):", errors.len());
        for error in &errors {
            println!("  {error}");
            if let Some(console) = &error.console {
                println!("    console output before the error:");
                for line in console.lines() {
                    println!("      {line}");
                }
            }
        }
        println!("Report: {}", render_report(&errors));
    }

    browser.close().await?;
    Ok(())
}
