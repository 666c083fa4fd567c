//! Suite runner entry point
//!
//! This file is the test binary that drives the Skillfolio suite through
//! a real browser. Run with: cargo test --package skillfolio-e2e --test e2e
//!
//! Exit codes: 0 when every selected scenario passed, 1 when any failed,
//! 2 on a runner error. When the application or the WebDriver endpoint
//! does not answer, the suite is skipped with exit 0 unless --strict.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use skillfolio_e2e::suite::skillfolio_features;
use skillfolio_e2e::{Filter, HarnessResult, Runner};
use skillfolio_harness::config::TestSettings;
use skillfolio_harness::probe;
use skillfolio_harness::report::ReportSink;

#[derive(Parser, Debug)]
#[command(name = "skillfolio-e2e")]
#[command(about = "UI E2E suite runner for Skillfolio")]
struct Args {
    /// Path to the settings file
    #[arg(short, long, default_value = "settings.json")]
    settings: PathBuf,

    /// Override the application base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override the WebDriver endpoint
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Override headless mode (true or false)
    #[arg(long)]
    headless: Option<bool>,

    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only scenarios whose title contains this text
    #[arg(short, long)]
    name: Option<String>,

    /// Override the HTML report path
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Treat an unreachable environment as a failure instead of a skip
    #[arg(long)]
    strict: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(success) => {
            if success {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> HarnessResult<bool> {
    let mut settings = if args.settings.exists() {
        TestSettings::load(&args.settings)?
    } else {
        info!(
            "No settings file at {}, using defaults",
            args.settings.display()
        );
        TestSettings::default()
    };

    if let Some(base_url) = args.base_url {
        settings.environment.base_url = base_url;
    }
    if let Some(webdriver_url) = args.webdriver_url {
        settings.browser.webdriver_url = webdriver_url;
    }
    if let Some(headless) = args.headless {
        settings.browser.headless = headless;
    }
    if let Some(report) = args.report {
        settings.report.path = report;
    }

    // Run-or-skip decision: both endpoints must answer before any
    // session is provisioned.
    let endpoints = [
        ("application", settings.environment.url("")),
        (
            "WebDriver",
            format!(
                "{}/status",
                settings.browser.webdriver_url.trim_end_matches('/')
            ),
        ),
    ];
    for (what, url) in &endpoints {
        if args.strict {
            probe::wait_until_reachable(url, settings.wait_deadline()).await?;
            continue;
        }
        if !probe::is_reachable(url).await {
            println!("Skipping the suite: {} endpoint {} did not answer", what, url);
            return Ok(true);
        }
    }

    let report = ReportSink::new("Skillfolio UI E2E", &settings.report);
    report.add_system_info("Base URL", &settings.environment.base_url);
    report.add_system_info("Browser", &settings.browser.kind);
    report.add_system_info("Headless", &settings.browser.headless.to_string());
    report.add_system_info("WebDriver", &settings.browser.webdriver_url);

    let filter = Filter {
        tag: args.tag,
        name: args.name,
    };

    let runner = Runner::new(Arc::new(settings), report.clone());
    let summary = runner.run(&skillfolio_features(), &filter).await;

    runner.write_summary(&summary)?;
    let html = report.flush()?;
    info!("Report written to: {}", html.display());

    Ok(summary.failed == 0)
}
