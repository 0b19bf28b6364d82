use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use ui_harness::diagnostics::TestContext;
use ui_harness::{BrowserSession, Configuration};

/// ui-harness: open a page in Chrome and wait for an element the way a
/// feature test would
#[derive(Parser)]
#[command(name = "ui-harness", version, about)]
struct Cli {
    /// Page to open
    url: String,

    /// Selector to resolve (CSS, XPath, value, visible text or label text)
    selector: String,

    /// Run Chrome with a visible window (default: headless)
    #[arg(long)]
    headed: bool,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override every timeout, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Suite name used for failure diagnostics
    #[arg(long, requires = "case")]
    suite: Option<String>,

    /// Case name used for failure diagnostics
    #[arg(long, requires = "suite")]
    case: Option<String>,

    /// What to wait for before reporting
    #[arg(long, value_enum, default_value_t = WaitFor::Present)]
    wait: WaitFor,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WaitFor {
    Present,
    Displayed,
    Enabled,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the matches, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let config = configuration(&cli)?;

    let browser = BrowserSession::launch(&config).await?;
    let outcome = tokio::select! {
        result = run(&browser, &cli) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received interrupt signal, shutting down");
            Ok(())
        }
    };

    // Chrome goes down whatever happened
    browser.close().await?;
    outcome
}

fn configuration(cli: &Cli) -> anyhow::Result<Configuration> {
    let mut config = Configuration::load_with_env(cli.config.as_deref())?;
    if cli.headed {
        config.run_chrome_headless = false;
    }
    if let Some(secs) = cli.timeout {
        config.page_timeout = secs;
        config.element_timeout = secs;
        config.compare_timeout = secs;
    }
    Ok(config)
}

async fn run(browser: &BrowserSession, cli: &Cli) -> anyhow::Result<()> {
    let mut harness = browser.harness().await?;
    if let (Some(suite), Some(case)) = (&cli.suite, &cli.case) {
        harness = harness.with_context(TestContext::new(suite.as_str(), case.as_str()));
    }

    harness.goto(&cli.url).await?;
    match cli.wait {
        WaitFor::Present => {}
        WaitFor::Displayed => harness.assert_displayed(&cli.selector).await?,
        WaitFor::Enabled => harness.assert_enabled(&cli.selector).await?,
    }

    let elements = harness.elements(&cli.selector).await?;
    tracing::info!("{} element(s) match {}", elements.len(), cli.selector);
    for element in &elements {
        let text = harness.text_of(element).await?;
        println!("{}\t{}", element, text.trim());
    }
    Ok(())
}
