//! Command-line entry point.

mod progress;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use console::style;
use tokio::sync::mpsc;

use dealcrawl::{render_report, CatalogCrawler, CrawlConfig, HttpLoader};
use progress::CrawlProgress;

#[derive(Parser)]
#[command(name = "dealcrawl")]
#[command(about = "Crawl a product catalog and report the best discounts")]
#[command(version)]
pub struct Cli {
    /// Crawl configuration file (JSON)
    config: PathBuf,

    /// Write the report here instead of the configured output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum product pages fetched at once (default: unbounded)
    #[arg(short, long, env = "DEALCRAWL_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Hide the progress spinner
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CrawlConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(limit) = cli.concurrency {
        anyhow::ensure!(limit > 0, "--concurrency must be at least 1");
        config.max_concurrent_fetches = Some(limit);
    }
    let config = Arc::new(config);

    let loader = HttpLoader::from_config(&config).context("creating HTTP client")?;

    let (event_tx, event_rx) = mpsc::channel(256);
    let progress = CrawlProgress::spawn(event_rx, cli.quiet);

    let crawler = CatalogCrawler::new(config.clone(), Arc::new(loader)).with_events(event_tx);
    let result = crawler.run().await;
    // Dropping the crawler closes the event channel.
    drop(crawler);
    progress.finish().await;

    let output = result.context("crawl aborted")?;
    let path = render_report(&output.products, &config.output)?;

    let summary = output.summary;
    println!(
        "{} {} products from {} pages ({} rows scanned, {} product pages fetched)",
        style("✓").green(),
        summary.products_collected,
        summary.pages_visited,
        summary.rows_scanned,
        summary.products_dispatched
    );
    println!("{}", path.display());

    Ok(())
}
