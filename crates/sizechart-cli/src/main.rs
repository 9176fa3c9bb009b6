use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sizechart_core::ExtractionConfig;

mod input;
mod output;

#[derive(Debug, Parser)]
#[command(name = "sizechart-cli")]
#[command(about = "Extract size charts from Shopify storefronts")]
struct Cli {
    /// Store domains or URLs to extract (e.g. westside.com).
    stores: Vec<String>,

    /// File with one store per line. Blank lines and `#` comments are
    /// ignored.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Output JSON file.
    #[arg(short = 'o', long = "output", default_value = "output.json")]
    output: PathBuf,

    /// Maximum products extracted per store.
    #[arg(long = "max-products", default_value_t = 100)]
    max_products: usize,

    /// Minimum seconds between consecutive requests to the same store.
    #[arg(long = "rate-limit", default_value_t = 1.0)]
    rate_limit: f64,

    /// Per-request timeout in seconds.
    #[arg(long = "timeout", default_value_t = 30)]
    timeout: u64,

    /// Maximum stores processed concurrently.
    #[arg(long = "concurrent", default_value_t = 5)]
    concurrent: usize,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let stores = input::collect_stores(&cli.stores, cli.file.as_deref())?;
    if stores.is_empty() {
        eprintln!("no stores given; pass domains as arguments or use --file");
        std::process::exit(1);
    }

    let config = ExtractionConfig {
        max_products_per_store: cli.max_products,
        rate_limit_delay_secs: cli.rate_limit,
        timeout_secs: cli.timeout,
        concurrent_stores: cli.concurrent,
        gemini_api_key: std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty()),
        ..ExtractionConfig::default()
    };
    tracing::info!(stores = stores.len(), "starting extraction");
    tracing::debug!(?config, "effective configuration");

    let results = tokio::select! {
        results = sizechart_scraper::extract_stores(&config, &stores) => results,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, exiting without writing output");
            return Ok(());
        }
    };

    output::write_results(&cli.output, &results)?;
    output::print_summary(&results);

    Ok(())
}
