use anyhow::Result;
use clap::Parser;
use tracing::info;

mod browser;
mod catalog_exporter;
mod config;
mod error;
mod export;
mod fetcher;
mod logging;
mod models;
mod projector;
mod scraper;
#[cfg(test)]
mod testing;
mod traits;
mod url_store;

use catalog_exporter::CatalogExporter;
use config::Config;
use models::RunMode;

#[derive(Parser)]
#[command(name = "catalog-exporter", about = "Scrape products and save data.")]
struct Cli {
    /// Skip the scraping process and use existing data.
    #[arg(long)]
    skip_scraping: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();
    let _log_guard = logging::init(&config.log_file)?;

    let mode = RunMode::from_skip_flag(cli.skip_scraping);
    info!("Starting catalog exporter in {:?} mode", mode);

    let exporter = CatalogExporter::new(config)?;
    exporter.run(mode).await?;

    Ok(())
}
