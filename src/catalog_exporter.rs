use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::browser::WebDriverSession;
use crate::config::Config;
use crate::error::ProjectionError;
use crate::export;
use crate::fetcher::{FetchOutcome, HttpProductSource, ProductFetcher};
use crate::models::{ProductRecord, RunMode, RunSummary};
use crate::projector;
use crate::scraper::PageScraper;
use crate::traits::{BrowserSession, ProductSource};
use crate::url_store::{self, UrlStore};

pub struct CatalogExporter {
    config: Config,
    scraper: PageScraper,
    url_store: UrlStore,
}

impl CatalogExporter {
    pub fn new(config: Config) -> Result<Self> {
        let scraper = PageScraper::new(config.scraper.clone())?;
        let url_store = UrlStore::new(config.url_list_file.clone());

        Ok(Self {
            config,
            scraper,
            url_store,
        })
    }

    pub async fn run(&self, mode: RunMode) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        match mode {
            RunMode::SkipScrape => info!("Skipping scraping as requested"),
            RunMode::Full => {
                let listings = self.config.load_listing_paths()?;
                let source = HttpProductSource::new()?;
                let mut browser =
                    WebDriverSession::start(&self.config.webdriver_url, self.config.headless)
                        .await
                        .context("failed to start browser session")?;

                self.collect_artifacts(&mut browser, &source, &listings, &mut summary)
                    .await;
            }
        }

        self.export_records(&mut summary).await?;
        summary.log();
        Ok(summary)
    }

    /// Scrape listings, merge and persist the URL set, then fetch every
    /// missing artifact. Failures are logged and counted.
    pub async fn collect_artifacts<B, S>(
        &self,
        browser: &mut B,
        source: &S,
        listings: &[String],
        summary: &mut RunSummary,
    ) where
        B: BrowserSession + ?Sized,
        S: ProductSource + ?Sized,
    {
        let scrape = self.scraper.scrape_listings(browser, listings).await;
        if let Err(e) = browser.quit().await {
            warn!("Failed to close browser session: {}", e);
        }
        summary.pages_visited = scrape.pages_visited;
        summary.pages_failed = scrape.pages_failed;
        summary.urls_scraped = scrape.urls.len();

        let existing = self.url_store.load().await.unwrap_or_else(|e| {
            error!("{}", e);
            Default::default()
        });
        let all_urls = url_store::merge(scrape.urls, existing);
        summary.urls_known = all_urls.len();

        if let Err(e) = self.url_store.save(&all_urls).await {
            error!("{}", e);
        }

        let mut fetcher = match ProductFetcher::open(source, &self.config.output_dir).await {
            Ok(fetcher) => fetcher,
            Err(e) => {
                error!("Cannot prepare output directory, skipping downloads: {}", e);
                return;
            }
        };

        let mut urls: Vec<String> = all_urls.into_iter().collect();
        urls.sort();

        for url in &urls {
            match fetcher.ensure_artifact(url).await {
                Ok(FetchOutcome::Saved(_)) => summary.artifacts_fetched += 1,
                Ok(FetchOutcome::AlreadyPresent) => {
                    info!("Artifact for {} already exists", url);
                    summary.artifacts_present += 1;
                }
                Err(e) => {
                    error!("Error fetching JSON from {}: {}", url, e);
                    summary.artifacts_failed += 1;
                }
            }
        }
    }

    /// Project every artifact in the output directory and write the CSV.
    pub async fn export_records(&self, summary: &mut RunSummary) -> Result<usize> {
        let output_dir = &self.config.output_dir;
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("failed to create {}", output_dir.display()))?;

        let mut records: Vec<ProductRecord> = Vec::new();
        for path in projector::list_artifacts(output_dir).await? {
            let json = match projector::read_artifact(&path).await {
                Ok(json) => json,
                Err(e) => {
                    error!("{}", e);
                    summary.artifacts_unreadable += 1;
                    continue;
                }
            };

            match projector::project(&json) {
                Ok(record) => records.push(record),
                Err(ProjectionError::MissingKey(key)) => {
                    error!(
                        "Error extracting product data from {}: key not found {}",
                        path.display(),
                        key
                    );
                    summary.records_dropped += 1;
                }
                Err(e) => {
                    error!("Error extracting product data from {}: {}", path.display(), e);
                    summary.records_dropped += 1;
                }
            }
        }

        let written = export::write_csv(&self.config.csv_file, &records)?;
        summary.records_exported = written;
        Ok(written)
    }
}
