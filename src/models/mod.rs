//! Data models shared between pipeline stages

use reqwest::StatusCode;
use serde::Serialize;
use tracing::info;

/// One flattened product row, in CSV column order.
///
/// Scalars are kept as their rendered JSON text so that ids, weights and prices
/// reach the export exactly as the catalog reported them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub product_id: String,
    pub name: String,
    pub weight: String,
    pub description: String,
    pub available: String,
    pub brand_name: Option<String>,
    pub price: String,
    pub currency: String,
    pub item_category: String,
    pub tax: String,
    pub sku: String,
    pub variant: String,
}

/// Raw response of a product detail request
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: StatusCode,
    pub body: String,
}

/// Which stages a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Scrape listings, merge URLs, fetch missing artifacts, then export
    Full,
    /// Export whatever artifacts are already on disk
    SkipScrape,
}

impl RunMode {
    pub const fn from_skip_flag(skip_scraping: bool) -> Self {
        if skip_scraping {
            Self::SkipScrape
        } else {
            Self::Full
        }
    }
}

/// Counters collected over one run; failures are counted, never fatal.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub urls_scraped: usize,
    pub urls_known: usize,
    pub artifacts_fetched: usize,
    pub artifacts_present: usize,
    pub artifacts_failed: usize,
    pub artifacts_unreadable: usize,
    pub records_exported: usize,
    pub records_dropped: usize,
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            "Run finished: {} listing pages visited ({} failed), {} URLs scraped, {} URLs known",
            self.pages_visited, self.pages_failed, self.urls_scraped, self.urls_known
        );
        info!(
            "Artifacts: {} fetched, {} already present, {} failed, {} unreadable",
            self.artifacts_fetched,
            self.artifacts_present,
            self.artifacts_failed,
            self.artifacts_unreadable
        );
        info!(
            "Records: {} exported, {} dropped",
            self.records_exported, self.records_dropped
        );
    }
}
