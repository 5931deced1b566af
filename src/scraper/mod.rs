use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{error, info};

use crate::error::ScrapeError;
use crate::traits::{BrowserSession, ScraperConfig};

/// Product URLs collected from a batch of listing pages
#[derive(Debug, Default)]
pub struct ListingScrape {
    pub urls: HashSet<String>,
    pub pages_visited: usize,
    pub pages_failed: usize,
}

pub struct PageScraper {
    config: ScraperConfig,
    product_selector: Selector,
    title_selector: Selector,
}

impl PageScraper {
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let product_selector = parse_selector(&config.selectors.product_container)?;
        let title_selector = parse_selector(&config.selectors.title_link)?;

        Ok(Self {
            config,
            product_selector,
            title_selector,
        })
    }

    /// Adds every product URL on the page to `seen_urls`.
    ///
    /// A tile without a title link fails the whole page and leaves `seen_urls`
    /// untouched. Returns the number of tiles found.
    pub fn extract_product_urls(
        &self,
        html: &str,
        seen_urls: &mut HashSet<String>,
    ) -> Result<usize, ScrapeError> {
        let document = Html::parse_document(html);
        let mut page_urls = Vec::new();

        for (index, product) in document.select(&self.product_selector).enumerate() {
            let href = product
                .select(&self.title_selector)
                .next()
                .and_then(|link| link.value().attr(&self.config.selectors.link_attr))
                .ok_or(ScrapeError::MalformedTile { index })?;

            page_urls.push(self.config.product_url(href));
        }

        let tiles = page_urls.len();
        info!("Found {} products on the page", tiles);
        seen_urls.extend(page_urls);
        Ok(tiles)
    }

    /// Renders one listing page and adds its product URLs to `seen_urls`.
    pub async fn visit_listing<B: BrowserSession + ?Sized>(
        &self,
        browser: &mut B,
        path: &str,
        seen_urls: &mut HashSet<String>,
    ) -> Result<usize, ScrapeError> {
        let url = self.config.listing_url(path);
        info!("Processing listing page: {}", url);

        browser.navigate(&url).await?;
        let html = browser.page_source().await?;
        self.extract_product_urls(&html, seen_urls)
    }

    /// Visits every listing path in order. A failed page is logged and counted,
    /// then the next one is visited.
    pub async fn scrape_listings<B: BrowserSession + ?Sized>(
        &self,
        browser: &mut B,
        paths: &[String],
    ) -> ListingScrape {
        let mut scrape = ListingScrape::default();

        for path in paths {
            scrape.pages_visited += 1;
            if let Err(e) = self.visit_listing(browser, path, &mut scrape.urls).await {
                error!("Error processing {}: {}", path, e);
                scrape.pages_failed += 1;
            }
        }

        info!(
            "Collected {} product URLs from {} listing pages",
            scrape.urls.len(),
            scrape.pages_visited
        );
        scrape
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}
