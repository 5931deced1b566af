//! Traits and configuration at the I/O seams of the pipeline

use async_trait::async_trait;

use crate::error::{BrowserError, FetchError};
use crate::models::FetchedPage;

/// Configuration for the catalog being crawled
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Base URL every listing path and product path is appended to
    pub base_url: String,
    /// Suffix turning a product detail path into its JSON endpoint
    pub url_suffix: String,
    /// CSS selectors for extracting product links
    pub selectors: SiteSelectors,
}

/// CSS selectors for the product tiles of a listing page
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Container selector for individual product tiles
    pub product_container: String,
    /// Title anchor selector within the product container
    pub title_link: String,
    /// Attribute of the title anchor carrying the relative product path
    pub link_attr: String,
}

impl ScraperConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            url_suffix: "?format=json".to_string(),
            selectors: SiteSelectors {
                product_container: "div.product-inner.border-allways".to_string(),
                title_link: "a.title.title-font".to_string(),
                link_attr: "href".to_string(),
            },
        }
    }

    /// Absolute URL of a listing page
    pub fn listing_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute JSON endpoint of a product, from the path found on a listing page
    pub fn product_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, path, self.url_suffix)
    }
}

/// A browser session that renders pages before they are parsed
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate the session to `url` and wait for the page load
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Markup of the current page after scripts have run
    async fn page_source(&mut self) -> Result<String, BrowserError>;

    /// End the session; the browser cannot be used afterwards
    async fn quit(&mut self) -> Result<(), BrowserError>;
}

/// Source of product detail payloads
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Issue one GET for `url`
    ///
    /// # Returns
    /// * `Result<FetchedPage, FetchError>` - status and body, whatever the status is
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
