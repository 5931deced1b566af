//! Runtime configuration, loaded from the environment (and an optional `.env`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::traits::ScraperConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub output_dir: PathBuf,
    pub url_list_file: PathBuf,
    pub csv_file: PathBuf,
    pub listings_file: PathBuf,
    pub log_file: PathBuf,
    pub webdriver_url: String,
    pub headless: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            scraper: ScraperConfig::new(var("CATALOG_BASE_URL", "https://www.snusfarmer.com/es")),
            output_dir: var("CATALOG_OUTPUT_DIR", "jsons").into(),
            url_list_file: var("CATALOG_URL_LIST_FILE", "jsons.txt").into(),
            csv_file: var("CATALOG_CSV_FILE", "./data/products.csv").into(),
            listings_file: var("CATALOG_LISTINGS_FILE", "listings.txt").into(),
            log_file: var("CATALOG_LOG_FILE", "scraper.log").into(),
            webdriver_url: var("WEBDRIVER_URL", "http://localhost:9515"),
            headless: parse_flag(&var("CATALOG_HEADLESS", "false")),
        }
    }

    /// Relative listing-page paths to crawl, one per line
    pub fn load_listing_paths(&self) -> Result<Vec<String>> {
        read_listing_paths(&self.listings_file)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn read_listing_paths(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read listing pages from {}", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect())
}
