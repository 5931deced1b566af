use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::UrlStoreError;

/// Line-delimited list of every product URL seen so far
pub struct UrlStore {
    path: PathBuf,
}

impl UrlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the persisted URLs. A missing file is an empty set.
    pub async fn load(&self) -> Result<HashSet<String>, UrlStoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("URL list {} does not exist", self.path.display());
                return Ok(HashSet::new());
            }
            Err(source) => {
                return Err(UrlStoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        info!("Reading URLs from {}", self.path.display());
        Ok(contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    /// Rewrites the whole file, one URL per line.
    pub async fn save(&self, urls: &HashSet<String>) -> Result<(), UrlStoreError> {
        let mut sorted: Vec<&String> = urls.iter().collect();
        sorted.sort();

        let contents: String = sorted.into_iter().map(|url| format!("{url}\n")).collect();

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|source| UrlStoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        info!("Saved {} URLs to {}", urls.len(), self.path.display());
        Ok(())
    }
}

/// Union of freshly scraped and previously persisted URLs, by exact string equality
pub fn merge(scraped: HashSet<String>, existing: HashSet<String>) -> HashSet<String> {
    let mut merged = existing;
    merged.extend(scraped);
    merged
}
