use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::error::FetchError;
use crate::models::FetchedPage;
use crate::projector::render;
use crate::traits::ProductSource;

/// Fetches product payloads over plain HTTP
pub struct HttpProductSource {
    client: Client,
}

impl HttpProductSource {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36")
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(FetchedPage { status, body })
    }
}

/// What `ensure_artifact` did for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Saved(PathBuf),
    AlreadyPresent,
}

/// Last path segment of a URL, without query string or extension.
pub fn slug_for(url: &str) -> &str {
    let segment = url.rsplit('/').next().unwrap_or(url);
    let segment = segment.split('?').next().unwrap_or(segment);
    segment.split('.').next().unwrap_or(segment)
}

/// Names of the files already present in the output directory
#[derive(Debug, Default)]
pub struct ArtifactIndex {
    names: Vec<String>,
}

impl ArtifactIndex {
    pub async fn scan(dir: &Path) -> Result<Self, FetchError> {
        let io_error = |source| FetchError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(Self { names })
    }

    /// True if any artifact name contains `slug`. Substring matching means a
    /// slug that is part of another product's slug also counts as present.
    pub fn contains_slug(&self, slug: &str) -> bool {
        self.names.iter().any(|name| name.contains(slug))
    }

    pub fn record(&mut self, name: String) {
        self.names.push(name);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Downloads product payloads that are not on disk yet
pub struct ProductFetcher<'a, S: ?Sized> {
    source: &'a S,
    output_dir: PathBuf,
    index: ArtifactIndex,
}

impl<'a, S: ProductSource + ?Sized> ProductFetcher<'a, S> {
    /// Creates the output directory if needed and indexes what it already holds.
    pub async fn open(source: &'a S, output_dir: impl Into<PathBuf>) -> Result<Self, FetchError> {
        let output_dir = output_dir.into();
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| FetchError::Io {
                path: output_dir.clone(),
                source,
            })?;

        let index = ArtifactIndex::scan(&output_dir).await?;
        info!(
            "Output directory {} holds {} artifacts",
            output_dir.display(),
            index.len()
        );

        Ok(Self {
            source,
            output_dir,
            index,
        })
    }

    /// Makes sure an artifact for `url` exists, downloading it if no file matches its slug.
    pub async fn ensure_artifact(&mut self, url: &str) -> Result<FetchOutcome, FetchError> {
        let slug = slug_for(url);
        if self.index.contains_slug(slug) {
            return Ok(FetchOutcome::AlreadyPresent);
        }

        let page = self.source.fetch(url).await?;
        if page.status != StatusCode::OK {
            return Err(FetchError::Status(page.status));
        }

        let payload: Value = serde_json::from_str(&page.body)?;
        let product_id = payload
            .pointer("/product/id")
            .map(render)
            .ok_or(FetchError::MissingProductId)?;

        let file_name = format!("{product_id}_{slug}.json");
        let path = self.output_dir.join(&file_name);

        tokio::fs::write(&path, pretty_json(&payload)?)
            .await
            .map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;

        self.index.record(file_name);
        info!("Saved: {}", path.display());
        Ok(FetchOutcome::Saved(path))
    }
}

/// JSON with 4-space indentation
fn pretty_json(value: &Value) -> Result<Vec<u8>, FetchError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(buf)
}
