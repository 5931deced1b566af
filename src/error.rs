//! Typed failures of each pipeline stage

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("webdriver request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webdriver HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("webdriver error {error}: {message}")]
    WebDriver { error: String, message: String },
    #[error("unexpected webdriver response: {0}")]
    Protocol(String),
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
    #[error("product tile {index} has no title link")]
    MalformedTile { index: usize },
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

#[derive(Debug, Error)]
pub enum UrlStoreError {
    #[error("failed to read URL list {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write URL list {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("invalid JSON payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("payload has no product.id")]
    MissingProductId,
    #[error("artifact I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("key not found: {0}")]
    MissingKey(String),
    #[error("malformed product data: {0}")]
    Malformed(String),
    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode artifact {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}
