//! In-memory stand-ins for the browser and the product endpoint

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{BrowserError, FetchError};
use crate::models::FetchedPage;
use crate::traits::{BrowserSession, ProductSource};

/// Serves canned markup per URL; unknown URLs fail to navigate.
#[derive(Default)]
pub struct StubBrowser {
    pages: HashMap<String, String>,
    current: Option<String>,
    pub visited: Vec<String>,
    pub quit_called: bool,
}

impl StubBrowser {
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }
}

#[async_trait]
impl BrowserSession for StubBrowser {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.visited.push(url.to_string());
        if self.pages.contains_key(url) {
            self.current = Some(url.to_string());
            Ok(())
        } else {
            self.current = None;
            Err(BrowserError::Status {
                status: 500,
                body: format!("cannot reach {url}"),
            })
        }
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .ok_or_else(|| BrowserError::Protocol("no page loaded".to_string()))
    }

    async fn quit(&mut self) -> Result<(), BrowserError> {
        self.quit_called = true;
        Ok(())
    }
}

/// Records every requested URL; unknown URLs answer 404.
#[derive(Default)]
pub struct SpySource {
    responses: HashMap<String, (StatusCode, String)>,
    pub requests: Mutex<Vec<String>>,
}

impl SpySource {
    pub fn with_response(mut self, url: impl Into<String>, status: StatusCode, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), (status, body.into()));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductSource for SpySource {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let (status, body) = self
            .responses
            .get(url)
            .cloned()
            .unwrap_or((StatusCode::NOT_FOUND, String::new()));
        Ok(FetchedPage { status, body })
    }
}

/// Collects formatted log lines emitted on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Routes events to this buffer until the guard is dropped.
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_target(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A complete product payload as served by the catalog's `?format=json` endpoint
pub fn product_json(id: u64, title: &str, sku: &str) -> serde_json::Value {
    serde_json::json!({
        "product": {
            "id": id,
            "title": title,
            "weight": 25,
            "description": "Nicotine pouches",
            "stock": { "available": true },
            "brand": { "title": "Zyn" },
            "price": { "price": 4.95 },
            "tax": 21,
            "sku": sku,
            "variant": "Strong"
        },
        "gtag": {
            "events": {
                "view_item": {
                    "currency": "EUR",
                    "items": [{ "item_category": "Pouches" }]
                }
            }
        }
    })
}
