//! # WebDriver Browser Session
//!
//! Listing pages build their product grid with JavaScript, so they are rendered in
//! a real browser driven over the W3C WebDriver protocol (chromedriver,
//! geckodriver or a Selenium server) before being parsed.
//!
//! Only four commands are needed:
//! - `POST /session` to start the browser
//! - `POST /session/{id}/url` to navigate
//! - `GET /session/{id}/source` to read the rendered markup
//! - `DELETE /session/{id}` to shut it down

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use tracing::info;

use crate::error::BrowserError;
use crate::traits::BrowserSession;

/// A live WebDriver session.
pub struct WebDriverSession {
    client: Client,
    endpoint: String,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    /// Starts a Chrome session on the WebDriver server at `endpoint`.
    pub async fn start(endpoint: &str, headless: bool) -> Result<Self, BrowserError> {
        let client = Client::new();
        let endpoint = endpoint.trim_end_matches('/').to_string();

        let response = client
            .post(format!("{endpoint}/session"))
            .json(&capabilities(headless))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let value = parse_reply(status.as_u16(), &body)?;

        let session_id = value
            .pointer("/value/sessionId")
            .or_else(|| value.pointer("/sessionId"))
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::Protocol(format!("session id missing: {}", truncate(&body))))?
            .to_string();

        info!("Started browser session {}", session_id);

        Ok(Self {
            client,
            endpoint,
            session_id,
            closed: false,
        })
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, BrowserError> {
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_reply(status.as_u16(), &text)
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .map(|_| ())
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        let value = self.command(Method::GET, "/source", None).await?;
        value
            .get("value")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| BrowserError::Protocol("page source is not a string".to_string()))
    }

    async fn quit(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.command(Method::DELETE, "", None).await?;
        info!("Closed browser session {}", self.session_id);
        Ok(())
    }
}

/// New-session payload for Chrome
fn capabilities(headless: bool) -> Value {
    let mut args = vec!["--start-maximized".to_string()];
    if headless {
        args.push("--headless=new".to_string());
    }

    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args }
            }
        }
    })
}

/// Turns a WebDriver reply into its JSON body, or the error it reports.
fn parse_reply(status: u16, body: &str) -> Result<Value, BrowserError> {
    let value: Value = serde_json::from_str(body).unwrap_or_default();

    if let Some(error) = value.pointer("/value/error").and_then(Value::as_str) {
        let message = value
            .pointer("/value/message")
            .and_then(Value::as_str)
            .unwrap_or("unknown webdriver error");
        return Err(BrowserError::WebDriver {
            error: error.to_string(),
            message: message.to_string(),
        });
    }

    if !(200..300).contains(&status) {
        return Err(BrowserError::Status {
            status,
            body: truncate(body),
        });
    }

    Ok(value)
}

fn truncate(body: &str) -> String {
    const MAX_CHARS: usize = 240;

    if body.chars().count() <= MAX_CHARS {
        body.to_string()
    } else {
        body.chars().take(MAX_CHARS).collect::<String>() + "..."
    }
}
