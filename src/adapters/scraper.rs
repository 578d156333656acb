//! HTTP job scraper adapter.
//!
//! Fetches posting pages over HTTP and reduces them to plain text. Site-
//! specific extraction is out of scope here; any fetch failure surfaces as a
//! `ScrapeFailure` so callers can fall back to manually pasted text.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::domain::foundation::CoreError;
use crate::ports::JobScraper;

/// Scraper that fetches a URL and strips markup down to text.
pub struct HttpJobScraper {
    client: Client,
}

impl HttpJobScraper {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("careerlens/0.1")
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

impl Default for HttpJobScraper {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl JobScraper for HttpJobScraper {
    async fn fetch_raw_text(&self, url: &str) -> Result<String, CoreError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::scrape_failure(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::scrape_failure(
                url,
                format!("HTTP status {}", status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CoreError::scrape_failure(url, e.to_string()))?;

        let text = strip_markup(&body);
        if text.is_empty() {
            return Err(CoreError::scrape_failure(url, "page contained no text"));
        }

        debug!(%url, chars = text.len(), "scraped posting text");
        Ok(text)
    }
}

/// Removes tags, scripts and styles, collapsing whitespace.
fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len() / 4);
    let mut in_tag = false;
    let mut skip_until: Option<&str> = None;

    for (i, c) in html.char_indices() {
        if let Some(close) = skip_until {
            if starts_with_ci(&html[i..], close) {
                skip_until = None;
                in_tag = true; // consume the rest of the closing tag
            }
            continue;
        }
        match c {
            '<' => {
                if starts_with_ci(&html[i..], "<script") {
                    skip_until = Some("</script");
                } else if starts_with_ci(&html[i..], "<style") {
                    skip_until = Some("</style");
                } else {
                    in_tag = true;
                }
            }
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn starts_with_ci(haystack: &str, prefix: &str) -> bool {
    haystack
        .as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}
