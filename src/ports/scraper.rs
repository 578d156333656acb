//! Scraper Port - raw job text acquisition.
//!
//! Platform-specific HTML parsing happens behind this port; the core only
//! consumes raw text or a failure it can surface for manual input.

use async_trait::async_trait;

use crate::domain::foundation::CoreError;

/// Port for fetching the raw text of a job posting.
#[async_trait]
pub trait JobScraper: Send + Sync {
    /// Fetches raw posting text from a URL.
    ///
    /// # Errors
    /// Returns `CoreError::ScrapeFailure` when the text cannot be obtained.
    async fn fetch_raw_text(&self, url: &str) -> Result<String, CoreError>;
}
