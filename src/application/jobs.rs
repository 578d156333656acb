//! Job matching service - scraping, analysis and experience scoring.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::MatchingConfig;
use crate::domain::foundation::{CoreError, JobPostingId, OwnerId, Timestamp};
use crate::domain::gateway::AiGateway;
use crate::domain::jobs::{AnalysisConfidence, JobAnalyzer, JobPosting, StructuredRequirements};
use crate::domain::matching::{MatchRecord, MatchScorer, SkillGap};
use crate::ports::{ExperienceReader, JobScraper, JobStore};

/// Everything a caller needs to present one job match.
#[derive(Debug, Clone)]
pub struct JobMatchReport {
    pub job_posting_id: JobPostingId,
    /// Ranked best-first.
    pub matches: Vec<MatchRecord>,
    /// Posting skills no experience covers.
    pub gaps: Vec<SkillGap>,
    /// Confidence of the underlying analysis.
    pub confidence: AnalysisConfidence,
}

/// Application service for the posting-to-match pipeline.
///
/// Ingests posting URLs, extracts structured requirements through the
/// analyzer's content-addressed cache, and scores the owner's experiences
/// against them.
pub struct JobMatchingService {
    store: Arc<dyn JobStore>,
    experiences: Arc<dyn ExperienceReader>,
    scraper: Arc<dyn JobScraper>,
    analyzer: JobAnalyzer,
    scorer: MatchScorer,
}

impl JobMatchingService {
    pub fn new(
        store: Arc<dyn JobStore>,
        experiences: Arc<dyn ExperienceReader>,
        scraper: Arc<dyn JobScraper>,
        gateway: Arc<AiGateway>,
        config: &MatchingConfig,
    ) -> Self {
        Self {
            store,
            experiences,
            scraper,
            analyzer: JobAnalyzer::new(gateway),
            scorer: MatchScorer::new(config.to_params()),
        }
    }

    /// Scrapes a posting URL and persists the result.
    ///
    /// A failed scrape is recorded rather than surfaced: the posting is
    /// saved with its failure reason so the owner can paste the text
    /// manually later.
    #[instrument(skip(self))]
    pub async fn ingest_url(&self, url: &str) -> Result<JobPosting, CoreError> {
        let posting = match self.scraper.fetch_raw_text(url).await {
            Ok(text) => JobPosting::scraped(url, text),
            Err(CoreError::ScrapeFailure { reason, .. }) => {
                warn!(%url, %reason, "scrape failed, recording for manual input");
                JobPosting::scrape_failed(url, reason)
            }
            Err(err) => return Err(err),
        };

        self.store.save_job_posting(&posting).await?;
        Ok(posting)
    }

    /// Replaces a posting's content with manually pasted text.
    pub async fn provide_text(
        &self,
        id: JobPostingId,
        text: &str,
    ) -> Result<JobPosting, CoreError> {
        if text.trim().is_empty() {
            return Err(CoreError::validation("posting text cannot be empty"));
        }
        let posting = self.store.load_job_posting(id).await?;
        let posting = JobPosting::reconstitute(
            posting.id(),
            posting.source_url().to_string(),
            crate::domain::jobs::RawContent::Text {
                text: text.to_string(),
            },
            None, // stale analysis does not survive a content change
        );
        self.store.save_job_posting(&posting).await?;
        Ok(posting)
    }

    /// Extracts structured requirements for a posting and persists them.
    ///
    /// Identical posting text is analyzed at most once; repeated and
    /// concurrent calls share the cached result.
    #[instrument(skip(self))]
    pub async fn analyze_job(&self, id: JobPostingId) -> Result<StructuredRequirements, CoreError> {
        let posting = self.store.load_job_posting(id).await?;
        let text = posting.raw_text().ok_or_else(|| {
            CoreError::invalid_state("analyze_job", "posting text unavailable")
        })?;

        let requirements = self.analyzer.analyze(text).await?;
        self.store.save_job_analysis(id, &requirements).await?;

        info!(posting = %id, confidence = ?requirements.confidence, "job analyzed");
        Ok(requirements)
    }

    /// Scores the owner's experiences against a posting.
    ///
    /// Analyzes the posting first when no stored requirements exist. The
    /// resulting ranking is deterministic for identical inputs.
    #[instrument(skip(self))]
    pub async fn match_job(
        &self,
        id: JobPostingId,
        owner: &OwnerId,
    ) -> Result<JobMatchReport, CoreError> {
        let posting = self.store.load_job_posting(id).await?;
        let requirements = match posting.requirements() {
            Some(requirements) => requirements.clone(),
            None => self.analyze_job(id).await?,
        };

        let experiences = self.experiences.load_experiences(owner).await?;
        let matches = self
            .scorer
            .rank(id, &requirements, &experiences, Timestamp::now());
        let gaps = self.scorer.gap_report(&requirements, &experiences);

        Ok(JobMatchReport {
            job_posting_id: id,
            matches,
            gaps,
            confidence: requirements.confidence,
        })
    }
}
