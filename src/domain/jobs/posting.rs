//! Job posting entity and its structured analysis.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::foundation::{JobPostingId, Timestamp};

/// Content-addressed cache key for job analysis.
///
/// A changed posting text produces a new key, so cached analyses can never
/// go stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hashes raw posting text (SHA-256, hex-encoded).
    pub fn of_text(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        Self(format!("{:x}", digest))
    }

    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the structured requirements were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisConfidence {
    /// Model-extracted and schema-validated.
    High,
    /// Deterministic keyword fallback after a validation failure.
    Low,
}

/// Normalized extraction from one job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRequirements {
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub tools_technologies: Vec<String>,
    pub responsibilities: Vec<String>,
    /// Concerning language: unrealistic scope, compensation red flags.
    pub red_flags: Vec<String>,
    pub confidence: AnalysisConfidence,
    pub analyzed_at: Timestamp,
}

impl StructuredRequirements {
    /// All skill and tool names a candidate could match against.
    pub fn all_skill_names(&self) -> impl Iterator<Item = &str> {
        self.required_skills
            .iter()
            .chain(&self.preferred_skills)
            .chain(&self.tools_technologies)
            .map(String::as_str)
    }
}

/// Raw posting content, or the marker left behind by a failed scrape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RawContent {
    /// Scraped text, ready for analysis.
    Text { text: String },
    /// The scrape failed; the user may paste text manually.
    Unavailable { reason: String },
}

/// A scraped job posting.
#[derive(Debug, Clone)]
pub struct JobPosting {
    id: JobPostingId,
    source_url: String,
    content: RawContent,
    requirements: Option<StructuredRequirements>,
}

impl JobPosting {
    /// Creates a posting from successfully scraped text.
    pub fn scraped(source_url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: JobPostingId::new(),
            source_url: source_url.into(),
            content: RawContent::Text { text: text.into() },
            requirements: None,
        }
    }

    /// Creates a posting that records a scrape failure.
    pub fn scrape_failed(source_url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: JobPostingId::new(),
            source_url: source_url.into(),
            content: RawContent::Unavailable {
                reason: reason.into(),
            },
            requirements: None,
        }
    }

    /// Reconstitutes a posting from persistence.
    pub fn reconstitute(
        id: JobPostingId,
        source_url: String,
        content: RawContent,
        requirements: Option<StructuredRequirements>,
    ) -> Self {
        Self {
            id,
            source_url,
            content,
            requirements,
        }
    }

    pub fn id(&self) -> JobPostingId {
        self.id
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn content(&self) -> &RawContent {
        &self.content
    }

    /// Raw text, when the scrape succeeded.
    pub fn raw_text(&self) -> Option<&str> {
        match &self.content {
            RawContent::Text { text } => Some(text),
            RawContent::Unavailable { .. } => None,
        }
    }

    /// Cache key for analysis; absent without raw text.
    pub fn content_hash(&self) -> Option<ContentHash> {
        self.raw_text().map(ContentHash::of_text)
    }

    pub fn requirements(&self) -> Option<&StructuredRequirements> {
        self.requirements.as_ref()
    }

    /// Attaches an analysis result.
    pub fn attach_requirements(&mut self, requirements: StructuredRequirements) {
        self.requirements = Some(requirements);
    }
}
