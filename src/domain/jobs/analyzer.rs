//! Job analysis - structured requirement extraction with content-addressed
//! caching and single-flight deduplication.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::domain::foundation::{CoreError, Timestamp};
use crate::domain::gateway::{AiGateway, GenerateOptions};
use crate::domain::jobs::{AnalysisConfidence, ContentHash, StructuredRequirements};
use crate::ports::Message;

const ANALYSIS_PROMPT: &str = "\
Analyze the job description the user provides and extract a JSON object in \
this exact shape:

{
  \"required_skills\": [\"skill\", ...],
  \"preferred_skills\": [\"skill\", ...],
  \"tools_technologies\": [\"tool\", ...],
  \"key_responsibilities\": [\"responsibility\", ...],
  \"red_flags\": [\"concerning language: unrealistic scope, compensation concerns\", ...]
}

Respond with only the JSON object.";

/// Tech terms recognized by the deterministic fallback.
static FALLBACK_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "python", "java", "javascript", "typescript", "rust", "go", "c++", "c#", "ruby", "php",
        "sql", "postgresql", "mysql", "mongodb", "redis", "aws", "azure", "gcp", "docker",
        "kubernetes", "terraform", "git", "linux", "react", "angular", "vue", "node", "django",
        "rails", "spring", "kafka", "spark", "airflow", "excel", "tableau", "jira",
    ]
});

/// Phrases the fallback flags as concerning.
static FALLBACK_RED_FLAG_PATTERNS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "rockstar",
        "ninja",
        "wear many hats",
        "fast-paced environment",
        "work hard play hard",
        "unpaid",
        "commission only",
    ]
});

#[derive(Debug, Deserialize)]
struct AnalysisReply {
    #[serde(default)]
    required_skills: Vec<String>,
    #[serde(default)]
    preferred_skills: Vec<String>,
    #[serde(default)]
    tools_technologies: Vec<String>,
    #[serde(default)]
    key_responsibilities: Vec<String>,
    #[serde(default)]
    red_flags: Vec<String>,
}

/// Extracts structured requirements from raw posting text.
///
/// Results are cached by content hash, so a given text is analyzed at most
/// once; concurrent calls for the same hash share a single in-flight
/// analysis instead of issuing duplicate model calls.
pub struct JobAnalyzer {
    gateway: Arc<AiGateway>,
    cache: Mutex<HashMap<ContentHash, Arc<OnceCell<StructuredRequirements>>>>,
}

impl JobAnalyzer {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Analyzes raw job text, consulting the cache first.
    ///
    /// A schema-validation failure degrades to the keyword fallback (tagged
    /// low-confidence) and is cached like any other result. Transient
    /// provider exhaustion propagates and leaves the cache slot empty so a
    /// later call can retry.
    pub async fn analyze(&self, raw_text: &str) -> Result<StructuredRequirements, CoreError> {
        let hash = ContentHash::of_text(raw_text);

        let cell = {
            let mut cache = self.cache.lock().await;
            Arc::clone(cache.entry(hash.clone()).or_default())
        };

        let requirements = cell
            .get_or_try_init(|| async {
                debug!(%hash, "no cached analysis, extracting");
                self.extract(raw_text).await
            })
            .await?;

        Ok(requirements.clone())
    }

    async fn extract(&self, raw_text: &str) -> Result<StructuredRequirements, CoreError> {
        let history = vec![Message::user(raw_text.to_string())];
        match self
            .gateway
            .generate_structured::<AnalysisReply>(
                ANALYSIS_PROMPT,
                history,
                &GenerateOptions::extraction(),
            )
            .await
        {
            Ok((reply, _)) => Ok(StructuredRequirements {
                required_skills: normalize(reply.required_skills),
                preferred_skills: normalize(reply.preferred_skills),
                tools_technologies: normalize(reply.tools_technologies),
                responsibilities: normalize(reply.key_responsibilities),
                red_flags: normalize(reply.red_flags),
                confidence: AnalysisConfidence::High,
                analyzed_at: Timestamp::now(),
            }),
            Err(CoreError::Validation(reason)) => {
                warn!(%reason, "analysis reply invalid, using keyword fallback");
                Ok(Self::keyword_fallback(raw_text))
            }
            Err(err) => Err(err),
        }
    }

    /// Deterministic non-AI fallback: whole-word tech keyword and red-flag
    /// phrase matching over the raw text.
    pub fn keyword_fallback(raw_text: &str) -> StructuredRequirements {
        let lowered = raw_text.to_lowercase();
        let tokens: std::collections::HashSet<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .filter(|t| !t.is_empty())
            .collect();

        let found: Vec<String> = FALLBACK_KEYWORDS
            .iter()
            .filter(|kw| tokens.contains(**kw))
            .map(|kw| kw.to_string())
            .collect();

        let red_flags: Vec<String> = FALLBACK_RED_FLAG_PATTERNS
            .iter()
            .filter(|p| lowered.contains(**p))
            .map(|p| p.to_string())
            .collect();

        StructuredRequirements {
            required_skills: found.clone(),
            preferred_skills: Vec::new(),
            tools_technologies: found,
            responsibilities: Vec::new(),
            red_flags,
            confidence: AnalysisConfidence::Low,
            analyzed_at: Timestamp::now(),
        }
    }
}

fn normalize(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect()
}
