//! Structured experience summary extracted from a completed conversation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CoreError;

/// Situation / action / result triple for interview storytelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewStory {
    /// Context and challenge.
    pub situation: String,
    /// What the user specifically did.
    pub action: String,
    /// Outcome and impact.
    pub result: String,
}

/// Skills demonstrated in the experience, partitioned by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategories {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub tools_technologies: Vec<String>,
}

impl SkillCategories {
    /// True when no category has any entries.
    pub fn is_empty(&self) -> bool {
        self.technical_skills.is_empty()
            && self.soft_skills.is_empty()
            && self.tools_technologies.is_empty()
    }
}

/// Summary of one professional experience, produced once per completed
/// conversation and immutable thereafter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceSummary {
    /// Concise experience title, e.g. "Software Engineer at TechCorp".
    pub title: String,
    /// Narrative paragraph describing the full experience.
    pub narrative_summary: String,
    /// Resume-ready, impact-focused bullet strings.
    pub resume_bullets: Vec<String>,
    /// Structured interview story.
    pub interview_story: InterviewStory,
    /// Skills partitioned into technical/soft/tools.
    pub skills_identified: SkillCategories,
    /// Specific measurable achievements.
    pub key_achievements: Vec<String>,
    /// Duration and timeframe.
    pub timeline: String,
    /// Job title and company context.
    pub role_context: String,
}

impl ExperienceSummary {
    /// Validates a model-produced summary against the schema the extraction
    /// prompt requested: narrative present, every bullet non-empty, skill
    /// lists free of blank entries.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.narrative_summary.trim().is_empty() {
            return Err(CoreError::validation("narrative_summary is empty"));
        }
        if self.resume_bullets.iter().any(|b| b.trim().is_empty()) {
            return Err(CoreError::validation("resume_bullets contains an empty entry"));
        }
        let blank_skill = self
            .skills_identified
            .technical_skills
            .iter()
            .chain(&self.skills_identified.soft_skills)
            .chain(&self.skills_identified.tools_technologies)
            .any(|s| s.trim().is_empty());
        if blank_skill {
            return Err(CoreError::validation("skills_identified contains an empty entry"));
        }
        Ok(())
    }

    /// Deterministic low-fidelity summary used when extraction fails: the
    /// narrative carries the user's own words and the structured fields stay
    /// empty but well-formed.
    pub fn fallback(narrative: impl Into<String>) -> Self {
        Self {
            title: "Professional Experience".to_string(),
            narrative_summary: narrative.into(),
            ..Self::default()
        }
    }
}
