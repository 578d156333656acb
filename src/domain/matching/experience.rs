//! Skill and experience entities owned by a user.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, ExperienceId, OwnerId, SkillId, Timestamp};

/// Broad skill classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Soft,
    Tool,
    Other,
}

/// A skill the user claims, with optional depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub owner: OwnerId,
    pub name: String,
    pub category: SkillCategory,
    pub years_experience: Option<f32>,
}

impl Skill {
    pub fn new(owner: OwnerId, name: impl Into<String>, category: SkillCategory) -> Self {
        Self {
            id: SkillId::new(),
            owner,
            name: name.into(),
            category,
            years_experience: None,
        }
    }

    pub fn with_years(mut self, years: f32) -> Self {
        self.years_experience = Some(years);
        self
    }
}

/// One recorded professional experience.
///
/// Experiences may carry structured skill tags; when they don't, matching
/// falls back to keyword comparison over the free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: ExperienceId,
    pub owner: OwnerId,
    pub skills: Vec<Skill>,
    pub tags: Vec<String>,
    pub description: String,
    /// When the experience ended (drives recency weighting).
    pub occurred_at: Timestamp,
    /// Optional link to the employment record this belongs to.
    pub employment_ref: Option<String>,
    /// Optional link to an education record.
    pub education_ref: Option<String>,
    /// The guided conversation that produced this experience, if any.
    pub conversation_id: Option<ConversationId>,
}

impl Experience {
    pub fn new(owner: OwnerId, description: impl Into<String>, occurred_at: Timestamp) -> Self {
        Self {
            id: ExperienceId::new(),
            owner,
            skills: Vec::new(),
            tags: Vec::new(),
            description: description.into(),
            occurred_at,
            employment_ref: None,
            education_ref: None,
            conversation_id: None,
        }
    }

    pub fn with_skills(mut self, skills: Vec<Skill>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn from_conversation(mut self, conversation_id: ConversationId) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }

    /// True when the experience carries structured skill tags.
    pub fn has_structured_skills(&self) -> bool {
        !self.skills.is_empty()
    }

    /// Description and tags combined for keyword matching.
    pub fn free_text(&self) -> String {
        let mut text = self.description.clone();
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text
    }
}
