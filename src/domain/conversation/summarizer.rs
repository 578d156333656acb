//! Summary generation - turns a finished conversation into a structured
//! experience summary.

use std::sync::Arc;
use tracing::warn;

use crate::domain::conversation::{to_prompt_messages, ExperienceSummary, Role, StoredMessage};
use crate::domain::gateway::{AiGateway, GenerateOptions};
use crate::ports::Message;

const EXTRACTION_PROMPT: &str = "\
Based on the conversation, summarize this professional experience. Respond \
with only a JSON object in this exact shape:

{
  \"title\": \"Concise experience title (e.g., 'Software Engineer at TechCorp')\",
  \"narrative_summary\": \"A detailed paragraph describing the full experience\",
  \"resume_bullets\": [\"Impact-focused bullet with outcome\", \"...\"],
  \"interview_story\": {
    \"situation\": \"Context and challenge\",
    \"action\": \"What the user specifically did\",
    \"result\": \"Outcome and impact\"
  },
  \"skills_identified\": {
    \"technical_skills\": [\"...\"],
    \"soft_skills\": [\"...\"],
    \"tools_technologies\": [\"...\"]
  },
  \"key_achievements\": [\"Specific measurable achievements\"],
  \"timeline\": \"Duration and timeframe\",
  \"role_context\": \"Job title and company context\"
}

Be specific and quantify where possible.";

const TITLE_PROMPT: &str = "\
Create a concise, professional title (max 50 characters) for the experience \
discussed in this conversation, such as 'Software Engineer at TechCorp' or \
'Data Analysis Internship'. Respond with just the title, no extra text.";

const FALLBACK_TITLE: &str = "Professional Experience Discussion";

/// Converts a completed message history into an [`ExperienceSummary`].
///
/// Generation never fails outright: when the model's reply does not survive
/// schema validation, the generator degrades to a deterministic template
/// built from the user's own turns.
pub struct SummaryGenerator {
    gateway: Arc<AiGateway>,
}

impl SummaryGenerator {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self { gateway }
    }

    /// Produces a well-formed summary for the given history.
    pub async fn generate(&self, messages: &[StoredMessage]) -> ExperienceSummary {
        match self
            .gateway
            .generate_structured::<ExperienceSummary>(
                EXTRACTION_PROMPT,
                to_prompt_messages(messages),
                &GenerateOptions::extraction(),
            )
            .await
        {
            Ok((summary, _)) => match summary.validate() {
                Ok(()) => summary,
                Err(err) => {
                    warn!(error = %err, "extracted summary failed validation, degrading");
                    Self::degraded(messages)
                }
            },
            Err(err) => {
                warn!(error = %err, "summary extraction failed, degrading");
                Self::degraded(messages)
            }
        }
    }

    /// Generates a short conversation title, falling back to a fixed one.
    pub async fn generate_title(&self, messages: &[StoredMessage]) -> String {
        let mut history = to_prompt_messages(messages);
        history.push(Message::user(TITLE_PROMPT));

        match self
            .gateway
            .generate("", history, &GenerateOptions::extraction())
            .await
        {
            Ok(reply) => {
                let title = reply.content.trim().trim_matches(['"', '\'']).trim();
                if title.is_empty() {
                    FALLBACK_TITLE.to_string()
                } else {
                    title.to_string()
                }
            }
            Err(_) => FALLBACK_TITLE.to_string(),
        }
    }

    /// Deterministic template: the user's turns joined into one narrative,
    /// structured fields left empty but schema-valid.
    fn degraded(messages: &[StoredMessage]) -> ExperienceSummary {
        let narrative = messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let narrative = if narrative.is_empty() {
            "No experience details were captured.".to_string()
        } else {
            narrative
        };
        ExperienceSummary::fallback(narrative)
    }
}
