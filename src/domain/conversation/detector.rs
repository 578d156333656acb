//! Completion detection - decides when a conversation has gathered enough.

use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::domain::conversation::{to_prompt_messages, Role, StoredMessage};
use crate::domain::gateway::{AiGateway, GenerateOptions};

/// Phrases that signal an explicit request to wrap up.
const FINISH_SIGNALS: [&str; 6] = [
    "i'm done",
    "that's all",
    "that's it",
    "wrap up",
    "finish up",
    "create the summary",
];

const SUFFICIENCY_PROMPT: &str = "\
You are evaluating a career-coaching conversation in which a user describes \
one professional experience. Judge whether enough detail has been captured to \
write a resume-quality summary: the situation and role, the specific actions \
taken, the tools and technologies used, and measurable impact.

Respond with only a JSON object:
{\"sufficient\": true or false, \"confidence\": 0.0 to 1.0, \"reasoning\": \"one sentence\"}";

/// The detector's judgment for one message history.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionAssessment {
    pub eligible: bool,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct SufficiencyVerdict {
    sufficient: bool,
    confidence: f32,
    #[serde(default)]
    reasoning: String,
}

/// Decides, after each turn, whether a conversation may be completed.
///
/// Signals are evaluated in precedence order: an explicit user request to
/// finish always wins; the minimum-exchange floor then blocks premature
/// termination regardless of any AI signal; only past the floor does the
/// model's sufficiency assessment apply. Given an identical history and a
/// deterministic gateway, the assessment is idempotent.
pub struct CompletionDetector {
    gateway: Arc<AiGateway>,
    min_user_turns: usize,
    confidence_threshold: f32,
}

impl CompletionDetector {
    pub fn new(gateway: Arc<AiGateway>, min_user_turns: usize, confidence_threshold: f32) -> Self {
        Self {
            gateway,
            min_user_turns,
            confidence_threshold,
        }
    }

    /// Assesses the full ordered message history.
    pub async fn assess(&self, messages: &[StoredMessage]) -> CompletionAssessment {
        if let Some(latest) = messages.iter().rev().find(|m| m.role == Role::User) {
            if Self::requests_finish(&latest.content) {
                return CompletionAssessment {
                    eligible: true,
                    reason: "user asked to finish".to_string(),
                };
            }
        }

        let user_turns = messages.iter().filter(|m| m.role == Role::User).count();
        if user_turns < self.min_user_turns {
            return CompletionAssessment {
                eligible: false,
                reason: format!(
                    "only {user_turns} of {} required user turns",
                    self.min_user_turns
                ),
            };
        }

        match self
            .gateway
            .generate_structured::<SufficiencyVerdict>(
                SUFFICIENCY_PROMPT,
                to_prompt_messages(messages),
                &GenerateOptions::extraction(),
            )
            .await
        {
            Ok((verdict, _)) => {
                debug!(
                    sufficient = verdict.sufficient,
                    confidence = verdict.confidence,
                    "sufficiency verdict"
                );
                let eligible =
                    verdict.sufficient && verdict.confidence >= self.confidence_threshold;
                let reason = if eligible {
                    if verdict.reasoning.is_empty() {
                        "enough detail captured".to_string()
                    } else {
                        verdict.reasoning
                    }
                } else if verdict.sufficient {
                    format!(
                        "confidence {:.2} below threshold {:.2}",
                        verdict.confidence, self.confidence_threshold
                    )
                } else if verdict.reasoning.is_empty() {
                    "more detail needed".to_string()
                } else {
                    verdict.reasoning
                };
                CompletionAssessment { eligible, reason }
            }
            // Conservative default: never complete on a failed assessment.
            Err(_) => CompletionAssessment {
                eligible: false,
                reason: "unable to assess completion".to_string(),
            },
        }
    }

    fn requests_finish(content: &str) -> bool {
        let lowered = content.to_lowercase();
        FINISH_SIGNALS.iter().any(|signal| lowered.contains(signal))
    }
}
