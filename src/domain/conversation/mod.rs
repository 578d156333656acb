//! Conversation domain - lifecycle, completion detection and summarization.

#[allow(clippy::module_inception)]
mod conversation;
mod detector;
mod message;
mod status;
pub(crate) mod summary;
mod summarizer;

pub use conversation::Conversation;
pub use detector::{CompletionAssessment, CompletionDetector};
pub use message::{Role, StoredMessage};
pub use status::ConversationStatus;
pub use summary::{ExperienceSummary, InterviewStory, SkillCategories};
pub use summarizer::SummaryGenerator;

use crate::ports::{Message, MessageRole};

/// Converts stored history into provider prompt messages.
pub fn to_prompt_messages(messages: &[StoredMessage]) -> Vec<Message> {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => MessageRole::User,
                Role::Assistant => MessageRole::Assistant,
                Role::System => MessageRole::System,
            };
            Message::new(role, m.content.clone())
        })
        .collect()
}
