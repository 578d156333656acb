//! Ports - capability interfaces the core depends on.

mod ai_provider;
mod auth_provider;
mod conversation_store;
mod job_store;
mod scraper;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, Message, MessageRole,
    ProviderInfo, ResponseFormat, TokenUsage,
};
pub use auth_provider::AuthProvider;
pub use conversation_store::ConversationStore;
pub use job_store::{ExperienceReader, JobStore};
pub use scraper::JobScraper;
