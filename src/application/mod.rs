//! Application layer - services coordinating domain logic over the ports.

mod conversations;
mod jobs;

pub use conversations::{
    ConversationOrchestrator, ConversationOverview, OwnerConversations, ProcessedTurn,
};
pub use jobs::{JobMatchReport, JobMatchingService};
