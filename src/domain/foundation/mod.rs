//! Foundation value objects shared across the domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{CoreError, ProviderFailure};
pub use ids::{ConversationId, ExperienceId, JobPostingId, MessageId, OwnerId, SkillId};
pub use timestamp::Timestamp;
