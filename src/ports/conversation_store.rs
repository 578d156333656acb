//! Conversation Store Port - persistence boundary for conversations.
//!
//! The core treats storage as durable, consistent and synchronous from its
//! perspective; transactions and indexing are the adapter's concern.

use async_trait::async_trait;

use crate::domain::conversation::{Conversation, StoredMessage};
use crate::domain::foundation::{ConversationId, CoreError, OwnerId};

/// Port for loading and saving conversations.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads a conversation with its full ordered message history.
    ///
    /// # Errors
    /// Returns `CoreError::NotFound` for an unknown id.
    async fn load(&self, id: ConversationId) -> Result<Conversation, CoreError>;

    /// Persists conversation state (status, summary, timestamps).
    async fn save(&self, conversation: &Conversation) -> Result<(), CoreError>;

    /// Appends a single message record. Messages are append-only; adapters
    /// must never update or delete an existing record.
    async fn append_message(
        &self,
        conversation_id: ConversationId,
        message: &StoredMessage,
    ) -> Result<(), CoreError>;

    /// Lists all conversations belonging to an owner.
    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<Conversation>, CoreError>;
}
