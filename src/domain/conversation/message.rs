//! Message entity - append-only conversation records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{ConversationId, MessageId, Timestamp};

/// Who produced a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The job seeker.
    User,
    /// The guiding model.
    Assistant,
    /// Core-injected instructions or annotations.
    System,
}

/// A single message within a conversation.
///
/// Messages are immutable once appended; the sequence number is assigned by
/// the owning conversation and increases monotonically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: Role,
    pub content: String,
    /// Free-form context such as model name and token usage.
    pub metadata: HashMap<String, serde_json::Value>,
    pub sequence: u32,
    pub created_at: Timestamp,
}

impl StoredMessage {
    /// Creates a message record; called only by `Conversation::append`.
    pub(crate) fn new(
        conversation_id: ConversationId,
        role: Role,
        content: impl Into<String>,
        metadata: HashMap<String, serde_json::Value>,
        sequence: u32,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role,
            content: content.into(),
            metadata,
            sequence,
            created_at: Timestamp::now(),
        }
    }
}
