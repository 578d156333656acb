//! Conversation lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a guided conversation.
///
/// Valid transitions: `Active ⇄ Paused`, `Active → Completed`.
/// `Completed` is terminal; nothing transitions out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    /// Accepting turns.
    Active,
    /// Suspended by the user; message history stays readable.
    Paused,
    /// Summary attached; read-only from here on.
    Completed,
}

impl ConversationStatus {
    /// Checks whether a transition to `target` is allowed.
    pub fn can_transition_to(&self, target: ConversationStatus) -> bool {
        use ConversationStatus::*;
        matches!(
            (self, target),
            (Active, Paused) | (Paused, Active) | (Active, Completed)
        )
    }

    /// True while new messages may be appended.
    pub fn accepts_messages(&self) -> bool {
        matches!(self, ConversationStatus::Active | ConversationStatus::Paused)
    }

    /// True once the conversation has reached its terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversationStatus::Completed)
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Paused => "paused",
            ConversationStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConversationStatus::*;

    #[test]
    fn allowed_transitions() {
        assert!(Active.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
    }

    #[test]
    fn completed_is_terminal() {
        assert!(!Completed.can_transition_to(Active));
        assert!(!Completed.can_transition_to(Paused));
        assert!(!Completed.can_transition_to(Completed));
        assert!(Completed.is_terminal());
    }

    #[test]
    fn paused_cannot_complete_directly() {
        assert!(!Paused.can_transition_to(Completed));
    }

    #[test]
    fn messages_accepted_unless_completed() {
        assert!(Active.accepts_messages());
        assert!(Paused.accepts_messages());
        assert!(!Completed.accepts_messages());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Active).unwrap(), "\"active\"");
        assert_eq!(serde_json::to_string(&Completed).unwrap(), "\"completed\"");
    }
}
