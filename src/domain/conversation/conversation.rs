//! Conversation entity - lifecycle and message ownership.

use std::collections::HashMap;

use crate::domain::conversation::{ConversationStatus, ExperienceSummary, Role, StoredMessage};
use crate::domain::foundation::{ConversationId, CoreError, OwnerId, Timestamp};

/// A guided experience-extraction conversation.
///
/// Owned exclusively by one user and mutated only through the transition
/// methods below; every disallowed request surfaces a typed state error
/// rather than silently no-opping.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: ConversationId,
    owner: OwnerId,
    status: ConversationStatus,
    title: Option<String>,
    summary: Option<ExperienceSummary>,
    messages: Vec<StoredMessage>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Conversation {
    /// Starts a new conversation in `Active` state with no messages.
    pub fn start(owner: OwnerId) -> Self {
        let now = Timestamp::now();
        Self {
            id: ConversationId::new(),
            owner,
            status: ConversationStatus::Active,
            title: None,
            summary: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes a conversation from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ConversationId,
        owner: OwnerId,
        status: ConversationStatus,
        title: Option<String>,
        summary: Option<ExperienceSummary>,
        messages: Vec<StoredMessage>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            status,
            title,
            summary,
            messages,
            created_at,
            updated_at,
        }
    }

    // === Accessors ===

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn summary(&self) -> Option<&ExperienceSummary> {
        self.summary.as_ref()
    }

    pub fn messages(&self) -> &[StoredMessage] {
        &self.messages
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn user_turn_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }

    pub fn last_message(&self) -> Option<&StoredMessage> {
        self.messages.last()
    }

    pub fn last_user_message(&self) -> Option<&StoredMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// Verifies the caller owns this conversation.
    pub fn ensure_owned_by(&self, owner: &OwnerId) -> Result<(), CoreError> {
        if &self.owner != owner {
            return Err(CoreError::forbidden("conversation", owner.to_string()));
        }
        Ok(())
    }

    // === Message Management ===

    /// Appends a message, assigning the next sequence number.
    ///
    /// Allowed while `Active` or `Paused`; a user message appended to a
    /// paused conversation reactivates it. Fails with a state error once
    /// the conversation is `Completed`.
    pub fn append(
        &mut self,
        role: Role,
        content: impl Into<String>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<&StoredMessage, CoreError> {
        if !self.status.accepts_messages() {
            return Err(CoreError::invalid_state(
                "append_message",
                self.status.to_string(),
            ));
        }

        if self.status == ConversationStatus::Paused && role == Role::User {
            self.status = ConversationStatus::Active;
        }

        let sequence = self.messages.len() as u32;
        let message = StoredMessage::new(self.id, role, content, metadata, sequence);
        self.messages.push(message);
        self.updated_at = Timestamp::now();
        Ok(self.messages.last().expect("message just pushed"))
    }

    // === State Transitions ===

    /// Suspends an active conversation.
    pub fn pause(&mut self) -> Result<(), CoreError> {
        if !self.status.can_transition_to(ConversationStatus::Paused) {
            return Err(CoreError::invalid_state("pause", self.status.to_string()));
        }
        self.status = ConversationStatus::Paused;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Reactivates a paused conversation.
    pub fn resume(&mut self) -> Result<(), CoreError> {
        if !self.status.can_transition_to(ConversationStatus::Active) {
            return Err(CoreError::invalid_state("resume", self.status.to_string()));
        }
        self.status = ConversationStatus::Active;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Completes the conversation, attaching its summary. Terminal.
    pub fn complete(&mut self, summary: ExperienceSummary) -> Result<(), CoreError> {
        if self.status == ConversationStatus::Paused {
            // A paused conversation resumes before completing.
            self.resume()?;
        }
        if !self.status.can_transition_to(ConversationStatus::Completed) {
            return Err(CoreError::invalid_state("complete", self.status.to_string()));
        }
        self.status = ConversationStatus::Completed;
        self.summary = Some(summary);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Sets a generated title, truncating to 50 characters.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let mut title = title.into().trim().to_string();
        if title.chars().count() > 50 {
            title = title.chars().take(47).collect::<String>() + "...";
        }
        self.title = Some(title);
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::summary::ExperienceSummary;

    fn owner() -> OwnerId {
        OwnerId::new("user-1").unwrap()
    }

    fn conversation() -> Conversation {
        Conversation::start(owner())
    }

    fn summary() -> ExperienceSummary {
        ExperienceSummary::fallback("worked on a data pipeline")
    }

    #[test]
    fn starts_active_with_no_messages() {
        let conv = conversation();
        assert_eq!(conv.status(), ConversationStatus::Active);
        assert_eq!(conv.message_count(), 0);
        assert!(conv.summary().is_none());
    }

    #[test]
    fn append_assigns_monotonic_sequence() {
        let mut conv = conversation();
        conv.append(Role::Assistant, "Hello!", HashMap::new()).unwrap();
        conv.append(Role::User, "Hi", HashMap::new()).unwrap();
        conv.append(Role::Assistant, "Tell me more", HashMap::new())
            .unwrap();

        let sequences: Vec<u32> = conv.messages().iter().map(|m| m.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }

    #[test]
    fn user_turn_count_ignores_assistant_messages() {
        let mut conv = conversation();
        conv.append(Role::Assistant, "Hello!", HashMap::new()).unwrap();
        conv.append(Role::User, "Hi", HashMap::new()).unwrap();
        conv.append(Role::Assistant, "Go on", HashMap::new()).unwrap();
        conv.append(Role::User, "Sure", HashMap::new()).unwrap();
        assert_eq!(conv.user_turn_count(), 2);
    }

    #[test]
    fn pause_and_resume_toggle() {
        let mut conv = conversation();
        conv.pause().unwrap();
        assert_eq!(conv.status(), ConversationStatus::Paused);
        conv.resume().unwrap();
        assert_eq!(conv.status(), ConversationStatus::Active);
    }

    #[test]
    fn pause_twice_fails() {
        let mut conv = conversation();
        conv.pause().unwrap();
        let err = conv.pause().unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[test]
    fn user_append_reactivates_paused_conversation() {
        let mut conv = conversation();
        conv.pause().unwrap();
        conv.append(Role::User, "I'm back", HashMap::new()).unwrap();
        assert_eq!(conv.status(), ConversationStatus::Active);
    }

    #[test]
    fn complete_attaches_summary_and_is_terminal() {
        let mut conv = conversation();
        conv.append(Role::User, "details", HashMap::new()).unwrap();
        conv.complete(summary()).unwrap();

        assert_eq!(conv.status(), ConversationStatus::Completed);
        assert!(conv.summary().is_some());

        assert!(matches!(
            conv.complete(summary()).unwrap_err(),
            CoreError::InvalidState { .. }
        ));
        assert!(matches!(
            conv.append(Role::User, "more", HashMap::new()).unwrap_err(),
            CoreError::InvalidState { .. }
        ));
        assert!(matches!(conv.pause().unwrap_err(), CoreError::InvalidState { .. }));
        assert!(matches!(conv.resume().unwrap_err(), CoreError::InvalidState { .. }));
    }

    #[test]
    fn paused_conversation_resumes_then_completes() {
        let mut conv = conversation();
        conv.pause().unwrap();
        conv.complete(summary()).unwrap();
        assert_eq!(conv.status(), ConversationStatus::Completed);
    }

    #[test]
    fn ownership_check_rejects_other_owner() {
        let conv = conversation();
        let other = OwnerId::new("user-2").unwrap();
        assert!(conv.ensure_owned_by(&owner()).is_ok());
        assert!(matches!(
            conv.ensure_owned_by(&other).unwrap_err(),
            CoreError::Forbidden { .. }
        ));
    }

    #[test]
    fn set_title_truncates_long_titles() {
        let mut conv = conversation();
        conv.set_title("x".repeat(80));
        let title = conv.title().unwrap();
        assert_eq!(title.chars().count(), 50);
        assert!(title.ends_with("..."));
    }
}
