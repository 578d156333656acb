//! In-memory store implementations.
//!
//! Thread-safe adapters over the persistence ports. Useful for:
//! - Development and testing environments
//! - Single-process deployments without persistence requirements
//! - Demonstration and prototyping
//!
//! Data does not survive a restart; production deployments should provide
//! database-backed implementations of the same ports.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::conversation::{Conversation, StoredMessage};
use crate::domain::foundation::{ConversationId, CoreError, JobPostingId, OwnerId};
use crate::domain::jobs::{JobPosting, StructuredRequirements};
use crate::domain::matching::Experience;
use crate::ports::{AuthProvider, ConversationStore, ExperienceReader, JobStore};

/// In-memory implementation of the ConversationStore port.
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
}

impl InMemoryConversationStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored conversations.
    pub fn len(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }

    /// Returns true if no conversations are stored.
    pub fn is_empty(&self) -> bool {
        self.conversations.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(&self, id: ConversationId) -> Result<Conversation, CoreError> {
        self.conversations
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("conversation", id.to_string()))
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), CoreError> {
        let mut conversations = self.conversations.lock().unwrap();
        // Messages are append-only and flow through `append_message`; save
        // persists state without clobbering the stored history.
        let messages = conversations
            .get(&conversation.id())
            .map(|stored| stored.messages().to_vec())
            .unwrap_or_else(|| conversation.messages().to_vec());
        conversations.insert(
            conversation.id(),
            Conversation::reconstitute(
                conversation.id(),
                conversation.owner().clone(),
                conversation.status(),
                conversation.title().map(str::to_string),
                conversation.summary().cloned(),
                messages,
                conversation.created_at(),
                conversation.updated_at(),
            ),
        );
        Ok(())
    }

    async fn append_message(
        &self,
        conversation_id: ConversationId,
        message: &StoredMessage,
    ) -> Result<(), CoreError> {
        let mut conversations = self.conversations.lock().unwrap();
        let conversation = conversations
            .get_mut(&conversation_id)
            .ok_or_else(|| CoreError::not_found("conversation", conversation_id.to_string()))?;

        let mut messages = conversation.messages().to_vec();
        messages.push(message.clone());
        *conversation = Conversation::reconstitute(
            conversation.id(),
            conversation.owner().clone(),
            conversation.status(),
            conversation.title().map(str::to_string),
            conversation.summary().cloned(),
            messages,
            conversation.created_at(),
            conversation.updated_at(),
        );
        Ok(())
    }

    async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<Conversation>, CoreError> {
        let mut owned: Vec<Conversation> = self
            .conversations
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.owner() == owner)
            .cloned()
            .collect();
        // Newest first, stable across calls.
        owned.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
        });
        Ok(owned)
    }
}

/// In-memory implementation of the JobStore port.
#[derive(Default)]
pub struct InMemoryJobStore {
    postings: Mutex<HashMap<JobPostingId, JobPosting>>,
}

impl InMemoryJobStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a posting (test and demo seeding).
    pub fn insert(&self, posting: JobPosting) {
        self.postings.lock().unwrap().insert(posting.id(), posting);
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn load_job_posting(&self, id: JobPostingId) -> Result<JobPosting, CoreError> {
        self.postings
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("job posting", id.to_string()))
    }

    async fn save_job_posting(&self, posting: &JobPosting) -> Result<(), CoreError> {
        self.postings
            .lock()
            .unwrap()
            .insert(posting.id(), posting.clone());
        Ok(())
    }

    async fn save_job_analysis(
        &self,
        id: JobPostingId,
        requirements: &StructuredRequirements,
    ) -> Result<(), CoreError> {
        let mut postings = self.postings.lock().unwrap();
        let posting = postings
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("job posting", id.to_string()))?;
        posting.attach_requirements(requirements.clone());
        Ok(())
    }
}

/// In-memory implementation of the ExperienceReader port.
#[derive(Default)]
pub struct InMemoryExperienceReader {
    experiences: Mutex<HashMap<OwnerId, Vec<Experience>>>,
}

impl InMemoryExperienceReader {
    /// Creates a new empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an experience for its owner.
    pub fn insert(&self, experience: Experience) {
        self.experiences
            .lock()
            .unwrap()
            .entry(experience.owner.clone())
            .or_default()
            .push(experience);
    }
}

#[async_trait]
impl ExperienceReader for InMemoryExperienceReader {
    async fn load_experiences(&self, owner: &OwnerId) -> Result<Vec<Experience>, CoreError> {
        Ok(self
            .experiences
            .lock()
            .unwrap()
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }
}

/// Auth provider that always answers with one fixed owner.
///
/// Stands in for real identity resolution in tests and single-user demos.
pub struct StaticAuthProvider {
    owner: OwnerId,
}

impl StaticAuthProvider {
    pub fn new(owner: OwnerId) -> Self {
        Self { owner }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_owner(&self) -> Result<OwnerId, CoreError> {
        Ok(self.owner.clone())
    }
}
