//! Conversation orchestration - the application service coordinating guided
//! experience-extraction interviews.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

use crate::config::ConversationConfig;
use crate::domain::conversation::{
    to_prompt_messages, CompletionAssessment, CompletionDetector, Conversation,
    ConversationStatus, Role, StoredMessage, SummaryGenerator,
};
use crate::domain::foundation::{ConversationId, CoreError, OwnerId};
use crate::domain::gateway::{AiGateway, GenerateOptions};
use crate::ports::ConversationStore;

const INTERVIEW_PROMPT: &str = "\
You are a friendly career coach interviewing a user about one professional \
experience. Ask one focused follow-up question at a time to draw out the \
situation, the user's specific actions, the tools and technologies involved, \
and measurable results. Keep replies short and conversational. Never invent \
details the user did not state.";

/// The outcome of one processed user turn.
#[derive(Debug, Clone)]
pub struct ProcessedTurn {
    /// The assistant's recorded reply.
    pub reply: StoredMessage,
    /// Completion judgment for the history including this turn.
    pub completion: CompletionAssessment,
}

/// One conversation in an owner's listing.
#[derive(Debug, Clone)]
pub struct ConversationOverview {
    pub id: ConversationId,
    pub title: Option<String>,
    pub status: ConversationStatus,
    pub message_count: usize,
}

/// An owner's conversations with per-status counts.
#[derive(Debug, Clone)]
pub struct OwnerConversations {
    pub conversations: Vec<ConversationOverview>,
    pub active_count: usize,
    pub paused_count: usize,
    pub completed_count: usize,
}

/// Coordinates the interview loop: greeting, turn processing, completion
/// detection, and the confirm-then-complete handshake.
///
/// Completion is two-step by design: a turn may report the conversation
/// eligible, but nothing is finalized until the owner explicitly confirms
/// (or forces) completion. Turns for the same conversation are serialized
/// through a per-conversation lock; different conversations proceed
/// concurrently.
pub struct ConversationOrchestrator {
    store: Arc<dyn ConversationStore>,
    gateway: Arc<AiGateway>,
    detector: CompletionDetector,
    summarizer: SummaryGenerator,
    greeting: String,
    locks: Mutex<HashMap<ConversationId, Arc<tokio::sync::Mutex<()>>>>,
    /// Whether the most recent assessment proposed completion.
    ready: Mutex<HashMap<ConversationId, bool>>,
}

impl ConversationOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        gateway: Arc<AiGateway>,
        config: &ConversationConfig,
    ) -> Self {
        Self {
            store,
            detector: CompletionDetector::new(
                Arc::clone(&gateway),
                config.min_user_turns as usize,
                config.completion_confidence_threshold as f32,
            ),
            summarizer: SummaryGenerator::new(Arc::clone(&gateway)),
            gateway,
            greeting: config.greeting.clone(),
            locks: Mutex::new(HashMap::new()),
            ready: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a new conversation, recording the greeting as the first
    /// assistant message.
    #[instrument(skip(self))]
    pub async fn start(&self, owner: OwnerId) -> Result<Conversation, CoreError> {
        let mut conversation = Conversation::start(owner);
        self.store.save(&conversation).await?;

        let greeting = conversation
            .append(Role::Assistant, self.greeting.clone(), HashMap::new())?
            .clone();
        self.store
            .append_message(conversation.id(), &greeting)
            .await?;

        info!(conversation = %conversation.id(), "conversation started");
        Ok(conversation)
    }

    /// Records a user turn, generates the assistant reply, and assesses
    /// completion readiness.
    ///
    /// A user turn on a paused conversation reactivates it. The readiness
    /// verdict is returned to the caller and remembered for the
    /// [`complete`](Self::complete) handshake; it never completes anything
    /// by itself.
    #[instrument(skip(self, text))]
    pub async fn process_user_message(
        &self,
        id: ConversationId,
        owner: &OwnerId,
        text: &str,
    ) -> Result<ProcessedTurn, CoreError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let mut conversation = self.store.load(id).await?;
        conversation.ensure_owned_by(owner)?;

        let was_paused = conversation.status() == ConversationStatus::Paused;
        let user_message = conversation.append(Role::User, text, HashMap::new())?.clone();
        self.store.append_message(id, &user_message).await?;
        if was_paused {
            // Reactivation must be visible even if reply generation fails.
            self.store.save(&conversation).await?;
        }

        let reply = self
            .gateway
            .generate(
                INTERVIEW_PROMPT,
                to_prompt_messages(conversation.messages()),
                &GenerateOptions::conversational(),
            )
            .await?;

        let mut metadata = HashMap::new();
        metadata.insert("model".to_string(), serde_json::json!(reply.model));
        let assistant_message = conversation
            .append(Role::Assistant, reply.content, metadata)?
            .clone();
        self.store.append_message(id, &assistant_message).await?;

        let completion = self.detector.assess(conversation.messages()).await;
        self.ready.lock().unwrap().insert(id, completion.eligible);

        Ok(ProcessedTurn {
            reply: assistant_message,
            completion,
        })
    }

    /// Completes the conversation, generating and attaching its summary.
    ///
    /// Requires that the latest turn proposed completion, unless `force` is
    /// set by an owner override. Summary generation never blocks completion;
    /// it degrades internally rather than failing.
    #[instrument(skip(self))]
    pub async fn complete(
        &self,
        id: ConversationId,
        owner: &OwnerId,
        force: bool,
    ) -> Result<Conversation, CoreError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let mut conversation = self.store.load(id).await?;
        conversation.ensure_owned_by(owner)?;

        // Terminal conversations are rejected before any model call is made.
        if conversation.status().is_terminal() {
            return Err(CoreError::invalid_state(
                "complete_conversation",
                "conversation already completed",
            ));
        }

        let proposed = self.ready.lock().unwrap().get(&id).copied().unwrap_or(false);
        if !force && !proposed {
            return Err(CoreError::invalid_state(
                "complete_conversation",
                "completion not proposed",
            ));
        }

        let summary = self.summarizer.generate(conversation.messages()).await;
        let title = self.summarizer.generate_title(conversation.messages()).await;

        conversation.complete(summary)?;
        conversation.set_title(title);
        self.store.save(&conversation).await?;

        self.ready.lock().unwrap().remove(&id);
        self.locks.lock().unwrap().remove(&id);

        info!(conversation = %id, "conversation completed");
        Ok(conversation)
    }

    /// Suspends an active conversation.
    pub async fn pause(&self, id: ConversationId, owner: &OwnerId) -> Result<Conversation, CoreError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let mut conversation = self.store.load(id).await?;
        conversation.ensure_owned_by(owner)?;
        conversation.pause()?;
        self.store.save(&conversation).await?;
        Ok(conversation)
    }

    /// Reactivates a paused conversation.
    pub async fn resume(&self, id: ConversationId, owner: &OwnerId) -> Result<Conversation, CoreError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let mut conversation = self.store.load(id).await?;
        conversation.ensure_owned_by(owner)?;
        conversation.resume()?;
        self.store.save(&conversation).await?;
        Ok(conversation)
    }

    /// Loads a conversation with its full history for its owner.
    pub async fn history(
        &self,
        id: ConversationId,
        owner: &OwnerId,
    ) -> Result<Conversation, CoreError> {
        let conversation = self.store.load(id).await?;
        conversation.ensure_owned_by(owner)?;
        Ok(conversation)
    }

    /// Lists the owner's conversations with per-status counts.
    pub async fn list_for_owner(&self, owner: &OwnerId) -> Result<OwnerConversations, CoreError> {
        let conversations = self.store.list_for_owner(owner).await?;

        let mut active_count = 0;
        let mut paused_count = 0;
        let mut completed_count = 0;
        let overviews = conversations
            .iter()
            .map(|c| {
                match c.status() {
                    ConversationStatus::Active => active_count += 1,
                    ConversationStatus::Paused => paused_count += 1,
                    ConversationStatus::Completed => completed_count += 1,
                }
                ConversationOverview {
                    id: c.id(),
                    title: c.title().map(str::to_string),
                    status: c.status(),
                    message_count: c.message_count(),
                }
            })
            .collect();

        Ok(OwnerConversations {
            conversations: overviews,
            active_count,
            paused_count,
            completed_count,
        })
    }

    fn lock_for(&self, id: ConversationId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        // A strong count of 1 means only the map holds the entry; no
        // operation is waiting on it, so it is safe to drop.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(id).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::adapters::storage::InMemoryConversationStore;
    use crate::domain::gateway::GatewayConfig;
    use std::time::Duration;

    fn owner() -> OwnerId {
        OwnerId::new("user-1").unwrap()
    }

    fn orchestrator(provider: MockAIProvider) -> ConversationOrchestrator {
        let gateway = Arc::new(AiGateway::new(
            Arc::new(provider),
            GatewayConfig {
                max_retries: 0,
                initial_backoff: Duration::from_millis(1),
                request_timeout: Duration::from_secs(5),
            },
        ));
        ConversationOrchestrator::new(
            Arc::new(InMemoryConversationStore::new()),
            gateway,
            &ConversationConfig::default(),
        )
    }

    fn verdict(sufficient: bool, confidence: f32) -> String {
        format!("{{\"sufficient\": {sufficient}, \"confidence\": {confidence}}}")
    }

    fn summary_json() -> String {
        serde_json::json!({
            "title": "Data Engineer",
            "narrative_summary": "Built an ETL pipeline.",
            "resume_bullets": ["Cut latency by 50%"],
            "interview_story": {"situation": "s", "action": "a", "result": "r"},
            "skills_identified": {
                "technical_skills": ["Python"],
                "soft_skills": [],
                "tools_technologies": []
            },
            "key_achievements": ["Halved latency"],
            "timeline": "2023",
            "role_context": "Data Engineer"
        })
        .to_string()
    }

    #[tokio::test]
    async fn start_records_greeting_as_first_assistant_message() {
        let orchestrator = orchestrator(MockAIProvider::new());
        let conversation = orchestrator.start(owner()).await.unwrap();

        assert_eq!(conversation.status(), ConversationStatus::Active);
        assert_eq!(conversation.message_count(), 1);
        assert_eq!(conversation.messages()[0].role, Role::Assistant);
        assert!(!conversation.messages()[0].content.is_empty());
    }

    #[tokio::test]
    async fn early_turn_is_not_completion_eligible() {
        // One reply; below the turn floor, so no sufficiency call happens.
        let orchestrator = orchestrator(MockAIProvider::new().with_response("Tell me more!"));
        let conversation = orchestrator.start(owner()).await.unwrap();

        let turn = orchestrator
            .process_user_message(conversation.id(), &owner(), "I built a pipeline")
            .await
            .unwrap();

        assert_eq!(turn.reply.content, "Tell me more!");
        assert!(!turn.completion.eligible);
    }

    #[tokio::test]
    async fn turn_records_user_and_assistant_messages() {
        let orchestrator = orchestrator(MockAIProvider::new().with_response("Go on"));
        let conversation = orchestrator.start(owner()).await.unwrap();
        let id = conversation.id();

        orchestrator
            .process_user_message(id, &owner(), "I led a migration")
            .await
            .unwrap();

        let loaded = orchestrator.history(id, &owner()).await.unwrap();
        assert_eq!(loaded.message_count(), 3); // greeting + user + reply
        assert_eq!(loaded.messages()[1].content, "I led a migration");
        assert_eq!(loaded.messages()[2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn other_owner_cannot_touch_conversation() {
        let orchestrator = orchestrator(MockAIProvider::new());
        let conversation = orchestrator.start(owner()).await.unwrap();
        let intruder = OwnerId::new("user-2").unwrap();

        let err = orchestrator
            .process_user_message(conversation.id(), &intruder, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));

        let err = orchestrator
            .complete(conversation.id(), &intruder, true)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn completion_requires_proposal_unless_forced() {
        let orchestrator = orchestrator(
            MockAIProvider::new()
                .with_response(summary_json())
                .with_response("Generated Title"),
        );
        let conversation = orchestrator.start(owner()).await.unwrap();

        let err = orchestrator
            .complete(conversation.id(), &owner(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));

        // Owner override completes anyway.
        let completed = orchestrator
            .complete(conversation.id(), &owner(), true)
            .await
            .unwrap();
        assert_eq!(completed.status(), ConversationStatus::Completed);
        assert!(completed.summary().is_some());
        assert_eq!(completed.title(), Some("Generated Title"));
    }

    #[tokio::test]
    async fn eligible_turn_then_confirm_completes() {
        // Queue: 3 replies, sufficiency verdict, summary, title.
        let provider = MockAIProvider::new()
            .with_response("Reply 1")
            .with_response("Reply 2")
            .with_response("Reply 3")
            .with_response(verdict(true, 0.9))
            .with_response(summary_json())
            .with_response("Data Engineer at Acme");
        let orchestrator = orchestrator(provider);
        let conversation = orchestrator.start(owner()).await.unwrap();
        let id = conversation.id();

        let t1 = orchestrator
            .process_user_message(id, &owner(), "I built an ETL pipeline")
            .await
            .unwrap();
        assert!(!t1.completion.eligible);
        let t2 = orchestrator
            .process_user_message(id, &owner(), "Used Python and Airflow")
            .await
            .unwrap();
        assert!(!t2.completion.eligible);
        let t3 = orchestrator
            .process_user_message(id, &owner(), "Cut latency in half")
            .await
            .unwrap();
        assert!(t3.completion.eligible);

        let completed = orchestrator.complete(id, &owner(), false).await.unwrap();
        assert_eq!(completed.status(), ConversationStatus::Completed);
        let summary = completed.summary().unwrap();
        assert!(!summary.resume_bullets.is_empty());
    }

    #[tokio::test]
    async fn completed_conversation_rejects_further_turns() {
        let orchestrator = orchestrator(
            MockAIProvider::new()
                .with_response(summary_json())
                .with_response("Title"),
        );
        let conversation = orchestrator.start(owner()).await.unwrap();
        let id = conversation.id();

        orchestrator.complete(id, &owner(), true).await.unwrap();

        let err = orchestrator
            .process_user_message(id, &owner(), "one more thing")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn completing_twice_makes_no_further_model_calls() {
        let provider = MockAIProvider::new()
            .with_response(summary_json())
            .with_response("Title");
        let orchestrator = orchestrator(provider.clone());
        let conversation = orchestrator.start(owner()).await.unwrap();
        let id = conversation.id();

        orchestrator.complete(id, &owner(), true).await.unwrap();
        let calls_after_first = provider.call_count();

        // Force on a terminal conversation fails before summary or title
        // generation runs.
        let err = orchestrator.complete(id, &owner(), true).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
        assert_eq!(provider.call_count(), calls_after_first);
    }

    #[tokio::test]
    async fn lock_registry_prunes_entries_no_operation_holds() {
        let orchestrator = orchestrator(
            MockAIProvider::new()
                .with_response("Go on")
                .with_response("Go on"),
        );
        let a = orchestrator.start(owner()).await.unwrap();
        let b = orchestrator.start(owner()).await.unwrap();

        orchestrator
            .process_user_message(a.id(), &owner(), "first")
            .await
            .unwrap();
        orchestrator
            .process_user_message(b.id(), &owner(), "second")
            .await
            .unwrap();

        // The next acquisition sweeps out idle entries; only the lock held
        // here survives.
        let _held = orchestrator.lock_for(ConversationId::new());
        assert_eq!(orchestrator.locks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pause_blocks_nothing_but_user_turn_reactivates() {
        let orchestrator = orchestrator(MockAIProvider::new().with_response("Welcome back"));
        let conversation = orchestrator.start(owner()).await.unwrap();
        let id = conversation.id();

        let paused = orchestrator.pause(id, &owner()).await.unwrap();
        assert_eq!(paused.status(), ConversationStatus::Paused);

        orchestrator
            .process_user_message(id, &owner(), "picking this back up")
            .await
            .unwrap();

        let loaded = orchestrator.history(id, &owner()).await.unwrap();
        assert_eq!(loaded.status(), ConversationStatus::Active);
    }

    #[tokio::test]
    async fn failed_reply_still_records_user_message() {
        let orchestrator = orchestrator(MockAIProvider::new().with_error(MockError::Unavailable {
            message: "down".into(),
        }));
        let conversation = orchestrator.start(owner()).await.unwrap();
        let id = conversation.id();

        let err = orchestrator
            .process_user_message(id, &owner(), "are you there?")
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let loaded = orchestrator.history(id, &owner()).await.unwrap();
        assert_eq!(loaded.message_count(), 2); // greeting + user message
    }

    #[tokio::test]
    async fn listing_counts_by_status() {
        let orchestrator = orchestrator(
            MockAIProvider::new()
                .with_response(summary_json())
                .with_response("Title"),
        );

        let a = orchestrator.start(owner()).await.unwrap();
        let _b = orchestrator.start(owner()).await.unwrap();
        let c = orchestrator.start(owner()).await.unwrap();

        orchestrator.pause(a.id(), &owner()).await.unwrap();
        orchestrator.complete(c.id(), &owner(), true).await.unwrap();

        let listing = orchestrator.list_for_owner(&owner()).await.unwrap();
        assert_eq!(listing.conversations.len(), 3);
        assert_eq!(listing.active_count, 1);
        assert_eq!(listing.paused_count, 1);
        assert_eq!(listing.completed_count, 1);
    }
}
