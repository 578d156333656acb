//! AI Gateway - resilience and validation layer over provider ports.
//!
//! The gateway owns the call policy the rest of the core relies on:
//! bounded retries with exponential backoff for transient failures,
//! caller-side timeouts, ordered provider fallback, and schema validation
//! of structured replies with a single corrective re-prompt. Fatal provider
//! failures (auth, malformed request) surface immediately without retry.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, Message, ResponseFormat,
    TokenUsage,
};
use crate::domain::foundation::CoreError;

/// Call policy configuration for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Retries per provider after the first attempt.
    pub max_retries: u32,
    /// Initial backoff; doubles per retry.
    pub initial_backoff: Duration,
    /// Caller-side timeout per attempt; elapse counts as transient failure.
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Sampling options for a generation call.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerateOptions {
    /// Defaults tuned for conversational turns.
    pub fn conversational() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    /// Defaults tuned for structured extraction.
    pub fn extraction() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1500,
        }
    }
}

/// A successful generation with its provenance.
#[derive(Debug, Clone)]
pub struct GatewayReply {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

impl From<CompletionResponse> for GatewayReply {
    fn from(response: CompletionResponse) -> Self {
        Self {
            content: response.content,
            model: response.model,
            usage: response.usage,
        }
    }
}

/// Uniform entry point to language-model providers.
pub struct AiGateway {
    providers: Vec<Arc<dyn AIProvider>>,
    config: GatewayConfig,
}

impl AiGateway {
    /// Creates a gateway over a primary provider.
    pub fn new(primary: Arc<dyn AIProvider>, config: GatewayConfig) -> Self {
        Self {
            providers: vec![primary],
            config,
        }
    }

    /// Appends a fallback provider, tried after the primary's retry budget
    /// is exhausted.
    pub fn with_fallback(mut self, fallback: Arc<dyn AIProvider>) -> Self {
        self.providers.push(fallback);
        self
    }

    /// Generates a free-text reply.
    pub async fn generate(
        &self,
        system_prompt: &str,
        history: Vec<Message>,
        options: &GenerateOptions,
    ) -> Result<GatewayReply, CoreError> {
        let request = self.build_request(system_prompt, history, options, ResponseFormat::FreeText);
        let response = self.complete_with_policy(request).await?;
        Ok(response.into())
    }

    /// Generates a reply that must parse as `T`.
    ///
    /// On a parse failure the gateway re-prompts once with a corrective
    /// message; a second failure surfaces `CoreError::Validation`, which
    /// callers handle with their deterministic fallbacks.
    pub async fn generate_structured<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        history: Vec<Message>,
        options: &GenerateOptions,
    ) -> Result<(T, GatewayReply), CoreError> {
        let request = self.build_request(
            system_prompt,
            history.clone(),
            options,
            ResponseFormat::StructuredJson,
        );
        let response = self.complete_with_policy(request).await?;
        let reply: GatewayReply = response.into();

        match parse_structured::<T>(&reply.content) {
            Ok(value) => Ok((value, reply)),
            Err(first_err) => {
                warn!(error = %first_err, "structured reply failed validation, re-prompting");

                let mut corrected_history = history;
                corrected_history.push(Message::assistant(reply.content.clone()));
                corrected_history.push(Message::user(
                    "The previous reply was not valid JSON matching the requested \
                     schema. Respond again with only the JSON object, no prose.",
                ));

                let retry_request = self.build_request(
                    system_prompt,
                    corrected_history,
                    options,
                    ResponseFormat::StructuredJson,
                );
                let retry_response = self.complete_with_policy(retry_request).await?;
                let retry_reply: GatewayReply = retry_response.into();

                let value = parse_structured::<T>(&retry_reply.content)
                    .map_err(|e| CoreError::validation(e))?;
                Ok((value, retry_reply))
            }
        }
    }

    fn build_request(
        &self,
        system_prompt: &str,
        history: Vec<Message>,
        options: &GenerateOptions,
        format: ResponseFormat,
    ) -> CompletionRequest {
        CompletionRequest::new()
            .with_system_prompt(system_prompt)
            .with_messages(history)
            .with_temperature(options.temperature)
            .with_max_tokens(options.max_tokens)
            .with_response_format(format)
    }

    /// Runs a request through the retry/backoff/fallback policy.
    async fn complete_with_policy(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CoreError> {
        let timeout_secs = self.config.request_timeout.as_secs() as u32;
        let mut last_transient: Option<String> = None;

        for provider in &self.providers {
            let info = provider.provider_info();
            let mut backoff = self.config.initial_backoff;

            for attempt in 0..=self.config.max_retries {
                let outcome =
                    tokio::time::timeout(self.config.request_timeout, provider.complete(request.clone()))
                        .await
                        .unwrap_or(Err(AIError::Timeout { timeout_secs }));

                match outcome {
                    Ok(response) => {
                        debug!(provider = %info.name, attempt, "completion succeeded");
                        return Ok(response);
                    }
                    Err(err) if err.is_retryable() => {
                        warn!(provider = %info.name, attempt, error = %err, "transient provider failure");
                        last_transient = Some(classify_transient(&err));
                        if attempt < self.config.max_retries {
                            tokio::time::sleep(backoff).await;
                            backoff *= 2;
                        }
                    }
                    Err(err) => {
                        return Err(CoreError::provider_fatal(classify_fatal(&err)));
                    }
                }
            }
        }

        Err(CoreError::provider_transient(
            last_transient.unwrap_or_else(|| "all providers exhausted".to_string()),
        ))
    }
}

/// Short transient descriptors; raw provider text never reaches callers.
fn classify_transient(err: &AIError) -> String {
    match err {
        AIError::RateLimited { retry_after_secs } => {
            format!("rate limited (retry after {retry_after_secs}s)")
        }
        AIError::Timeout { timeout_secs } => format!("timed out after {timeout_secs}s"),
        AIError::Unavailable { .. } => "provider unavailable".to_string(),
        AIError::Network(_) => "network failure".to_string(),
        _ => "transient provider failure".to_string(),
    }
}

fn classify_fatal(err: &AIError) -> String {
    match err {
        AIError::AuthenticationFailed => "authentication failed".to_string(),
        AIError::InvalidRequest(_) => "malformed request".to_string(),
        AIError::ContextTooLong { tokens, max } => {
            format!("context too long ({tokens} > {max} tokens)")
        }
        AIError::Parse(_) => "unreadable provider response".to_string(),
        _ => "provider failure".to_string(),
    }
}

/// Parses a structured reply, tolerating markdown code fences around the JSON.
fn parse_structured<T: DeserializeOwned>(content: &str) -> Result<T, String> {
    let json_str = extract_json_payload(content);
    serde_json::from_str(json_str).map_err(|e| format!("schema validation failed: {e}"))
}

fn extract_json_payload(content: &str) -> &str {
    let trimmed = content.trim();

    // ```json ... ``` or bare ``` fences
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim();
        }
    }

    // First balanced-looking object inside surrounding prose
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Verdict {
        sufficient: bool,
        confidence: f32,
    }

    fn fast_config() -> GatewayConfig {
        GatewayConfig {
            max_retries: 1,
            initial_backoff: Duration::from_millis(1),
            request_timeout: Duration::from_secs(5),
        }
    }

    fn gateway(provider: MockAIProvider) -> AiGateway {
        AiGateway::new(Arc::new(provider), fast_config())
    }

    #[tokio::test]
    async fn generate_returns_provider_content() {
        let gw = gateway(MockAIProvider::new().with_response("Hello there!"));
        let reply = gw
            .generate("be friendly", vec![Message::user("Hi")], &GenerateOptions::conversational())
            .await
            .unwrap();
        assert_eq!(reply.content, "Hello there!");
    }

    #[tokio::test]
    async fn transient_error_retries_then_succeeds() {
        let provider = MockAIProvider::new()
            .with_error(MockError::RateLimited { retry_after_secs: 1 })
            .with_response("after retry");
        let calls = provider.clone();

        let gw = gateway(provider);
        let reply = gw
            .generate("sys", vec![Message::user("Hi")], &GenerateOptions::conversational())
            .await
            .unwrap();

        assert_eq!(reply.content, "after retry");
        assert_eq!(calls.call_count(), 2);
    }

    #[tokio::test]
    async fn fatal_error_surfaces_immediately() {
        let provider = MockAIProvider::new()
            .with_error(MockError::AuthenticationFailed)
            .with_response("never reached");
        let calls = provider.clone();

        let gw = gateway(provider);
        let err = gw
            .generate("sys", vec![Message::user("Hi")], &GenerateOptions::conversational())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::Provider {
                failure: crate::domain::foundation::ProviderFailure::Fatal,
                ..
            }
        ));
        assert_eq!(calls.call_count(), 1);
    }

    #[tokio::test]
    async fn exhausted_primary_falls_back_to_secondary() {
        let primary = MockAIProvider::new()
            .with_error(MockError::Unavailable { message: "down".into() })
            .with_error(MockError::Unavailable { message: "still down".into() });
        let fallback = MockAIProvider::new().with_response("from fallback");

        let gw = AiGateway::new(Arc::new(primary), fast_config())
            .with_fallback(Arc::new(fallback));

        let reply = gw
            .generate("sys", vec![Message::user("Hi")], &GenerateOptions::conversational())
            .await
            .unwrap();
        assert_eq!(reply.content, "from fallback");
    }

    #[tokio::test]
    async fn all_providers_exhausted_surfaces_transient() {
        let provider = MockAIProvider::new()
            .with_error(MockError::Network { message: "reset".into() })
            .with_error(MockError::Network { message: "reset".into() });

        let gw = gateway(provider);
        let err = gw
            .generate("sys", vec![Message::user("Hi")], &GenerateOptions::conversational())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn structured_reply_parses_through_code_fence() {
        let gw = gateway(MockAIProvider::new().with_response(
            "```json\n{\"sufficient\": true, \"confidence\": 0.9}\n```",
        ));

        let (verdict, _) = gw
            .generate_structured::<Verdict>("sys", vec![], &GenerateOptions::extraction())
            .await
            .unwrap();
        assert!(verdict.sufficient);
    }

    #[tokio::test]
    async fn invalid_json_gets_one_corrective_retry() {
        let provider = MockAIProvider::new()
            .with_response("Sure! Here's my assessment in plain words.")
            .with_response("{\"sufficient\": false, \"confidence\": 0.2}");
        let calls = provider.clone();

        let gw = gateway(provider);
        let (verdict, _) = gw
            .generate_structured::<Verdict>("sys", vec![Message::user("assess")], &GenerateOptions::extraction())
            .await
            .unwrap();

        assert!(!verdict.sufficient);
        assert_eq!(calls.call_count(), 2);
    }

    #[tokio::test]
    async fn double_invalid_json_surfaces_validation_error() {
        let provider = MockAIProvider::new()
            .with_response("not json")
            .with_response("still not json");

        let gw = gateway(provider);
        let err = gw
            .generate_structured::<Verdict>("sys", vec![], &GenerateOptions::extraction())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn json_payload_extraction_handles_prose_wrapping() {
        assert_eq!(
            extract_json_payload("Here you go: {\"a\": 1} hope that helps"),
            "{\"a\": 1}"
        );
        assert_eq!(extract_json_payload("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json_payload("{\"a\":1}"), "{\"a\":1}");
    }
}
