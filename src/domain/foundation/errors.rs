//! Error types for the domain core.
//!
//! The taxonomy distinguishes errors a caller can recover from by choosing a
//! different operation (`InvalidState`), errors that already consumed their
//! internal fallback budget (`Provider`), and errors that never escape the
//! component that handles them (`Validation` inside summary generation and
//! job analysis).

use thiserror::Error;

/// How a provider failure should be treated by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFailure {
    /// Timeouts, rate limits, 5xx-class responses. Retried internally; if
    /// surfaced, the retry budget was exhausted.
    Transient,
    /// Authentication or malformed-request failures. Never retried.
    Fatal,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderFailure::Transient => write!(f, "transient"),
            ProviderFailure::Fatal => write!(f, "fatal"),
        }
    }
}

/// Errors surfaced by the conversation and matching core.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// An operation was requested in a lifecycle state that forbids it.
    #[error("invalid state: {operation} not allowed while {status}")]
    InvalidState {
        /// Operation that was attempted.
        operation: String,
        /// Status the entity was in.
        status: String,
    },

    /// An identity could not be resolved.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind ("conversation", "job posting", ...).
        kind: &'static str,
        /// The unresolved identity.
        id: String,
    },

    /// The caller does not own the entity it addressed.
    #[error("owner {owner} cannot access this {kind}")]
    Forbidden {
        /// Entity kind.
        kind: &'static str,
        /// The rejected owner.
        owner: String,
    },

    /// All providers failed; `failure` says whether retrying later may help.
    #[error("AI provider error ({failure}): {message}")]
    Provider {
        /// Transient or fatal classification.
        failure: ProviderFailure,
        /// Sanitized description, never raw provider text.
        message: String,
    },

    /// Input failed domain validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Raw job text could not be fetched; caller may fall back to manual input.
    #[error("scrape failed for {url}: {reason}")]
    ScrapeFailure {
        /// Source URL.
        url: String,
        /// Failure description.
        reason: String,
    },

    /// Collaborating persistence reported a failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Creates an invalid-state error.
    pub fn invalid_state(operation: impl Into<String>, status: impl Into<String>) -> Self {
        Self::InvalidState {
            operation: operation.into(),
            status: status.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(kind: &'static str, owner: impl Into<String>) -> Self {
        Self::Forbidden {
            kind,
            owner: owner.into(),
        }
    }

    /// Creates a transient provider error.
    pub fn provider_transient(message: impl Into<String>) -> Self {
        Self::Provider {
            failure: ProviderFailure::Transient,
            message: message.into(),
        }
    }

    /// Creates a fatal provider error.
    pub fn provider_fatal(message: impl Into<String>) -> Self {
        Self::Provider {
            failure: ProviderFailure::Fatal,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a scrape failure.
    pub fn scrape_failure(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ScrapeFailure {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// True when retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Provider {
                failure: ProviderFailure::Transient,
                ..
            } | CoreError::ScrapeFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_displays_operation_and_status() {
        let err = CoreError::invalid_state("append_message", "completed");
        assert_eq!(
            err.to_string(),
            "invalid state: append_message not allowed while completed"
        );
    }

    #[test]
    fn provider_errors_classify_retryability() {
        assert!(CoreError::provider_transient("rate limited").is_retryable());
        assert!(!CoreError::provider_fatal("bad api key").is_retryable());
        assert!(!CoreError::not_found("conversation", "abc").is_retryable());
        assert!(CoreError::scrape_failure("https://x", "timeout").is_retryable());
    }

    #[test]
    fn not_found_names_the_kind() {
        let err = CoreError::not_found("job posting", "42");
        assert_eq!(err.to_string(), "job posting not found: 42");
    }
}
