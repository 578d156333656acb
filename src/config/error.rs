//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("No AI provider configured")]
    NoAiProviderConfigured,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Minimum user turns must be at least 1")]
    InvalidMinUserTurns,

    #[error("Confidence threshold must be within 0.0..=1.0")]
    InvalidConfidenceThreshold,

    #[error("Skill weights must be positive")]
    InvalidSkillWeights,

    #[error("Recency floor must be within 0.0..1.0")]
    InvalidRecencyFloor,

    #[error("Recency half-life must be positive")]
    InvalidRecencyHalfLife,

    #[error("Relevance bands must satisfy 0 < medium < high <= 1")]
    InvalidRelevanceBands,

    #[error("Fuzzy threshold must be within 0.0..=1.0")]
    InvalidFuzzyThreshold,
}
