//! Guided-conversation configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Conversation orchestration configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Minimum user turns before AI completion assessment runs
    #[serde(default = "default_min_user_turns")]
    pub min_user_turns: u32,

    /// Confidence the AI verdict must reach for completion eligibility
    #[serde(default = "default_confidence_threshold")]
    pub completion_confidence_threshold: f64,

    /// Opening assistant message for a new conversation
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl ConversationConfig {
    /// Validate conversation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_user_turns == 0 {
            return Err(ValidationError::InvalidMinUserTurns);
        }
        if !(0.0..=1.0).contains(&self.completion_confidence_threshold) {
            return Err(ValidationError::InvalidConfidenceThreshold);
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            min_user_turns: default_min_user_turns(),
            completion_confidence_threshold: default_confidence_threshold(),
            greeting: default_greeting(),
        }
    }
}

fn default_min_user_turns() -> u32 {
    3
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_greeting() -> String {
    "Hi! I'd love to hear about a professional experience you're proud of. \
     What were you working on, and what was your role?"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConversationConfig::default();
        assert_eq!(config.min_user_turns, 3);
        assert_eq!(config.completion_confidence_threshold, 0.7);
        assert!(!config.greeting.is_empty());
    }

    #[test]
    fn test_zero_turn_floor_rejected() {
        let config = ConversationConfig {
            min_user_turns: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let config = ConversationConfig {
            completion_confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
