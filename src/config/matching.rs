//! Match-scoring configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::matching::MatchParams;

/// Match scoring configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Weight of required-skill overlap
    #[serde(default = "default_required_weight")]
    pub required_weight: f64,

    /// Weight of preferred-skill overlap
    #[serde(default = "default_preferred_weight")]
    pub preferred_weight: f64,

    /// Weight of tools/technologies overlap
    #[serde(default = "default_tools_weight")]
    pub tools_weight: f64,

    /// Discount for free-text keyword matches
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    /// Similarity threshold for fuzzy skill-name matching
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Recency decay half-life in days
    #[serde(default = "default_half_life_days")]
    pub recency_half_life_days: f64,

    /// Lower bound of the recency multiplier
    #[serde(default = "default_recency_floor")]
    pub recency_floor: f64,

    /// Scores at or above this are high relevance
    #[serde(default = "default_high_band")]
    pub high_band: f64,

    /// Scores at or above this (below high) are medium relevance
    #[serde(default = "default_medium_band")]
    pub medium_band: f64,
}

impl MatchingConfig {
    /// Validate matching configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.required_weight <= 0.0 || self.preferred_weight <= 0.0 || self.tools_weight <= 0.0
        {
            return Err(ValidationError::InvalidSkillWeights);
        }
        if !(0.0..1.0).contains(&self.recency_floor) {
            return Err(ValidationError::InvalidRecencyFloor);
        }
        if self.recency_half_life_days <= 0.0 {
            return Err(ValidationError::InvalidRecencyHalfLife);
        }
        if !(self.medium_band > 0.0 && self.medium_band < self.high_band && self.high_band <= 1.0)
        {
            return Err(ValidationError::InvalidRelevanceBands);
        }
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ValidationError::InvalidFuzzyThreshold);
        }
        Ok(())
    }

    /// Convert into scorer parameters
    pub fn to_params(&self) -> MatchParams {
        MatchParams {
            required_weight: self.required_weight,
            preferred_weight: self.preferred_weight,
            tools_weight: self.tools_weight,
            keyword_weight: self.keyword_weight,
            fuzzy_threshold: self.fuzzy_threshold,
            recency_half_life_days: self.recency_half_life_days,
            recency_floor: self.recency_floor,
            high_band: self.high_band,
            medium_band: self.medium_band,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            required_weight: default_required_weight(),
            preferred_weight: default_preferred_weight(),
            tools_weight: default_tools_weight(),
            keyword_weight: default_keyword_weight(),
            fuzzy_threshold: default_fuzzy_threshold(),
            recency_half_life_days: default_half_life_days(),
            recency_floor: default_recency_floor(),
            high_band: default_high_band(),
            medium_band: default_medium_band(),
        }
    }
}

fn default_required_weight() -> f64 {
    0.6
}

fn default_preferred_weight() -> f64 {
    0.3
}

fn default_tools_weight() -> f64 {
    0.1
}

fn default_keyword_weight() -> f64 {
    0.5
}

fn default_fuzzy_threshold() -> f64 {
    0.8
}

fn default_half_life_days() -> f64 {
    730.0
}

fn default_recency_floor() -> f64 {
    0.3
}

fn default_high_band() -> f64 {
    0.7
}

fn default_medium_band() -> f64 {
    0.4
}
