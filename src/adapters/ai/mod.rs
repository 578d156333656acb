//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port for various LLM providers.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `AnthropicProvider` - Anthropic Claude models
//! - `OpenAIProvider` - OpenAI GPT models
//!
//! [`build_gateway`] wires configured providers into an [`AiGateway`] with
//! the primary/fallback ordering from [`AiConfig`].

mod anthropic_provider;
mod mock_provider;
mod openai_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};

use std::sync::Arc;

use crate::config::{AiConfig, AiProvider as ProviderKind, ValidationError};
use crate::domain::gateway::{AiGateway, GatewayConfig};
use crate::ports::AIProvider;

/// Builds a gateway from provider configuration.
///
/// The primary provider is tried first; if a fallback provider is configured
/// and keyed, it is appended to the failover chain.
pub fn build_gateway(config: &AiConfig) -> Result<AiGateway, ValidationError> {
    config.validate()?;

    let gateway_config = GatewayConfig {
        max_retries: config.max_retries,
        initial_backoff: config.initial_backoff(),
        request_timeout: config.timeout(),
    };

    let mut gateway = AiGateway::new(build_provider(config, config.primary_provider)?, gateway_config);

    if let Some(kind) = config.fallback_provider {
        if kind != config.primary_provider {
            gateway = gateway.with_fallback(build_provider(config, kind)?);
        }
    }

    Ok(gateway)
}

fn build_provider(
    config: &AiConfig,
    kind: ProviderKind,
) -> Result<Arc<dyn AIProvider>, ValidationError> {
    match kind {
        ProviderKind::Anthropic => {
            let key = config
                .anthropic_api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or(ValidationError::MissingRequired("ANTHROPIC_API_KEY"))?;
            Ok(Arc::new(AnthropicProvider::new(
                AnthropicConfig::new(key).with_timeout(config.timeout()),
            )))
        }
        ProviderKind::OpenAI => {
            let key = config
                .openai_api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or(ValidationError::MissingRequired("OPENAI_API_KEY"))?;
            Ok(Arc::new(OpenAIProvider::new(
                OpenAIConfig::new(key).with_timeout(config.timeout()),
            )))
        }
    }
}
