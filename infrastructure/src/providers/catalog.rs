//! Build completion providers from `[[providers]]` configuration

use super::anthropic::AnthropicProvider;
use super::openai_compatible::OpenAiCompatibleProvider;
use crate::config::{FileProviderConfig, ProviderKind};
use review_application::CompletionProvider;
use std::sync::Arc;
use tracing::{info, warn};

/// Build providers in configuration order, reading API keys from the environment
pub fn build_providers(configs: &[FileProviderConfig]) -> Vec<Arc<dyn CompletionProvider>> {
    build_providers_with(configs, |var| std::env::var(var).ok())
}

/// Build providers with an explicit key lookup
pub fn build_providers_with<F>(
    configs: &[FileProviderConfig],
    lookup_key: F,
) -> Vec<Arc<dyn CompletionProvider>>
where
    F: Fn(&str) -> Option<String>,
{
    configs
        .iter()
        .map(|config| {
            let api_key = lookup_key(config.api_key_env()).filter(|key| !key.trim().is_empty());
            if api_key.is_none() {
                warn!(
                    provider = %config.name,
                    env = %config.api_key_env(),
                    "No API key found; requests will be sent unauthenticated"
                );
            }
            info!(
                provider = %config.name,
                kind = ?config.kind,
                model = %config.model,
                "Provider configured"
            );

            let provider: Arc<dyn CompletionProvider> = match config.kind {
                ProviderKind::OpenAi => Arc::new(
                    OpenAiCompatibleProvider::new(
                        &config.name,
                        config.base_url(),
                        &config.model,
                        api_key,
                    )
                    .with_max_tokens(config.max_tokens),
                ),
                ProviderKind::Anthropic => Arc::new(
                    AnthropicProvider::new(&config.name, config.base_url(), &config.model, api_key)
                        .with_max_tokens(config.max_tokens),
                ),
            };
            provider
        })
        .collect()
}
