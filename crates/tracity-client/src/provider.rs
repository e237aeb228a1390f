//! Completion provider selection and dynamic dispatch.
//!
//! [`CompletionProvider`] uses `impl Future` return types, which makes it not
//! object-safe, so runtime selection goes through [`CompletionProviderEnum`].
//!
//! # Usage
//!
//! ```no_run
//! use tracity_client::provider::CompletionProviderEnum;
//! use tracity_core::traits::CompletionProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = CompletionProviderEnum::openai("sk-your-api-key", None)?;
//! println!("Using {} ({})", provider.name(), provider.model());
//! let reply = provider.complete_json("Respond with JSON.", "Describe [1, 2]").await?;
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use tracity_core::LlmProviderType;
use tracity_core::error::AppError;
use tracity_core::traits::CompletionProvider;

use crate::{GeminiClient, OpenAIClient};

/// Unified completion provider that wraps concrete implementations.
#[derive(Clone)]
pub enum CompletionProviderEnum {
    OpenAI(OpenAIClient),
    Gemini(GeminiClient),
    /// No provider configured. Every call fails, so callers use their fallback.
    Disabled,
}

impl CompletionProviderEnum {
    /// Creates an OpenAI provider, optionally with a specific model.
    pub fn openai(api_key: &str, model: Option<&str>) -> Result<Self, AppError> {
        let client = match model {
            Some(m) => OpenAIClient::with_model(api_key, m)?,
            None => OpenAIClient::new(api_key)?,
        };
        Ok(Self::OpenAI(client))
    }

    /// Creates a Gemini provider, optionally with a specific model.
    pub fn gemini(api_key: &str, model: Option<&str>) -> Result<Self, AppError> {
        let client = match model {
            Some(m) => GeminiClient::with_model(api_key, m)?,
            None => GeminiClient::new(api_key)?,
        };
        Ok(Self::Gemini(client))
    }

    /// Builds the provider selected by configuration.
    ///
    /// A missing API key disables completions instead of failing startup;
    /// insights then use the static fallback.
    pub fn from_config(
        provider: LlmProviderType,
        openai_key: Option<&str>,
        gemini_key: Option<&str>,
        model: Option<&str>,
    ) -> Result<Self, AppError> {
        let key = match provider {
            LlmProviderType::OpenAI => openai_key,
            LlmProviderType::Gemini => gemini_key,
            LlmProviderType::None => return Ok(Self::Disabled),
        };

        match key.filter(|k| !k.trim().is_empty()) {
            Some(key) if provider == LlmProviderType::OpenAI => Self::openai(key, model),
            Some(key) => Self::gemini(key, model),
            None => {
                tracing::warn!(
                    "No API key for completion provider '{}'; insights will use the fallback",
                    provider
                );
                Ok(Self::Disabled)
            }
        }
    }
}

impl CompletionProvider for CompletionProviderEnum {
    fn name(&self) -> &'static str {
        match self {
            Self::OpenAI(c) => c.name(),
            Self::Gemini(c) => c.name(),
            Self::Disabled => "none",
        }
    }

    fn model(&self) -> &str {
        match self {
            Self::OpenAI(c) => c.model(),
            Self::Gemini(c) => c.model(),
            Self::Disabled => "none",
        }
    }

    fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    async fn complete_json(&self, system: &str, prompt: &str) -> Result<Value, AppError> {
        match self {
            Self::OpenAI(c) => c.complete_json(system, prompt).await,
            Self::Gemini(c) => c.complete_json(system, prompt).await,
            Self::Disabled => Err(AppError::ConfigError(
                "No completion provider configured".to_string(),
            )),
        }
    }
}
