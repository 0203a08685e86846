//! External AI provider implementations.
//!
//! Each provider exposes embedding generation and text generation over
//! its own HTTP API: Gemini natively, OpenAI and DeepSeek through the
//! OpenAI-compatible surface.

pub mod deepseek;
pub mod gemini;
pub mod openai;
pub mod openai_compatible;

pub use deepseek::DeepSeekProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use openai_compatible::OpenAiCompatibleProvider;

use crate::config::Settings;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed {provider} response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },

    #[error("{0} API key is not configured")]
    MissingApiKey(&'static str),

    #[error("provider '{0}' is not available or its API key is missing")]
    UnavailableProvider(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Sampling controls for text generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
        }
    }
}

/// Common surface over the external AI providers.
#[async_trait]
pub trait AiProvider: Send + Sync + std::fmt::Debug {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>>;

    /// Generate embeddings for several texts.
    ///
    /// The default forwards one request per text; providers with a
    /// native batch endpoint override this.
    async fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Whether `embed_batch` is a single API call.
    fn supports_native_batching(&self) -> bool {
        false
    }

    /// Generate a text completion for a prompt.
    async fn generate(&self, prompt: &str, options: GenerationOptions) -> ProviderResult<String>;

    fn provider_name(&self) -> &'static str;
}

/// Build a provider by name, requiring its API key to be configured.
pub fn create_provider(name: &str, settings: &Settings) -> ProviderResult<Arc<dyn AiProvider>> {
    match name {
        "gemini" => {
            let key = settings
                .gemini_api_key
                .clone()
                .ok_or(ProviderError::MissingApiKey("gemini"))?;
            Ok(Arc::new(GeminiProvider::new(key, None)))
        }
        "openai" => {
            let key = settings
                .openai_api_key
                .clone()
                .ok_or(ProviderError::MissingApiKey("openai"))?;
            Ok(Arc::new(OpenAiProvider::new(key, None)))
        }
        "deepseek" => {
            let key = settings
                .deepseek_api_key
                .clone()
                .ok_or(ProviderError::MissingApiKey("deepseek"))?;
            Ok(Arc::new(DeepSeekProvider::new(key, None)))
        }
        other => Err(ProviderError::UnavailableProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_rejected() {
        let settings = Settings::default();
        let err = create_provider("cohere", &settings).unwrap_err();
        assert!(matches!(err, ProviderError::UnavailableProvider(_)));
    }

    #[test]
    fn provider_without_key_is_rejected() {
        let settings = Settings::default();
        let err = create_provider("gemini", &settings).unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey("gemini")));
    }

    #[test]
    fn provider_with_key_is_built() {
        let settings = Settings {
            gemini_api_key: Some("k".to_string()),
            ..Settings::default()
        };
        let provider = create_provider("gemini", &settings).unwrap();
        assert_eq!(provider.provider_name(), "gemini");
    }
}
