// OpenAI provider, a thin wrapper over the OpenAI-compatible client.

use async_trait::async_trait;

use super::openai_compatible::OpenAiCompatibleProvider;
use super::{AiProvider, GenerationOptions, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const EMBEDDING_MODEL: &str = "text-embedding-ada-002";
const CHAT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    inner: OpenAiCompatibleProvider,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            inner: OpenAiCompatibleProvider::new(
                api_key,
                base_url,
                "openai",
                EMBEDDING_MODEL.to_string(),
                CHAT_MODEL.to_string(),
            ),
        }
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        self.inner.embed_batch(texts).await
    }

    fn supports_native_batching(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str, options: GenerationOptions) -> ProviderResult<String> {
        self.inner.generate(prompt, options).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
