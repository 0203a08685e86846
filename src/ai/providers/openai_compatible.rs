// Shared client for providers speaking the OpenAI wire format.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AiProvider, GenerationOptions, ProviderError, ProviderResult};

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    provider_name: &'static str,
    embedding_model: String,
    chat_model: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EmbeddingsInput {
    Single(String),
    Batch(Vec<String>),
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: EmbeddingsInput,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        provider_name: &'static str,
        embedding_model: String,
        chat_model: String,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            provider_name,
            embedding_model,
            chat_model,
        }
    }

    async fn check_status(&self, response: reqwest::Response) -> ProviderResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: self.provider_name,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn request_embeddings(&self, input: EmbeddingsInput) -> ProviderResult<Vec<Vec<f32>>> {
        let payload = EmbeddingsRequest {
            model: self.embedding_model.clone(),
            input,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;
        let response = self.check_status(response).await?;
        let mut parsed: EmbeddingsResponse = response.json().await?;

        // Items carry their input position; order by it.
        parsed.data.sort_by_key(|item| item.index);
        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl AiProvider for OpenAiCompatibleProvider {
    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        let mut embeddings = self
            .request_embeddings(EmbeddingsInput::Single(text.to_string()))
            .await?;
        embeddings.pop().ok_or(ProviderError::InvalidResponse {
            provider: self.provider_name,
            message: "embeddings response contained no data".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self
            .request_embeddings(EmbeddingsInput::Batch(texts.to_vec()))
            .await?;
        if embeddings.len() != texts.len() {
            return Err(ProviderError::InvalidResponse {
                provider: self.provider_name,
                message: format!(
                    "requested {} embeddings, received {}",
                    texts.len(),
                    embeddings.len()
                ),
            });
        }
        Ok(embeddings)
    }

    fn supports_native_batching(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str, options: GenerationOptions) -> ProviderResult<String> {
        let payload = ChatRequest {
            model: self.chat_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;
        let response = self.check_status(response).await?;
        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ProviderError::InvalidResponse {
                provider: self.provider_name,
                message: "chat response contained no choices".to_string(),
            })
    }

    fn provider_name(&self) -> &'static str {
        self.provider_name
    }
}
