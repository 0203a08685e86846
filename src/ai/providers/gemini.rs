// Gemini provider: embedContent for embeddings, generateContent for text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AiProvider, GenerationOptions, ProviderError, ProviderResult};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const EMBEDDING_MODEL: &str = "embedding-001";
const GENERATION_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GeminiEmbedRequest {
    model: String,
    content: GeminiContent,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbedResponse {
    embedding: GeminiEmbedding,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbedding {
    values: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct GeminiGenerateRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "candidateCount")]
    candidate_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiGenerateResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

impl GeminiProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    async fn check_status(response: reqwest::Response) -> ProviderResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: "gemini",
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        let url = format!(
            "{}/models/{}:embedContent?key={}",
            self.base_url, EMBEDDING_MODEL, self.api_key
        );
        let payload = GeminiEmbedRequest {
            model: format!("models/{}", EMBEDDING_MODEL),
            content: GeminiContent {
                parts: vec![GeminiPart {
                    text: text.to_string(),
                }],
            },
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        let response = Self::check_status(response).await?;
        let parsed: GeminiEmbedResponse = response.json().await?;
        Ok(parsed.embedding.values)
    }

    async fn generate(&self, prompt: &str, options: GenerationOptions) -> ProviderResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, GENERATION_MODEL, self.api_key
        );
        let payload = GeminiGenerateRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
                candidate_count: 1,
            },
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        let response = Self::check_status(response).await?;
        let parsed: GeminiGenerateResponse = response.json().await?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty())
            .ok_or(ProviderError::InvalidResponse {
                provider: "gemini",
                message: "response contained no candidates".to_string(),
            })?;

        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_request_uses_gemini_wire_format() {
        let payload = GeminiEmbedRequest {
            model: "models/embedding-001".to_string(),
            content: GeminiContent {
                parts: vec![GeminiPart {
                    text: "hello".to_string(),
                }],
            },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["model"], "models/embedding-001");
        assert_eq!(json["content"]["parts"][0]["text"], "hello");
    }

    #[test]
    fn generation_config_uses_camel_case_keys() {
        let payload = GeminiGenerateRequest {
            contents: vec![],
            generation_config: GeminiGenerationConfig {
                temperature: 0.3,
                max_output_tokens: 800,
                candidate_count: 1,
            },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 800);
        assert_eq!(json["generationConfig"]["candidateCount"], 1);
    }

    #[test]
    fn embed_response_parses_values() {
        let raw = r#"{"embedding":{"values":[0.1,-0.2,0.3]}}"#;
        let parsed: GeminiEmbedResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.embedding.values.len(), 3);
    }

    #[test]
    fn generate_response_joins_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}]}}]}"#;
        let parsed: GeminiGenerateResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "Hello world");
    }
}
