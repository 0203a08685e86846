// Embedding generation over an AI provider, with batching controls.

use crate::ai::{AiProvider, GenerationOptions};
use crate::rag::types::EmbeddingConfig;
use crate::rag::{RagError, RagResult};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{timeout, Duration};

/// Embedding front-end: validates input, bounds concurrency, applies a
/// per-call timeout, and routes to the provider's batch endpoint when
/// one exists.
#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn AiProvider>,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn AiProvider>, config: EmbeddingConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &Arc<dyn AiProvider> {
        &self.provider
    }

    /// Embed one query text.
    pub async fn embed_query(&self, text: &str) -> RagResult<Vec<f32>> {
        self.validate_text(text)?;
        self.with_timeout(self.provider.embed(text)).await
    }

    /// Embed all chunks of a document, preserving input order.
    pub async fn embed_chunks(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        for text in texts {
            self.validate_text(text)?;
        }

        if self.provider.supports_native_batching() {
            return self.with_timeout(self.provider.embed_batch(texts)).await;
        }

        // One request per chunk, at most `max_concurrency` in flight.
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = Vec::with_capacity(texts.len());

        for text in texts {
            let provider = self.provider.clone();
            let semaphore = semaphore.clone();
            let text = text.clone();
            let deadline = Duration::from_secs(self.config.timeout_seconds);

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| RagError::Embedding(format!("semaphore closed: {}", e)))?;
                match timeout(deadline, provider.embed(&text)).await {
                    Ok(result) => result.map_err(|e| RagError::Embedding(e.to_string())),
                    Err(_) => Err(RagError::Embedding(format!(
                        "embedding request timed out after {} seconds",
                        deadline.as_secs()
                    ))),
                }
            }));
        }

        let mut embeddings = Vec::with_capacity(tasks.len());
        for task in tasks {
            let vector = task
                .await
                .map_err(|e| RagError::Embedding(format!("embedding task failed: {}", e)))??;
            embeddings.push(vector);
        }
        Ok(embeddings)
    }

    /// Generate text through the same provider handle. Used by the
    /// answer stage so one configured provider serves both roles.
    pub async fn generate(&self, prompt: &str, options: GenerationOptions) -> RagResult<String> {
        self.provider
            .generate(prompt, options)
            .await
            .map_err(|e| RagError::Generation(e.to_string()))
    }

    fn validate_text(&self, text: &str) -> RagResult<()> {
        if text.trim().is_empty() {
            return Err(RagError::Embedding("text cannot be empty".to_string()));
        }
        Ok(())
    }

    async fn with_timeout<F, T>(&self, future: F) -> RagResult<T>
    where
        F: std::future::Future<Output = Result<T, crate::ai::ProviderError>>,
    {
        let deadline = Duration::from_secs(self.config.timeout_seconds);
        match timeout(deadline, future).await {
            Ok(result) => result.map_err(|e| RagError::Embedding(e.to_string())),
            Err(_) => Err(RagError::Embedding(format!(
                "embedding request timed out after {} seconds",
                deadline.as_secs()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic provider: the embedding encodes the text length.
    #[derive(Debug)]
    struct StubProvider {
        calls: AtomicUsize,
        batching: bool,
    }

    impl StubProvider {
        fn new(batching: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                batching,
            }
        }
    }

    #[async_trait]
    impl AiProvider for StubProvider {
        async fn embed(&self, text: &str) -> crate::ai::ProviderResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(
            &self,
            texts: &[String],
        ) -> crate::ai::ProviderResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn supports_native_batching(&self) -> bool {
            self.batching
        }

        async fn generate(
            &self,
            _prompt: &str,
            _options: GenerationOptions,
        ) -> crate::ai::ProviderResult<String> {
            Ok("generated".to_string())
        }

        fn provider_name(&self) -> &'static str {
            "stub"
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn chunk_embeddings_preserve_order() {
        let provider = Arc::new(StubProvider::new(false));
        let service = EmbeddingService::new(provider, EmbeddingConfig::default());

        let embeddings = service
            .embed_chunks(&texts(&["a", "bb", "ccc"]))
            .await
            .unwrap();
        assert_eq!(embeddings[0][0], 1.0);
        assert_eq!(embeddings[1][0], 2.0);
        assert_eq!(embeddings[2][0], 3.0);
    }

    #[tokio::test]
    async fn native_batching_makes_one_call() {
        let provider = Arc::new(StubProvider::new(true));
        let service = EmbeddingService::new(provider.clone(), EmbeddingConfig::default());

        service
            .embed_chunks(&texts(&["a", "bb", "ccc"]))
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn per_text_providers_get_one_call_per_chunk() {
        let provider = Arc::new(StubProvider::new(false));
        let service = EmbeddingService::new(provider.clone(), EmbeddingConfig::default());

        service
            .embed_chunks(&texts(&["a", "bb", "ccc"]))
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let provider = Arc::new(StubProvider::new(false));
        let service = EmbeddingService::new(provider, EmbeddingConfig::default());

        assert!(matches!(
            service.embed_query("   ").await,
            Err(RagError::Embedding(_))
        ));
        assert!(matches!(
            service.embed_chunks(&texts(&["ok", ""])).await,
            Err(RagError::Embedding(_))
        ));
    }

    #[tokio::test]
    async fn empty_chunk_list_embeds_nothing() {
        let provider = Arc::new(StubProvider::new(true));
        let service = EmbeddingService::new(provider.clone(), EmbeddingConfig::default());
        assert!(service.embed_chunks(&[]).await.unwrap().is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
