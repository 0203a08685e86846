// Shared application state injected into request handlers.

use crate::ai::{create_provider, AiProvider, ProviderError};
use crate::config::Settings;
use crate::rag::embedding::EmbeddingService;
use crate::rag::index::MemoryVectorIndex;
use crate::rag::types::EmbeddingConfig;
use crate::rag::RagResult;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub embeddings: EmbeddingService,
    pub llm: EmbeddingService,
    pub indexes: Arc<IndexCache>,
}

impl AppState {
    /// Build state from settings, constructing the configured providers.
    pub fn new(settings: Settings) -> Result<Self, ProviderError> {
        let embedding_provider = create_provider(&settings.default_embedding_provider, &settings)?;
        let llm_provider = create_provider(&settings.default_llm_provider, &settings)?;
        Ok(Self::with_providers(
            settings,
            embedding_provider,
            llm_provider,
        ))
    }

    /// Build state around already-constructed providers. Tests use this
    /// to inject deterministic providers.
    pub fn with_providers(
        settings: Settings,
        embedding_provider: Arc<dyn AiProvider>,
        llm_provider: Arc<dyn AiProvider>,
    ) -> Self {
        let embedding_config = EmbeddingConfig {
            dimensions: settings.embedding_dimension,
            ..EmbeddingConfig::default()
        };
        let indexes = Arc::new(IndexCache::new(
            settings.index_data_dir.clone(),
            settings.vector_index_name.clone(),
            settings.embedding_dimension,
        ));

        Self {
            settings: Arc::new(settings),
            embeddings: EmbeddingService::new(embedding_provider, embedding_config.clone()),
            llm: EmbeddingService::new(llm_provider, embedding_config),
            indexes,
        }
    }
}

/// Vector indexes keyed by document namespace.
///
/// Each processed document gets its own namespace derived from its
/// content hash, so chunks of different documents never collide and a
/// document queried twice reuses its already-built index.
pub struct IndexCache {
    data_dir: std::path::PathBuf,
    base_name: String,
    dimension: usize,
    open: RwLock<HashMap<String, Arc<MemoryVectorIndex>>>,
}

impl IndexCache {
    pub fn new(data_dir: std::path::PathBuf, base_name: String, dimension: usize) -> Self {
        Self {
            data_dir,
            base_name,
            dimension,
            open: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch or open the index for one document namespace.
    pub async fn get_or_open(&self, namespace: &str) -> RagResult<Arc<MemoryVectorIndex>> {
        if let Some(index) = self.open.read().await.get(namespace) {
            return Ok(index.clone());
        }

        let mut open = self.open.write().await;
        // Another request may have opened it while we waited for the
        // write lock.
        if let Some(index) = open.get(namespace) {
            return Ok(index.clone());
        }

        let name = format!("{}-{}", self.base_name, namespace);
        let index =
            Arc::new(MemoryVectorIndex::open(&self.data_dir, &name, self.dimension).await?);
        open.insert(namespace.to_string(), index.clone());
        Ok(index)
    }
}
