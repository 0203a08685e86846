// Shared type definitions for the RAG pipeline.

use serde::{Deserialize, Serialize};

/// Text chunk cut from a parsed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    pub content: String,
    pub content_hash: String,
    pub chunk_index: usize,
    pub word_count: usize,
}

/// Word-window chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Words per chunk.
    pub chunk_size: usize,
    /// Words shared between neighbouring chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            chunk_overlap: 50,
        }
    }
}

/// Embedding generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub dimensions: usize,
    /// Maximum in-flight embedding requests for providers without
    /// native batching.
    pub max_concurrency: usize,
    pub timeout_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensions: 768,
            max_concurrency: 4,
            timeout_seconds: 30,
        }
    }
}

/// A retrieval hit: stored chunk plus its cosine similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub id: String,
    pub score: f32,
    pub text: String,
}
