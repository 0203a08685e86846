// RAG (Retrieval-Augmented Generation) pipeline: document parsing,
// chunking, embedding, vector retrieval and answer synthesis.

pub mod answer;
pub mod chunker;
pub mod document;
pub mod embedding;
pub mod index;
pub mod types;

pub use types::*;

use thiserror::Error;

/// Errors produced anywhere in the query pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("document download failed: {0}")]
    Download(String),

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("document contains no extractable text")]
    EmptyDocument,

    #[error("no valid chunks generated from document text")]
    NoChunks,

    #[error("embedding generation failed: {0}")]
    Embedding(String),

    #[error("vector index error: {0}")]
    Index(String),

    #[error("answer generation failed: {0}")]
    Generation(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type RagResult<T> = Result<T, RagError>;
