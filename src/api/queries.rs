// The document query endpoint: parse, chunk, embed, retrieve, answer.

use axum::{extract::State, Json};
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::ai::GenerationOptions;
use crate::api::errors::AppError;
use crate::api::models::{Answer, QueryRequest, QueryResponse};
use crate::rag::index::{IndexEntry, VectorIndex};
use crate::rag::types::ChunkingConfig;
use crate::rag::{answer, chunker, document};
use crate::state::AppState;

/// `POST /api/v1/hackrx/run`
pub async fn run_query(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let doc_url = &payload.documents;
    let kind = document::DocumentKind::from_url(doc_url).ok_or_else(AppError::unsupported_format)?;

    tracing::info!(
        %request_id,
        doc_type = kind.as_str(),
        questions = payload.questions.len(),
        "processing query request"
    );

    // Download and identify the document before any parsing work.
    let bytes = document::fetch_document(doc_url).await?;
    let namespace = document_namespace(&bytes);

    let index = state.indexes.get_or_open(&namespace).await?;

    if index.len().await == 0 {
        // First sighting of this document: extract, chunk, embed, index.
        let text = document::extract_text(kind, bytes).await?;
        if text.trim().is_empty() {
            return Err(AppError::empty_document());
        }

        let chunking = ChunkingConfig {
            chunk_size: state.settings.chunk_size,
            chunk_overlap: state.settings.chunk_overlap,
        };
        let chunks = chunker::chunk_text(&text, &chunking)?;
        if chunks.is_empty() {
            return Err(AppError::no_chunks());
        }
        tracing::debug!(chunks = chunks.len(), namespace = %namespace, "chunked document");

        let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = state.embeddings.embed_chunks(&contents).await?;

        let entries = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, vector)| IndexEntry {
                id: chunk.chunk_index.to_string(),
                vector,
                text: chunk.content.clone(),
            })
            .collect();
        index.upsert(entries).await?;
    } else {
        tracing::debug!(namespace = %namespace, "reusing indexed document");
    }

    let generation = GenerationOptions {
        max_tokens: state.settings.max_tokens,
        temperature: state.settings.temperature,
    };

    let mut results = Vec::with_capacity(payload.questions.len());
    for question in &payload.questions {
        if question.trim().is_empty() {
            return Err(AppError::invalid_input("questions must not be empty")
                .with_details(json!({ "field": "questions" })));
        }

        let query_embedding = state.embeddings.embed_query(question).await?;
        let matches = index
            .query(&query_embedding, state.settings.top_k_results)
            .await?;

        let relevant_chunks: Vec<String> = matches.iter().map(|m| m.text.clone()).collect();
        let (answer_text, rationale) =
            answer::generate_answer(&state.llm, question, &relevant_chunks, generation).await?;
        let clauses = answer::explain_clauses(&state.llm, question, &matches).await;

        results.push(Answer {
            answer: answer_text,
            clauses,
            decision_rationale: rationale,
        });
    }

    Ok(Json(QueryResponse { answers: results }))
}

/// Health probe body shared by `/health` and `/api/v1/health`.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Namespace for a document: the hex prefix of its content hash.
fn document_namespace(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    chunker::hex_encode(&hasher.finalize()[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_is_stable_and_content_addressed() {
        let a = document_namespace(b"document bytes");
        let b = document_namespace(b"document bytes");
        let c = document_namespace(b"other bytes");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
