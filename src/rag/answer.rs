// Answer synthesis: prompt construction, LLM calls, clause explanations.

use crate::ai::GenerationOptions;
use crate::api::models::Clause;
use crate::rag::embedding::EmbeddingService;
use crate::rag::types::ScoredMatch;
use crate::rag::RagResult;

/// How many retrieved chunks feed the answer prompt.
pub const ANSWER_CONTEXT_CHUNKS: usize = 3;

const EXPLANATION_SNIPPET_CHARS: usize = 500;

/// Build the grounding prompt for a question over document excerpts.
pub fn build_answer_prompt(question: &str, chunks: &[String]) -> String {
    let context = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("Chunk {}:\n{}", i + 1, chunk))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Based on the following document excerpts, please provide a comprehensive \
         answer to the question.\n\n\
         DOCUMENT EXCERPTS:\n{context}\n\n\
         QUESTION: {question}\n\n\
         Instructions:\n\
         1. Provide a direct, accurate answer based only on the information in the document excerpts\n\
         2. If the answer is not clearly found in the excerpts, state \"The document does not \
         contain sufficient information to answer this question\"\n\
         3. Cite specific parts of the document that support your answer\n\
         4. Be concise but thorough\n\n\
         ANSWER:"
    )
}

/// Build the prompt asking why one excerpt is relevant to a question.
pub fn build_explanation_prompt(question: &str, chunk: &str) -> String {
    let snippet: String = chunk.chars().take(EXPLANATION_SNIPPET_CHARS).collect();
    let ellipsis = if chunk.chars().count() > EXPLANATION_SNIPPET_CHARS {
        "..."
    } else {
        ""
    };

    format!(
        "Explain in 1-2 sentences why this document excerpt is relevant to the \
         question: \"{question}\"\n\n\
         Document excerpt:\n{snippet}{ellipsis}\n\n\
         Keep the explanation concise and specific."
    )
}

/// Generate an answer plus a decision rationale for one question.
///
/// Only the top `ANSWER_CONTEXT_CHUNKS` retrieved chunks enter the
/// prompt; the rationale records the provider and how many chunks the
/// prompt actually carried.
pub async fn generate_answer(
    service: &EmbeddingService,
    question: &str,
    relevant_chunks: &[String],
    options: GenerationOptions,
) -> RagResult<(String, String)> {
    let context: Vec<String> = relevant_chunks
        .iter()
        .take(ANSWER_CONTEXT_CHUNKS)
        .cloned()
        .collect();
    let prompt = build_answer_prompt(question, &context);

    let answer = service.generate(&prompt, options).await?;
    let rationale = format!(
        "Answer generated using {} LLM based on {} most relevant document sections \
         retrieved through semantic vector search.",
        service.provider().provider_name().to_uppercase(),
        context.len()
    );

    Ok((answer.trim().to_string(), rationale))
}

/// Produce a clause per retrieved chunk with a relevance explanation.
///
/// Explanation generation is best-effort: when the LLM call fails the
/// clause falls back to a score-only explanation rather than failing
/// the whole request.
pub async fn explain_clauses(
    service: &EmbeddingService,
    question: &str,
    matches: &[ScoredMatch],
) -> Vec<Clause> {
    let options = GenerationOptions {
        max_tokens: 150,
        temperature: 0.2,
    };

    let mut clauses = Vec::with_capacity(matches.len());
    for matched in matches {
        let prompt = build_explanation_prompt(question, &matched.text);
        let explanation = match service.generate(&prompt, options).await {
            Ok(text) => format!("Relevance score: {:.3} - {}", matched.score, text.trim()),
            Err(error) => {
                tracing::warn!(%error, "clause explanation failed, using fallback");
                format!(
                    "Semantic similarity score: {:.3} - This section contains content \
                     related to your query.",
                    matched.score
                )
            }
        };

        clauses.push(Clause {
            text: matched.text.clone(),
            explanation: Some(explanation),
        });
    }
    clauses
}
