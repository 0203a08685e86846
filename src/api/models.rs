// Request and response models for the query API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Query submission: one document URL plus natural-language questions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryRequest {
    /// URL to the document (PDF or DOCX).
    pub documents: String,
    /// Natural language questions to answer against the document.
    pub questions: Vec<String>,
}

/// A document clause backing an answer, with a relevance explanation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Clause {
    /// Text of the matched clause or chunk.
    pub text: String,
    /// Why this clause is relevant to the question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Final answer for one question.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Answer {
    /// Direct answer to the question.
    pub answer: String,
    /// Supporting clauses retrieved from the document.
    pub clauses: Vec<Clause>,
    /// Explanation of how the answer was reached.
    pub decision_rationale: String,
}

/// Structured answers to all submitted questions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryResponse {
    pub answers: Vec<Answer>,
}
