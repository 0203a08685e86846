// API error responses with stable error codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rag::RagError;

/// Wire shape of every error response.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiError {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub enum ErrorCode {
    // Validation errors (VALID_xxx)
    ValidInvalidInput,

    // Document errors (DOC_xxx)
    DocUnsupportedFormat,
    DocDownloadFailed,
    DocExtractionFailed,
    DocEmptyText,
    DocNoChunks,

    // Pipeline errors
    EmbeddingFailed,
    LlmGenerationFailed,
    IndexUnavailable,

    // System errors (SYSTEM_xxx)
    SystemInternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidInvalidInput => "VALID_INVALID_INPUT",
            ErrorCode::DocUnsupportedFormat => "DOC_UNSUPPORTED_FORMAT",
            ErrorCode::DocDownloadFailed => "DOC_DOWNLOAD_FAILED",
            ErrorCode::DocExtractionFailed => "DOC_EXTRACTION_FAILED",
            ErrorCode::DocEmptyText => "DOC_EMPTY_TEXT",
            ErrorCode::DocNoChunks => "DOC_NO_CHUNKS",
            ErrorCode::EmbeddingFailed => "EMBEDDING_FAILED",
            ErrorCode::LlmGenerationFailed => "LLM_GENERATION_FAILED",
            ErrorCode::IndexUnavailable => "INDEX_UNAVAILABLE",
            ErrorCode::SystemInternalError => "SYSTEM_INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ErrorCode::ValidInvalidInput | ErrorCode::DocUnsupportedFormat => {
                StatusCode::BAD_REQUEST
            }

            // 422 Unprocessable Entity
            ErrorCode::DocExtractionFailed | ErrorCode::DocEmptyText | ErrorCode::DocNoChunks => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 502 Bad Gateway - an upstream dependency failed
            ErrorCode::DocDownloadFailed
            | ErrorCode::EmbeddingFailed
            | ErrorCode::LlmGenerationFailed => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            ErrorCode::IndexUnavailable | ErrorCode::SystemInternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AppError {
    code: ErrorCode,
    message: String,
    details: Option<serde_json::Value>,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    // Convenience constructors for common errors
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidInvalidInput, message)
    }

    pub fn unsupported_format() -> Self {
        Self::new(
            ErrorCode::DocUnsupportedFormat,
            "Only PDF and DOCX URLs are supported",
        )
    }

    pub fn empty_document() -> Self {
        Self::new(
            ErrorCode::DocEmptyText,
            "Failed to extract any text from the document",
        )
    }

    pub fn no_chunks() -> Self {
        Self::new(
            ErrorCode::DocNoChunks,
            "No valid chunks generated from document text",
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SystemInternalError, message)
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        let code = match &err {
            RagError::UnsupportedFormat(_) => ErrorCode::DocUnsupportedFormat,
            RagError::Download(_) => ErrorCode::DocDownloadFailed,
            RagError::Extraction(_) => ErrorCode::DocExtractionFailed,
            RagError::EmptyDocument => ErrorCode::DocEmptyText,
            RagError::NoChunks => ErrorCode::DocNoChunks,
            RagError::Embedding(_) => ErrorCode::EmbeddingFailed,
            RagError::Index(_) => ErrorCode::IndexUnavailable,
            RagError::Generation(_) => ErrorCode::LlmGenerationFailed,
            RagError::Configuration(_) => ErrorCode::SystemInternalError,
        };
        AppError::new(code, err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ApiError {
            error: self.message,
            error_code: self.code.as_str().to_string(),
            details: self.details,
        });

        (self.code.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(
            ErrorCode::DocUnsupportedFormat.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::DocEmptyText.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::EmbeddingFailed.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ErrorCode::SystemInternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rag_errors_map_to_stable_codes() {
        let err: AppError = RagError::EmptyDocument.into();
        assert_eq!(err.code().as_str(), "DOC_EMPTY_TEXT");

        let err: AppError = RagError::Embedding("boom".to_string()).into();
        assert_eq!(err.code().as_str(), "EMBEDDING_FAILED");

        let err: AppError = RagError::Download("timeout".to_string()).into();
        assert_eq!(err.code().as_str(), "DOC_DOWNLOAD_FAILED");
    }

    #[test]
    fn details_are_omitted_unless_set() {
        let err = AppError::unsupported_format();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("details").map(|d| d.is_null()).unwrap_or(true));

        let err = AppError::invalid_input("bad").with_details(serde_json::json!({"field": "x"}));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["details"]["field"], "x");
    }
}
