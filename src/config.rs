//! Application configuration, loaded from the process environment.
//!
//! The container runtime injects the environment file; nothing here
//! reads files directly.

use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Settings {
    // API keys
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,

    // Server
    pub port: u16,
    pub debug: bool,

    // Vector index
    pub vector_index_name: String,
    pub index_data_dir: PathBuf,
    pub embedding_dimension: usize,

    // Document processing
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k_results: usize,

    // Providers
    pub default_llm_provider: String,
    pub default_embedding_provider: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            openai_api_key: None,
            deepseek_api_key: None,
            port: DEFAULT_PORT,
            debug: false,
            vector_index_name: "policy-index".to_string(),
            index_data_dir: PathBuf::from("."),
            embedding_dimension: 768,
            chunk_size: 300,
            chunk_overlap: 50,
            top_k_results: 5,
            default_llm_provider: "gemini".to_string(),
            default_embedding_provider: "gemini".to_string(),
            max_tokens: 800,
            temperature: 0.3,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Self {
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            deepseek_api_key: env_opt("DEEPSEEK_API_KEY"),
            port: env_or("PORT", defaults.port),
            debug: std::env::var("DEBUG")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.debug),
            vector_index_name: env_or("VECTOR_INDEX_NAME", defaults.vector_index_name),
            index_data_dir: env_opt("INDEX_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.index_data_dir),
            embedding_dimension: env_or("EMBEDDING_DIMENSION", defaults.embedding_dimension),
            chunk_size: env_or("CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: env_or("CHUNK_OVERLAP", defaults.chunk_overlap),
            top_k_results: env_or("TOP_K_RESULTS", defaults.top_k_results),
            default_llm_provider: env_or("DEFAULT_LLM_PROVIDER", defaults.default_llm_provider),
            default_embedding_provider: env_or(
                "DEFAULT_EMBEDDING_PROVIDER",
                defaults.default_embedding_provider,
            ),
            max_tokens: env_or("MAX_TOKENS", defaults.max_tokens),
            temperature: env_or("TEMPERATURE", defaults.temperature),
        }
    }

    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.gemini_api_key.is_none()
            && self.openai_api_key.is_none()
            && self.deepseek_api_key.is_none()
        {
            errors.push(
                "at least one LLM API key must be set \
                 (GEMINI_API_KEY, OPENAI_API_KEY, or DEEPSEEK_API_KEY)"
                    .to_string(),
            );
        }

        if self.chunk_size == 0 {
            errors.push("CHUNK_SIZE must be greater than zero".to_string());
        } else if self.chunk_overlap >= self.chunk_size {
            errors.push(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }

        if self.embedding_dimension == 0 {
            errors.push("EMBEDDING_DIMENSION must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(format!("configuration errors: {}", errors.join(", ")))
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_conventions() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.chunk_size, 300);
        assert_eq!(settings.chunk_overlap, 50);
        assert_eq!(settings.top_k_results, 5);
        assert_eq!(settings.embedding_dimension, 768);
        assert_eq!(settings.default_embedding_provider, "gemini");
        assert_eq!(settings.vector_index_name, "policy-index");
    }

    #[test]
    fn validate_requires_an_api_key() {
        let settings = Settings::default();
        let err = settings.validate().unwrap_err();
        assert!(err.contains("API key"));

        let settings = Settings {
            deepseek_api_key: Some("k".to_string()),
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_chunking() {
        let settings = Settings {
            gemini_api_key: Some("k".to_string()),
            chunk_size: 50,
            chunk_overlap: 50,
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.contains("CHUNK_OVERLAP"));
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let settings = Settings {
            chunk_size: 0,
            embedding_dimension: 0,
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.contains("API key"));
        assert!(err.contains("CHUNK_SIZE"));
        assert!(err.contains("EMBEDDING_DIMENSION"));
    }
}
