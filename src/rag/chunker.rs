// Word-window text chunking for retrieval.

use crate::rag::types::{ChunkingConfig, TextChunk};
use crate::rag::{RagError, RagResult};
use sha2::{Digest, Sha256};

/// Split text into overlapping word windows.
///
/// Windows hold `chunk_size` words and advance by
/// `chunk_size - chunk_overlap`, so neighbouring chunks share
/// `chunk_overlap` words of context. The final window may be short.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> RagResult<Vec<TextChunk>> {
    validate_config(config)?;

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let step = config.chunk_size - config.chunk_overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while start < words.len() {
        let end = (start + config.chunk_size).min(words.len());
        let content = words[start..end].join(" ");
        chunks.push(TextChunk {
            content_hash: content_hash(&content),
            word_count: end - start,
            chunk_index: index,
            content,
        });
        index += 1;
        start += step;
    }

    Ok(chunks)
}

fn validate_config(config: &ChunkingConfig) -> RagResult<()> {
    if config.chunk_size == 0 {
        return Err(RagError::Configuration(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    if config.chunk_overlap >= config.chunk_size {
        return Err(RagError::Configuration(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            config.chunk_overlap, config.chunk_size
        )));
    }
    Ok(())
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex_encode(&hasher.finalize()[..16])
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_text_produces_no_chunks() {
        let chunks = chunk_text("", &ChunkingConfig::default()).unwrap();
        assert!(chunks.is_empty());

        let chunks = chunk_text("   \n\t  ", &ChunkingConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let text = words(10);
        let chunks = chunk_text(&text, &ChunkingConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].word_count, 10);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].content, text);
    }

    #[test]
    fn windows_advance_by_size_minus_overlap() {
        let config = ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 20,
        };
        let chunks = chunk_text(&words(250), &config).unwrap();
        // Starts at 0, 80, 160, 240.
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].word_count, 100);
        assert_eq!(chunks[1].word_count, 100);
        assert_eq!(chunks[3].word_count, 10);
        assert!(chunks[0].content.ends_with("w99"));
        assert!(chunks[1].content.starts_with("w80"));
    }

    #[test]
    fn neighbouring_chunks_share_overlap_words() {
        let config = ChunkingConfig {
            chunk_size: 10,
            chunk_overlap: 3,
        };
        let chunks = chunk_text(&words(20), &config).unwrap();
        let first: Vec<&str> = chunks[0].content.split(' ').collect();
        let second: Vec<&str> = chunks[1].content.split(' ').collect();
        assert_eq!(&first[7..], &second[..3]);
    }

    #[test]
    fn chunk_hashes_are_stable_and_distinct() {
        let config = ChunkingConfig {
            chunk_size: 5,
            chunk_overlap: 1,
        };
        let a = chunk_text(&words(12), &config).unwrap();
        let b = chunk_text(&words(12), &config).unwrap();
        assert_eq!(a[0].content_hash, b[0].content_hash);
        assert_ne!(a[0].content_hash, a[1].content_hash);
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        let config = ChunkingConfig {
            chunk_size: 50,
            chunk_overlap: 50,
        };
        assert!(matches!(
            chunk_text("some text", &config),
            Err(RagError::Configuration(_))
        ));
    }
}
