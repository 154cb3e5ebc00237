//! Splitting syllabus text into overlapping chunks for embedding.

use serde::{Deserialize, Serialize};

/// Configuration for text chunking.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 80,
        }
    }
}

/// A chunk of text cut from a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text content, trimmed.
    pub text: String,
    /// Start character position in original document.
    pub start_pos: usize,
    /// End character position in original document.
    pub end_pos: usize,
    /// Chunk index within the document.
    pub index: usize,
}

/// How far back from a hard cut to look for a sentence end.
const SENTENCE_LOOKBACK: usize = 100;

/// Split text into overlapping chunks, preferring to cut after `.`, `!` or `?`.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let text_len = chars.len();
    let chunk_size = config.chunk_size.max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while start < text_len {
        let hard_end = (start + chunk_size).min(text_len);

        let end = if hard_end < text_len {
            let search_start = hard_end.saturating_sub(SENTENCE_LOOKBACK).max(start);
            chars[search_start..hard_end]
                .iter()
                .rposition(|c| matches!(c, '.' | '!' | '?'))
                .map(|pos| search_start + pos + 1)
                .filter(|&candidate| candidate > start)
                .unwrap_or(hard_end)
        } else {
            hard_end
        };

        let piece: String = chars[start..end].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(Chunk {
                text: trimmed.to_string(),
                start_pos: start,
                end_pos: end,
                index,
            });
            index += 1;
        }

        if end >= text_len {
            break;
        }

        let next_start = end.saturating_sub(config.chunk_overlap);
        start = if next_start <= start { end } else { next_start };
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text() {
        let text = "This is a test. Another sentence here. And one more.";
        let config = ChunkConfig {
            chunk_size: 20,
            chunk_overlap: 5,
        };

        let chunks = chunk_text(text, &config);

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(!chunk.text.is_empty());
            assert_eq!(chunk.index, i);
            assert!(chunk.end_pos - chunk.start_pos <= 20);
        }
        assert_eq!(chunks[0].text, "This is a test.");
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunk_text("  UNIT I Basics  ", &ChunkConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "UNIT I Basics");
    }

    #[test]
    fn test_empty_and_blank_text() {
        assert!(chunk_text("", &ChunkConfig::default()).is_empty());
        assert!(chunk_text("   \n\n  ", &ChunkConfig::default()).is_empty());
    }

    #[test]
    fn test_overlap_larger_than_chunk_still_progresses() {
        let config = ChunkConfig {
            chunk_size: 4,
            chunk_overlap: 10,
        };
        let chunks = chunk_text("abcdefghij", &config);
        assert!(!chunks.is_empty());
        assert_eq!(chunks.last().unwrap().end_pos, 10);
    }

    #[test]
    fn test_chunk_config_default() {
        let config = ChunkConfig::default();
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 80);
    }
}
