//! Text processing for TTS: cleaning, sentence splitting and chunking.

pub mod chunker;
mod cleaner;
mod seams;

pub use chunker::{ChunkMethod, ChunkStats, ChunkingConfig, chunk, char_len};
pub use cleaner::clean_text;

use serde::Serialize;

/// Chunks of one document plus the numbers clients display with them.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkReport {
    /// Character count of the cleaned text
    pub total_chars: usize,
    pub total_chunks: usize,
    pub chunks: Vec<String>,
    pub chunk_method: ChunkMethod,
    pub avg_chunk_size: usize,
}

impl ChunkReport {
    /// Clean `text` and chunk it with the given method and bounds.
    pub fn build(text: &str, method: ChunkMethod, config: ChunkingConfig) -> Self {
        let cleaned = clean_text(text);
        let chunks = chunk(&cleaned, method, config);
        let stats = ChunkStats::from_chunks(&chunks);

        Self {
            total_chars: char_len(&cleaned),
            total_chunks: stats.total_chunks,
            chunks,
            chunk_method: method,
            avg_chunk_size: stats.avg_chunk_size,
        }
    }
}
