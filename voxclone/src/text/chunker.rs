//! Text chunking for TTS processing.
//!
//! Two greedy packing strategies are offered:
//!
//! - **sentences**: sentences are packed into an accumulator until adding the
//!   next one would pass `max_chars`; a chunk is only closed once the
//!   accumulator holds at least `min_chars`. Sentences are never split, so
//!   `max_chars` is a soft bound.
//! - **paragraphs**: blank-line separated paragraphs are packed up to
//!   `max_chars`; a paragraph that is too large on its own falls back to
//!   sentence chunking.
//!
//! All lengths are counted in characters, not bytes.

use super::seams::split_into_sentences;
use serde::{Deserialize, Serialize};

/// Default `max_chars` for sentence chunking.
pub const DEFAULT_SENTENCE_MAX_CHARS: usize = 500;

/// Default `max_chars` for paragraph chunking.
pub const DEFAULT_PARAGRAPH_MAX_CHARS: usize = 800;

/// `min_chars` used by sentence chunking at the request level.
pub const DEFAULT_MIN_CHARS: usize = 100;

/// `min_chars` used when an oversized paragraph is re-chunked by sentences.
pub const PARAGRAPH_FALLBACK_MIN_CHARS: usize = 100;

const SENTENCE_SEPARATOR: &str = " ";
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Chunking strategy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMethod {
    #[default]
    Sentences,
    Paragraphs,
}

impl ChunkMethod {
    /// Parse a method name as sent by clients (`sentences` / `paragraphs`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sentences" | "sentence" => Some(Self::Sentences),
            "paragraphs" | "paragraph" => Some(Self::Paragraphs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentences => "sentences",
            Self::Paragraphs => "paragraphs",
        }
    }

    /// The `max_chars` used when the caller does not give one.
    pub fn default_max_chars(&self) -> usize {
        match self {
            Self::Sentences => DEFAULT_SENTENCE_MAX_CHARS,
            Self::Paragraphs => DEFAULT_PARAGRAPH_MAX_CHARS,
        }
    }
}

/// Size bounds for one chunking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Target upper bound per chunk (soft)
    pub max_chars: usize,
    /// Accumulated length required before a chunk may be closed (sentence mode only)
    pub min_chars: usize,
}

impl ChunkingConfig {
    /// Build the request-level configuration for a method.
    pub fn for_method(method: ChunkMethod, max_chars: Option<usize>) -> Self {
        Self {
            max_chars: max_chars.unwrap_or_else(|| method.default_max_chars()),
            min_chars: DEFAULT_MIN_CHARS,
        }
    }
}

/// Summary numbers reported alongside a chunk list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    pub total_chunks: usize,
    /// Integer mean of chunk lengths in characters, 0 when there are no chunks
    pub avg_chunk_size: usize,
}

impl ChunkStats {
    pub fn from_chunks(chunks: &[String]) -> Self {
        let total_chunks = chunks.len();
        let total_chars: usize = chunks.iter().map(|c| char_len(c)).sum();
        let avg_chunk_size = if total_chunks > 0 {
            total_chars / total_chunks
        } else {
            0
        };
        Self {
            total_chunks,
            avg_chunk_size,
        }
    }
}

/// Character count of a string.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Accumulator that tracks its own character length.
#[derive(Default)]
struct Accumulator {
    text: String,
    chars: usize,
}

impl Accumulator {
    fn push(&mut self, piece: &str, separator: &str) {
        self.text.push_str(piece);
        self.text.push_str(separator);
        self.chars += char_len(piece) + char_len(separator);
    }

    /// Take the trimmed contents, leaving the accumulator empty.
    /// Returns `None` when nothing but whitespace was accumulated.
    fn take(&mut self) -> Option<String> {
        let trimmed = self.text.trim();
        let chunk = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.text.clear();
        self.chars = 0;
        chunk
    }
}

/// Chunk text with the given method.
pub fn chunk(text: &str, method: ChunkMethod, config: ChunkingConfig) -> Vec<String> {
    match method {
        ChunkMethod::Sentences => chunk_by_sentences(text, config.max_chars, config.min_chars),
        ChunkMethod::Paragraphs => chunk_by_paragraphs(text, config.max_chars),
    }
}

/// Pack sentences into chunks of roughly `max_chars` characters.
///
/// A chunk is closed only when the next sentence would overflow `max_chars`
/// *and* the accumulator already holds `min_chars`. Until `min_chars` is
/// reached sentences keep being appended, so a chunk may end up longer than
/// `max_chars`.
pub fn chunk_by_sentences(text: &str, max_chars: usize, min_chars: usize) -> Vec<String> {
    let sentences = split_into_sentences(text);

    let mut chunks = Vec::new();
    let mut current = Accumulator::default();

    for sentence in &sentences {
        let len = char_len(sentence);
        if current.chars + len > max_chars && current.chars >= min_chars {
            // Closing an all-whitespace accumulator (min_chars == 0) emits nothing
            if let Some(chunk) = current.take() {
                chunks.push(chunk);
            }
        }
        current.push(sentence, SENTENCE_SEPARATOR);
    }

    if let Some(chunk) = current.take() {
        chunks.push(chunk);
    }

    chunks
}

/// Pack blank-line separated paragraphs into chunks of at most `max_chars`.
///
/// Paragraphs longer than `max_chars` are never emitted whole: the pending
/// chunk is flushed and the paragraph is chunked by sentences instead, with
/// a `min_chars` of [`PARAGRAPH_FALLBACK_MIN_CHARS`]. Those sentence chunks
/// keep the soft bound of [`chunk_by_sentences`] and may run past `max_chars`.
pub fn chunk_by_paragraphs(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = Accumulator::default();

    for paragraph in text.split(PARAGRAPH_SEPARATOR) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        let len = char_len(paragraph);
        if len > max_chars {
            if let Some(chunk) = current.take() {
                chunks.push(chunk);
            }
            chunks.extend(chunk_by_sentences(
                paragraph,
                max_chars,
                PARAGRAPH_FALLBACK_MIN_CHARS,
            ));
        } else if current.chars + len > max_chars {
            if let Some(chunk) = current.take() {
                chunks.push(chunk);
            }
            current.push(paragraph, PARAGRAPH_SEPARATOR);
        } else {
            current.push(paragraph, PARAGRAPH_SEPARATOR);
        }
    }

    if let Some(chunk) = current.take() {
        chunks.push(chunk);
    }

    chunks
}
