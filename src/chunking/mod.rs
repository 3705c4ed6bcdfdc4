
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for fragment chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum fragment size in characters
    pub max_fragment_chars: usize,
    /// Number of trailing characters carried over into the next fragment
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_fragment_chars: 500,
            overlap_chars: 50,
        }
    }
}

/// Split text into sentence-aligned fragments bounded by
/// `max_fragment_chars`, where consecutive fragments from the same text
/// share an overlapping tail of `overlap_chars` characters.
///
/// Sentences are never split mid-way: a fragment is flushed before the
/// sentence that would push it past the bound, so a single sentence longer
/// than the bound becomes its own over-long fragment. Empty or
/// whitespace-only input yields no fragments.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let mut fragments = Vec::new();
    let mut buffer = String::new();

    for sentence in sentences {
        let separator = usize::from(!buffer.is_empty());
        if char_len(&buffer) + separator + char_len(sentence) <= config.max_fragment_chars {
            if !buffer.is_empty() {
                buffer.push(' ');
            }
            buffer.push_str(sentence);
            continue;
        }

        let flushed = buffer.trim().to_string();
        buffer.clear();

        if !flushed.is_empty() {
            // Seed the next buffer with the tail of the flushed fragment so
            // adjacent fragments stay semantically continuous at the cut.
            // A fragment shorter than the overlap window seeds nothing.
            if char_len(&flushed) >= config.overlap_chars {
                buffer.push_str(tail_chars(&flushed, config.overlap_chars));
                buffer.push(' ');
            }
            fragments.push(flushed);
        }

        buffer.push_str(sentence);
    }

    let last = buffer.trim();
    if !last.is_empty() {
        fragments.push(last.to_string());
    }

    debug!(
        "Chunked {} chars into {} fragments",
        text.len(),
        fragments.len()
    );

    fragments
}

/// Split text into sentences on `.`, `!` or `?` followed by whitespace,
/// keeping the punctuation with its sentence. Trailing text without a
/// sentence terminator forms the final sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?')
            && chars.peek().is_none_or(|(_, next)| next.is_whitespace())
        {
            let end = i + c.len_utf8();
            let sentence = text
                .get(start..end)
                .map(str::trim)
                .unwrap_or_default();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let tail = text.get(start..).map(str::trim).unwrap_or_default();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The last `count` characters of `s` as a subslice.
fn tail_chars(s: &str, count: usize) -> &str {
    let total = char_len(s);
    if total <= count {
        return s;
    }
    let skip = total - count;
    let start = s
        .char_indices()
        .nth(skip)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.get(start..).unwrap_or_default()
}
