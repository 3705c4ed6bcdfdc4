#[cfg(test)]
mod tests;

use tracing::trace;

use crate::Result;
use crate::embeddings::Embedder;

pub const DEFAULT_DIMENSION: usize = 300;

/// Common English words that carry no retrieval signal.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "then", "is", "are", "was",
    "were", "be", "been", "being", "to", "of", "in", "on", "at", "for",
    "with", "as", "by", "it", "its", "this", "that", "these", "those",
    "from", "not", "no", "so", "do", "does", "did", "have", "has", "had",
    "will", "would", "can", "could", "should", "about", "into", "over",
    "after", "what", "which", "who", "how", "when", "where", "why", "you",
    "your", "they", "their", "there", "here", "we", "our", "i", "me", "my",
];

/// Local embedding strategy with no external dependency.
///
/// Each word token is hashed deterministically and projected onto three
/// vector dimensions with decaying weights; the accumulated vector is
/// L2-normalized. Trades semantic fidelity for zero latency and offline
/// startup.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    #[inline]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Embedder for HashEmbedder {
    #[inline]
    fn name(&self) -> &'static str {
        "hash"
    }

    #[inline]
    fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        let mut token_count = 0usize;

        for token in tokenize(text) {
            token_count += 1;
            let hash = token_hash(&token);
            for i in 0..3u64 {
                let index = usize::try_from((hash + i * 31) % self.dimension as u64)
                    .unwrap_or_default();
                vector[index] += 1.0 / (1.0 + i as f32);
            }
        }

        l2_normalize(&mut vector);
        trace!("hash-embedded {} tokens", token_count);
        Ok(vector)
    }
}

/// Lowercase word tokens longer than one character, minus stop words.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 1)
        .map(str::to_lowercase)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
}

/// Accumulating polynomial hash over characters, masked non-negative.
/// Deterministic across runs, unlike the std hasher.
fn token_hash(token: &str) -> u64 {
    token
        .chars()
        .fold(0i64, |hash, c| {
            hash.wrapping_mul(31).wrapping_add(c as i64)
        })
        .unsigned_abs()
}

/// Scale to unit length; a zero-magnitude vector is left untouched.
fn l2_normalize(vector: &mut [f32]) {
    let magnitude = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}
