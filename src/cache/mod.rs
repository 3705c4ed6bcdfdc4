#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

/// Concurrent memo of previously generated answers, keyed by trimmed
/// question text.
///
/// Entries live until the next wholesale `clear()`, which the ingestion
/// path must invoke right after a successful index reload: an answer
/// computed against old fragments must never outlive the index version it
/// was computed from.
#[derive(Debug, Default)]
pub struct AnswerCache {
    entries: RwLock<HashMap<String, String>>,
}

impl AnswerCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously stored answer. Exact match on the normalized
    /// question; no fuzzy matching.
    #[inline]
    pub fn get(&self, question: &str) -> Option<String> {
        self.entries
            .read()
            .expect("cache lock poisoned")
            .get(question.trim())
            .cloned()
    }

    /// Store an answer, overwriting any previous entry for the question.
    #[inline]
    pub fn put(&self, question: &str, answer: String) {
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(question.trim().to_string(), answer);
    }

    /// Drop every entry.
    #[inline]
    pub fn clear(&self) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        let dropped = entries.len();
        entries.clear();
        debug!("cleared {} cached answers", dropped);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
