
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info, warn};

use crate::Result;
use crate::chunking::{ChunkingConfig, chunk_text};
use crate::embeddings::Embedder;
use crate::extract::scan_directory;
use crate::ranking::rank;

/// One searchable record: a fragment of extracted text, its vector, and
/// the file it came from. Owned exclusively by the index; the whole
/// collection is replaced on every reload.
#[derive(Debug, Clone)]
pub struct IndexedFragment {
    pub text: String,
    pub vector: Vec<f32>,
    pub source: String,
}

/// Outcome of one reload pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSummary {
    pub fragment_count: usize,
    pub source_count: usize,
}

/// In-memory searchable state over a document directory.
///
/// Readers snapshot the current collection via an `Arc` clone and never
/// observe a partially rebuilt index; `reload()` builds the replacement
/// off to the side and publishes it with a single swap. Concurrent
/// reloads are serialized.
pub struct KnowledgeIndex {
    documents_dir: PathBuf,
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
    fragments: RwLock<Arc<Vec<IndexedFragment>>>,
    reload_guard: Mutex<()>,
}

impl KnowledgeIndex {
    #[inline]
    pub fn new(
        documents_dir: PathBuf,
        embedder: Arc<dyn Embedder>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            documents_dir,
            embedder,
            chunking,
            fragments: RwLock::new(Arc::new(Vec::new())),
            reload_guard: Mutex::new(()),
        }
    }

    /// Rebuild the entire fragment collection from the document directory.
    ///
    /// Ingestion is best-effort per source: a source that fails to extract
    /// is logged and skipped, a fragment that fails to embed is logged and
    /// dropped, and the reload still completes. There is no incremental
    /// diffing; the previous collection is replaced wholesale, so callers
    /// that cache derived answers must invalidate them after this returns.
    #[inline]
    pub fn reload(&self) -> Result<ReloadSummary> {
        let _guard = self.reload_guard.lock().expect("reload lock poisoned");

        let adapters = scan_directory(&self.documents_dir)?;
        debug!(
            "reloading index from {} ({} candidate sources)",
            self.documents_dir.display(),
            adapters.len()
        );

        let mut fragments: Vec<IndexedFragment> = Vec::new();
        let mut source_count = 0usize;

        for adapter in adapters {
            let source = adapter.source_name();
            let text = match adapter.extract() {
                Ok(text) => text,
                Err(e) => {
                    warn!("skipping source {}: {}", source, e);
                    continue;
                }
            };
            source_count += 1;

            for chunk in chunk_text(&text, &self.chunking) {
                match self.embedder.embed(&chunk) {
                    Ok(vector) => fragments.push(IndexedFragment {
                        text: chunk,
                        vector,
                        source: source.clone(),
                    }),
                    Err(e) => warn!("dropping fragment from {}: {}", source, e),
                }
            }
        }

        let summary = ReloadSummary {
            fragment_count: fragments.len(),
            source_count,
        };

        *self.fragments.write().expect("fragment lock poisoned") = Arc::new(fragments);

        info!(
            "index reloaded: {} fragments from {} sources ({} embedder)",
            summary.fragment_count,
            summary.source_count,
            self.embedder.name()
        );
        Ok(summary)
    }

    /// Embed the question once, rank it against every indexed fragment,
    /// and return the top `k` fragment texts in rank order.
    ///
    /// An empty index answers with an empty sequence rather than an error;
    /// embedding failures on a non-empty index surface to the caller, since
    /// an unembeddable query cannot be ranked.
    #[inline]
    pub fn retrieve(&self, question: &str, k: usize) -> Result<Vec<String>> {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(question)?;
        let ranked = rank(&query_vector, &snapshot, k)?;

        debug!(
            "retrieved {} of {} fragments for query ({} chars)",
            ranked.len(),
            snapshot.len(),
            question.len()
        );
        Ok(ranked
            .into_iter()
            .map(|entry| entry.fragment.text.clone())
            .collect())
    }

    #[inline]
    pub fn fragment_count(&self) -> usize {
        self.snapshot().len()
    }

    #[inline]
    pub fn embedder_name(&self) -> &'static str {
        self.embedder.name()
    }

    #[inline]
    pub fn documents_dir(&self) -> &std::path::Path {
        &self.documents_dir
    }

    fn snapshot(&self) -> Arc<Vec<IndexedFragment>> {
        Arc::clone(&self.fragments.read().expect("fragment lock poisoned"))
    }
}
