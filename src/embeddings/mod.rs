// Embeddings module
// One strategy is selected at construction and fixed for the process
// lifetime; vectors from different strategies are never comparable.

pub mod cohere;
pub mod hash;
pub mod openai;

use std::sync::Arc;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::ranking::cosine_similarity;
use crate::{EngineError, Result};

pub use cohere::CohereEmbedder;
pub use hash::HashEmbedder;
pub use openai::OpenAiEmbedder;

/// A strategy for turning text into a fixed-length vector.
///
/// All vectors produced by one instance share the same dimensionality.
/// `similarity` is identical across strategies (pure cosine); only `embed`
/// differs.
pub trait Embedder: Send + Sync {
    /// Strategy name as it appears in configuration and logs.
    fn name(&self) -> &'static str;

    /// Dimensionality of the vectors this strategy produces.
    fn dimension(&self) -> usize;

    /// Embed a single text into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Cosine similarity between two vectors produced by this strategy.
    #[inline]
    fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        cosine_similarity(a, b)
    }
}

/// Instantiate the embedding strategy selected by configuration.
#[inline]
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.provider {
        EmbeddingProvider::Hash => Arc::new(HashEmbedder::new(config.dimension)),
        EmbeddingProvider::OpenAi => Arc::new(OpenAiEmbedder::new(config)?),
        EmbeddingProvider::Cohere => Arc::new(CohereEmbedder::new(config)?),
    };
    Ok(embedder)
}

/// Resolve the API key for a remote provider: explicit config value first,
/// then the provider's environment variable.
fn resolve_api_key(
    configured: Option<&str>,
    env_var: &str,
    provider: &str,
) -> Result<String> {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            EngineError::Configuration(format!(
                "{} embeddings require an API key (set embedding.api_key or {})",
                provider, env_var
            ))
        })
}

/// Map a ureq failure onto the transport error surface.
pub(crate) fn transport_error(error: ureq::Error) -> EngineError {
    match error {
        ureq::Error::StatusCode(code) => {
            EngineError::Transport(format!("provider returned HTTP {}", code))
        }
        ureq::Error::Timeout(_) => EngineError::Transport("request timed out".to_string()),
        other => EngineError::Transport(other.to_string()),
    }
}
