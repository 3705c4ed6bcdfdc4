
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::EmbeddingConfig;
use crate::embeddings::{Embedder, transport_error};
use crate::{EngineError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.cohere.com";
pub const DEFAULT_MODEL: &str = "embed-english-v3.0";

const API_KEY_ENV: &str = "COHERE_API_KEY";

/// Remote embedding strategy backed by the Cohere embed endpoint.
#[derive(Debug, Clone)]
pub struct CohereEmbedder {
    agent: ureq::Agent,
    endpoint: Url,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: [&'a str; 1],
    input_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl CohereEmbedder {
    #[inline]
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = super::resolve_api_key(config.api_key.as_deref(), API_KEY_ENV, "Cohere")?;

        let base = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let endpoint = Url::parse(base)
            .and_then(|url| url.join("/v1/embed"))
            .map_err(|e| {
                EngineError::Configuration(format!("invalid embedding base URL {}: {}", base, e))
            })?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Ok(Self {
            agent,
            endpoint,
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            dimension: config.dimension,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }
}

impl Embedder for CohereEmbedder {
    #[inline]
    fn name(&self) -> &'static str {
        "cohere"
    }

    #[inline]
    fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.model,
            texts: [text],
            input_type: "search_document",
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| EngineError::Other(e.into()))?;

        let bearer = format!("Bearer {}", self.api_key);
        let response_text = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", bearer.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(transport_error)?;

        let response: EmbedResponse = serde_json::from_str(&response_text).map_err(|e| {
            EngineError::UnexpectedResponse(format!("malformed embed body: {}", e))
        })?;

        let embedding = response.embeddings.into_iter().next().ok_or_else(|| {
            EngineError::UnexpectedResponse("response contained no embeddings".to_string())
        })?;

        debug!(
            "Cohere embedded {} chars into {} dimensions",
            text.len(),
            embedding.len()
        );
        Ok(embedding)
    }
}
