
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::cache::AnswerCache;
use crate::config::AnswerConfig;
use crate::embeddings::transport_error;
use crate::index::KnowledgeIndex;
use crate::{EngineError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const API_KEY_ENV: &str = "OPENAI_API_KEY";

const SYSTEM_PROMPT: &str = "You are an assistant answering questions about a private document \
collection. Answer using only the provided context. If the context does not \
contain the answer, say so instead of guessing.";

/// Chat-completion client for answer synthesis (OpenAI-compatible wire
/// contract, so self-hosted gateways work via `base_url`).
#[derive(Debug, Clone)]
pub struct ChatClient {
    agent: ureq::Agent,
    endpoint: Url,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl ChatClient {
    #[inline]
    pub fn new(config: &AnswerConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "answer generation requires an API key (set answer.api_key or {})",
                    API_KEY_ENV
                ))
            })?;

        let base = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let endpoint = Url::parse(base)
            .and_then(|url| url.join("/v1/chat/completions"))
            .map_err(|e| {
                EngineError::Configuration(format!("invalid answer base URL {}: {}", base, e))
            })?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Ok(Self {
            agent,
            endpoint,
            api_key,
            model: config.model.clone(),
        })
    }

    /// Run one synthesis call and return the model's reply text.
    #[inline]
    pub fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };
        let request_json =
            serde_json::to_string(&request).map_err(|e| EngineError::Other(e.into()))?;

        let bearer = format!("Bearer {}", self.api_key);
        let response_text = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", bearer.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(transport_error)?;

        let response: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            EngineError::UnexpectedResponse(format!("malformed completion body: {}", e))
        })?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                EngineError::UnexpectedResponse("response contained no choices".to_string())
            })
    }
}

/// The answer produced for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    /// Whether the answer came from the cache rather than a fresh
    /// generation pass.
    pub cached: bool,
}

/// Front door for questions: cache lookup, then retrieval, then synthesis,
/// then a cache write.
pub struct AnswerService {
    index: Arc<KnowledgeIndex>,
    cache: Arc<AnswerCache>,
    chat: ChatClient,
    top_k: usize,
}

impl AnswerService {
    #[inline]
    pub fn new(
        index: Arc<KnowledgeIndex>,
        cache: Arc<AnswerCache>,
        chat: ChatClient,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            cache,
            chat,
            top_k,
        }
    }

    /// Answer a question, consulting the cache first.
    #[inline]
    pub fn ask(&self, question: &str) -> Result<Answer> {
        if let Some(text) = self.cache.get(question) {
            debug!("cache hit for question ({} chars)", question.trim().len());
            return Ok(Answer { text, cached: true });
        }

        let fragments = self.index.retrieve(question, self.top_k)?;
        let prompt = build_prompt(question, &fragments);
        let text = self.chat.complete(SYSTEM_PROMPT, &prompt)?;

        self.cache.put(question, text.clone());
        info!(
            "answered question with {} context fragments",
            fragments.len()
        );
        Ok(Answer {
            text,
            cached: false,
        })
    }
}

/// Assemble the user message: retrieved context block, then the question.
/// Zero fragments still produce a prompt, since "nothing relevant was
/// found" is an answer the model should phrase.
fn build_prompt(question: &str, fragments: &[String]) -> String {
    let mut prompt = String::from("Context:\n");
    if fragments.is_empty() {
        prompt.push_str("(no relevant documents were found)\n");
    } else {
        for (i, fragment) in fragments.iter().enumerate() {
            prompt.push_str(&format!("[{}] {}\n", i + 1, fragment));
        }
    }
    prompt.push_str("\nQuestion: ");
    prompt.push_str(question.trim());
    prompt
}
