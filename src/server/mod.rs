
use std::path::Path;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::EngineError;
use crate::answer::AnswerService;
use crate::cache::AnswerCache;
use crate::index::KnowledgeIndex;

const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared handles to the engine, cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<KnowledgeIndex>,
    pub cache: Arc<AnswerCache>,
    pub answers: Option<Arc<AnswerService>>,
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    answer: String,
    cached: bool,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    fragments: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ReloadResponse {
    fragments: usize,
    sources: usize,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    fragments: usize,
    cached_answers: usize,
    embedder: &'static str,
    documents_dir: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Engine errors rendered as HTTP responses: provider misconfiguration is
/// the operator's fault (500), an unreachable provider is upstream (502),
/// bad requests are the client's (400).
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        let status = match &error {
            EngineError::Transport(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("request failed: {}", self.message);
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Build the HTTP router for the engine.
#[inline]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ask", post(ask))
        .route("/api/search", post(search))
        .route("/api/documents", post(upload_documents))
        .route("/api/reload", post(reload))
        .route("/api/status", get(status))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router until the process is stopped.
#[inline]
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::bad_request("question must not be empty"));
    }
    let answers = state
        .answers
        .clone()
        .ok_or_else(|| ApiError::from(EngineError::Configuration(
            "answer generation is not configured; use /api/search for raw retrieval".to_string(),
        )))?;

    let answer = tokio::task::spawn_blocking(move || answers.ask(&request.question))
        .await
        .map_err(|e| ApiError::from(EngineError::Other(e.into())))??;

    Ok(Json(AskResponse {
        answer: answer.text,
        cached: answer.cached,
    }))
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }
    let index = Arc::clone(&state.index);
    let top_k = request.top_k.unwrap_or(3);

    let fragments = tokio::task::spawn_blocking(move || index.retrieve(&request.query, top_k))
        .await
        .map_err(|e| ApiError::from(EngineError::Other(e.into())))??;

    Ok(Json(SearchResponse { fragments }))
}

/// Accept uploaded documents, then rebuild the index and drop every cached
/// answer. The cache clear is a correctness requirement: a cached answer
/// must never outlive the index version it was computed against.
async fn upload_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ReloadResponse>, ApiError> {
    let mut stored = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart payload: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(sanitize_file_name) else {
            continue;
        };
        let file_name = file_name
            .ok_or_else(|| ApiError::bad_request("upload is missing a usable file name"))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {}", e)))?;

        let target = state.index.documents_dir().join(&file_name);
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| ApiError::from(EngineError::Io(e)))?;
        info!("stored upload {} ({} bytes)", file_name, bytes.len());
        stored += 1;
    }

    if stored == 0 {
        return Err(ApiError::bad_request("no files in upload"));
    }

    let summary = reload_and_invalidate(&state).await?;
    Ok(Json(ReloadResponse {
        fragments: summary.fragment_count,
        sources: summary.source_count,
    }))
}

async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    let summary = reload_and_invalidate(&state).await?;
    Ok(Json(ReloadResponse {
        fragments: summary.fragment_count,
        sources: summary.source_count,
    }))
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        fragments: state.index.fragment_count(),
        cached_answers: state.cache.len(),
        embedder: state.index.embedder_name(),
        documents_dir: state.index.documents_dir().display().to_string(),
    })
}

async fn reload_and_invalidate(state: &AppState) -> Result<crate::index::ReloadSummary, ApiError> {
    let index = Arc::clone(&state.index);
    let summary = tokio::task::spawn_blocking(move || index.reload())
        .await
        .map_err(|e| ApiError::from(EngineError::Other(e.into())))??;
    state.cache.clear();
    Ok(summary)
}

/// Reduce an uploaded name to its final path component; rejects names that
/// normalize to nothing.
fn sanitize_file_name(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .map(|base| base.to_string_lossy().into_owned())
        .filter(|base| !base.is_empty() && base.as_str() != "." && base.as_str() != "..")
}
