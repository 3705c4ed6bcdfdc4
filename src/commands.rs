use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use tracing::{info, warn};

use crate::answer::{AnswerService, ChatClient};
use crate::cache::AnswerCache;
use crate::config::Config;
use crate::embeddings::create_embedder;
use crate::index::{KnowledgeIndex, ReloadSummary};
use crate::server::{self, AppState};

/// Wire up the engine from configuration: embedder, index, cache, and,
/// when credentials allow, the answer service.
#[inline]
pub fn build_engine(config: &Config) -> Result<AppState> {
    let embedder =
        create_embedder(&config.embedding).context("Failed to initialize embedding strategy")?;

    let documents_dir = config.documents_dir();
    std::fs::create_dir_all(&documents_dir).with_context(|| {
        format!(
            "Failed to create documents directory: {}",
            documents_dir.display()
        )
    })?;

    let index = Arc::new(KnowledgeIndex::new(
        documents_dir,
        embedder,
        config.chunking.clone(),
    ));
    let cache = Arc::new(AnswerCache::new());

    // Retrieval works without answer credentials; only /api/ask needs them.
    let answers = match ChatClient::new(&config.answer) {
        Ok(chat) => Some(Arc::new(AnswerService::new(
            Arc::clone(&index),
            Arc::clone(&cache),
            chat,
            config.retrieval.top_k,
        ))),
        Err(e) => {
            warn!("answer generation disabled: {}", e);
            None
        }
    };

    Ok(AppState {
        index,
        cache,
        answers,
    })
}

async fn initial_reload(state: &AppState) -> Result<ReloadSummary> {
    let index = Arc::clone(&state.index);
    let summary = tokio::task::spawn_blocking(move || index.reload())
        .await
        .context("Reload task panicked")??;
    info!(
        "indexed {} fragments from {} sources",
        summary.fragment_count, summary.source_count
    );
    Ok(summary)
}

/// Build the engine, run the initial index load, and serve HTTP until
/// stopped.
#[inline]
pub async fn serve(config: Config) -> Result<()> {
    let state = build_engine(&config)?;
    initial_reload(&state).await?;
    server::serve(state, &config.server.host, config.server.port).await
}

/// One-shot question answering from the command line.
#[inline]
pub async fn ask(config: Config, question: String) -> Result<()> {
    let state = build_engine(&config)?;
    initial_reload(&state).await?;

    let answers = state
        .answers
        .ok_or_else(|| anyhow!("answer generation requires an API key; see `askdocs config`"))?;
    let answer = tokio::task::spawn_blocking(move || answers.ask(&question))
        .await
        .context("Answer task panicked")??;

    println!("{}", answer.text);
    Ok(())
}

/// Retrieval without synthesis: print the top fragments for a query.
/// Works offline with the hash strategy.
#[inline]
pub async fn search(config: Config, query: String, top_k: usize) -> Result<()> {
    let state = build_engine(&config)?;
    initial_reload(&state).await?;

    let index = Arc::clone(&state.index);
    let fragments = tokio::task::spawn_blocking(move || index.retrieve(&query, top_k))
        .await
        .context("Search task panicked")??;

    if fragments.is_empty() {
        println!("No matching fragments.");
        return Ok(());
    }
    for (i, fragment) in fragments.iter().enumerate() {
        println!("[{}] {}", i + 1, fragment);
    }
    Ok(())
}

/// Print the resolved configuration and where it came from.
#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    println!("# {}", config.config_file_path().display());
    let rendered =
        toml::to_string_pretty(config).context("Failed to render configuration as TOML")?;
    println!("{}", rendered);
    Ok(())
}
