use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("source file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to parse {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("embedding provider is not configured: {0}")]
    Configuration(String),

    #[error("embedding request failed: {0}")]
    Transport(String),

    #[error("unexpected provider response: {0}")]
    UnexpectedResponse(String),

    #[error("vector dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod answer;
pub mod cache;
pub mod chunking;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod extract;
pub mod index;
pub mod ranking;
pub mod server;
