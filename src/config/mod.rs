// Configuration management module
// TOML configuration loading, defaults, and validation

pub mod settings;

pub use settings::{
    AnswerConfig, Config, ConfigError, DocumentsConfig, EmbeddingConfig, EmbeddingProvider,
    RetrievalConfig, ServerConfig,
};

/// Get the default configuration directory path
#[inline]
pub fn default_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::default_config_dir()
}
