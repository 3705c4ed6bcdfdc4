use std::path::PathBuf;

use anyhow::Result;
use askdocs::commands::{ask, search, serve, show_config};
use askdocs::config::Config;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "askdocs")]
#[command(about = "Question answering over a private document collection")]
#[command(version)]
struct Cli {
    /// Override the configuration directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (indexes the document directory first)
    Serve,
    /// Answer a single question and exit
    Ask {
        /// The question to answer
        question: String,
    },
    /// Print the most relevant fragments for a query without generating
    /// an answer
    Search {
        /// The query to rank fragments against
        query: String,
        /// How many fragments to return
        #[arg(long, default_value_t = 3)]
        top_k: usize,
    },
    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => Config::default_config_dir()?,
    };
    let config = Config::load(&config_dir)?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Ask { question } => ask(config, question).await?,
        Commands::Search { query, top_k } => search(config, query, top_k).await?,
        Commands::Config => show_config(&config)?,
    }

    Ok(())
}
