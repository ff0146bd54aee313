//! CLI adapter for Lodestar
//!
//! Provides the command-line interface for Lodestar's indexing and search
//! capabilities. This module is a thin adapter: all domain logic lives in
//! `core/`, and each command translates arguments in and renders results out.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// Lodestar - project-aware code search
///
/// Index a project directory into a searchable collection of endpoint,
/// summary, and source-chunk documents, then query it with plain text or
/// intent-expanded hybrid search.
#[derive(Parser, Debug)]
#[command(name = "lodestar")]
#[command(version)]
#[command(about = "Project-aware code search and indexing", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output for scripting
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Human
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a project directory into a collection
    #[command(name = "index")]
    Index(commands::IndexArgs),

    /// Search a collection with plain-text similarity ranking
    #[command(name = "search")]
    Search(commands::SearchArgs),

    /// Search with query-intent classification and term expansion
    #[command(name = "hybrid-search")]
    HybridSearch(commands::HybridArgs),

    /// List all known collections
    #[command(name = "list-collections")]
    ListCollections(commands::ListArgs),

    /// Clear a collection and all its documents
    #[command(name = "clear-collection")]
    ClearCollection(commands::ClearArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  lodestar completions bash > ~/.local/share/bash-completion/completions/lodestar
    ///   zsh:   lodestar completions zsh > ~/.zfunc/_lodestar
    ///   fish:  lodestar completions fish > ~/.config/fish/completions/lodestar.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::{migrate_legacy_paths, XdgDirs};
    use std::sync::Arc;

    // Handle completions command early (doesn't need services)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    // Initialize XDG directories
    let xdg = XdgDirs::new();
    xdg.ensure_dirs_exist()?;

    // Run migration from legacy paths (if needed)
    if let Err(e) = migrate_legacy_paths(&xdg) {
        output::print_warning(&format!("Migration issue: {e}"));
    }

    // Load configuration
    let config = Config::load()?;

    // Create services
    let services = Arc::new(Services::new(config)?);

    // Restore persisted collections before dispatching
    match services.load_collections().await {
        Ok(count) if count > 0 => {
            tracing::info!("Loaded {} collection(s) from disk", count);
        }
        Ok(_) => {}
        Err(e) => {
            output::print_warning(&format!("Failed to load persisted collections: {e}"));
        }
    }

    // Execute command
    match cli.command {
        Commands::Index(args) => commands::index::execute(args, &services, cli.format).await,
        Commands::Search(args) => commands::search::execute(args, &services, cli.format).await,
        Commands::HybridSearch(args) => {
            commands::hybrid::execute(args, &services, cli.format).await
        }
        Commands::ListCollections(args) => {
            commands::collections::execute(args, &services, cli.format).await
        }
        Commands::ClearCollection(args) => {
            commands::clear::execute(args, &services, cli.format).await
        }
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
        Commands::Completions(_) => unreachable!(), // Handled above
    }
}
