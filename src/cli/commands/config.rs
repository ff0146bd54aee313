//! Show-config command - print the resolved configuration

use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the show-config command
#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub state_dir: String,
    pub config_file: String,
    pub indexing: IndexingSection,
    pub search: SearchSection,
    pub capability: CapabilitySection,
}

#[derive(Debug, Serialize)]
pub struct IndexingSection {
    pub chunk_size: usize,
    pub overlap: usize,
    pub workers: usize,
    pub max_file_size_mb: usize,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchSection {
    pub default_threshold: f32,
    pub default_max_results: usize,
    pub max_results: usize,
    pub max_query_length: usize,
}

#[derive(Debug, Serialize)]
pub struct CapabilitySection {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub retry_backoff_ms: u64,
    pub embedding_dims: usize,
}

/// Execute the show-config command
pub async fn execute(
    _args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;

    let xdg = crate::core::xdg::XdgDirs::new();
    let config_file = xdg.config_file().to_string_lossy().into_owned();

    let response = ConfigResponse {
        state_dir: config.storage.state_dir.to_string_lossy().into_owned(),
        config_file,
        indexing: IndexingSection {
            chunk_size: config.indexing.chunk_size,
            overlap: config.indexing.overlap,
            workers: config.indexing.workers,
            max_file_size_mb: config.indexing.max_file_size_mb,
            include_patterns: config.indexing.include_patterns.clone(),
            exclude_patterns: config.indexing.exclude_patterns.clone(),
        },
        search: SearchSection {
            default_threshold: config.search.default_threshold,
            default_max_results: config.search.default_max_results,
            max_results: config.search.max_results,
            max_query_length: config.search.max_query_length,
        },
        capability: CapabilitySection {
            endpoint: if config.capability.endpoint.is_empty() {
                "(local fallback)".to_string()
            } else {
                config.capability.endpoint.clone()
            },
            timeout_secs: config.capability.timeout_secs,
            retry_backoff_ms: config.capability.retry_backoff_ms,
            embedding_dims: config.capability.embedding_dims,
        },
    };

    match format {
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  state_dir: {}", response.state_dir);
            println!("  config_file: {}", response.config_file);
            println!("  indexing:");
            println!("    chunk_size: {}", response.indexing.chunk_size);
            println!("    overlap: {}", response.indexing.overlap);
            println!("    workers: {}", response.indexing.workers);
            println!(
                "    max_file_size_mb: {}",
                response.indexing.max_file_size_mb
            );
            println!(
                "    include_patterns: {} patterns",
                response.indexing.include_patterns.len()
            );
            println!(
                "    exclude_patterns: {} patterns",
                response.indexing.exclude_patterns.len()
            );
            println!("  search:");
            println!(
                "    default_threshold: {}",
                response.search.default_threshold
            );
            println!(
                "    default_max_results: {}",
                response.search.default_max_results
            );
            println!("    max_results: {}", response.search.max_results);
            println!(
                "    max_query_length: {}",
                response.search.max_query_length
            );
            println!("  capability:");
            println!("    endpoint: {}", response.capability.endpoint);
            println!("    timeout_secs: {}", response.capability.timeout_secs);
            println!(
                "    retry_backoff_ms: {}",
                response.capability.retry_backoff_ms
            );
            println!("    embedding_dims: {}", response.capability.embedding_dims);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
