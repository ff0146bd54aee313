//! Hybrid search command - planned retrieval with query expansion

use crate::cli::commands::search::{friendly_search_error, print_human, SearchResponseOutput, SearchResultItem};
use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the hybrid-search command
#[derive(Args, Debug)]
pub struct HybridArgs {
    /// Search query
    pub query: String,

    /// Collection to search
    #[arg(long, short = 'c')]
    pub collection: String,

    /// Maximum number of results
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,
}

/// Hybrid search response
#[derive(Debug, Serialize)]
pub struct HybridResponseOutput {
    pub query: String,
    pub collection: String,
    pub intent: String,
    pub expanded_query: String,
    pub added_terms: Vec<String>,
    pub used_keyword_fallback: bool,
    pub total_results: usize,
    pub duration_ms: u64,
    pub results: Vec<SearchResultItem>,
}

/// Execute the hybrid-search command
pub async fn execute(
    args: HybridArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = services
        .search
        .hybrid_search(&args.collection, &args.query, args.limit)
        .await
        .map_err(|e| friendly_search_error(e, &args.collection))?;

    let results: Vec<SearchResultItem> = response
        .vector_results
        .iter()
        .enumerate()
        .map(|(i, r)| SearchResultItem {
            rank: i + 1,
            file: r.file_path.clone(),
            line: r.line_number,
            score: r.score,
            document_type: r.document_type.clone(),
            text: Some(r.content.clone()),
        })
        .collect();

    let output = HybridResponseOutput {
        query: args.query.clone(),
        collection: args.collection.clone(),
        intent: response.ai_analysis.intent.as_str().to_string(),
        expanded_query: response.ai_analysis.expanded_query.clone(),
        added_terms: response.ai_analysis.added_terms.clone(),
        used_keyword_fallback: response.used_keyword_fallback,
        total_results: results.len(),
        duration_ms: response.duration_ms,
        results,
    };

    match format {
        OutputFormat::Human => {
            println!("{}: {}", colors::label("Intent"), output.intent);
            if !output.added_terms.is_empty() {
                println!(
                    "{}: {}",
                    colors::label("Expanded with"),
                    colors::dim(&output.added_terms.join(", "))
                );
            }
            if output.used_keyword_fallback {
                println!(
                    "{}",
                    colors::dim("(keyword retrieval supplemented the vector results)")
                );
            }
            println!();

            let rendered = SearchResponseOutput {
                query: output.query.clone(),
                collection: output.collection.clone(),
                total_results: output.total_results,
                duration_ms: output.duration_ms,
                results: output.results,
            };
            print_human(&rendered, false);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
