//! Search command - vector search over an indexed collection

use crate::cli::output::{colors, truncate_line};
use crate::cli::OutputFormat;
use crate::core::error::LodestarError;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Collection to search
    #[arg(long, short = 'c')]
    pub collection: String,

    /// Minimum similarity score (0.0-1.0)
    #[arg(long, short = 't')]
    pub threshold: Option<f32>,

    /// Maximum number of results
    #[arg(long, short = 'k')]
    pub limit: Option<usize>,

    /// Only show file paths (no content)
    #[arg(long)]
    pub files_only: bool,
}

/// Search result item
#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    pub rank: usize,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub score: f32,
    pub document_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponseOutput {
    pub query: String,
    pub collection: String,
    pub total_results: usize,
    pub duration_ms: u64,
    pub results: Vec<SearchResultItem>,
}

/// Map a search-layer error to a CLI-friendly message.
pub(crate) fn friendly_search_error(
    error: LodestarError,
    collection: &str,
) -> Box<dyn std::error::Error> {
    match error {
        LodestarError::CollectionNotFound(_) => format!(
            "Collection '{collection}' not found. Run 'lodestar list-collections' \
             to see available collections, or 'lodestar index <path>' to create one."
        )
        .into(),
        LodestarError::InvalidThreshold(value) => format!(
            "Threshold {value} is out of range. Valid range is 0.0-1.0."
        )
        .into(),
        other => other.into(),
    }
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = services
        .search
        .search(&args.collection, &args.query, args.threshold, args.limit)
        .await
        .map_err(|e| friendly_search_error(e, &args.collection))?;

    let output = SearchResponseOutput {
        query: args.query.clone(),
        collection: args.collection.clone(),
        total_results: response.count,
        duration_ms: response.duration_ms,
        results: response
            .results
            .iter()
            .enumerate()
            .map(|(i, r)| SearchResultItem {
                rank: i + 1,
                file: r.file_path.clone(),
                line: r.line_number,
                score: r.score,
                document_type: r.document_type.clone(),
                text: if args.files_only {
                    None
                } else {
                    Some(r.content.clone())
                },
            })
            .collect(),
    };

    match format {
        OutputFormat::Human => print_human(&output, args.files_only),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Render results for a terminal. Shared with the hybrid command.
pub(crate) fn print_human(output: &SearchResponseOutput, files_only: bool) {
    if output.results.is_empty() {
        println!(
            "No results found for '{}' in '{}'",
            colors::label(&output.query),
            colors::collection(&output.collection)
        );
        return;
    }

    println!(
        "Found {} result(s) in '{}':\n",
        colors::number(&output.total_results.to_string()),
        colors::collection(&output.collection)
    );

    for result in &output.results {
        if files_only {
            println!("{}", colors::file_path(&result.file));
            continue;
        }

        let location = match (result.file.is_empty(), result.line) {
            (true, _) => "(project)".to_string(),
            (false, Some(line)) => format!("{}:{}", result.file, line),
            (false, None) => result.file.clone(),
        };
        println!(
            "[{}] {} {} {}",
            colors::rank(&result.rank.to_string()),
            colors::file_path(&location),
            colors::score(&format!("{:.2}", result.score)),
            colors::dim(&result.document_type)
        );
        if let Some(text) = &result.text {
            for line in text.lines().take(5) {
                println!("    {}", colors::dim(&truncate_line(line, 100)));
            }
        }
        println!();
    }
}
