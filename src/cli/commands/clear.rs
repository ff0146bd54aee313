//! Clear-collection command - drop an indexed collection

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::error::LodestarError;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Arc;

/// Arguments for clear-collection
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Collection name to clear
    pub collection: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

/// Clear response
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
    pub collection: String,
    pub documents_removed: usize,
}

/// Execute the clear-collection command
pub async fn execute(
    args: ClearArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !args.force && matches!(format, OutputFormat::Human) {
        print!(
            "Clear collection '{}'? This removes all indexed documents. [y/N] ",
            colors::collection(&args.collection)
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let answer = input.trim().to_lowercase();
        if answer != "y" && answer != "yes" {
            println!("Aborted.");
            return Ok(());
        }
    }

    let removed = services
        .lifecycle
        .clear_collection(&args.collection)
        .await
        .map_err(|e| friendly_clear_error(e, &args.collection))?;

    let response = ClearResponse {
        cleared: true,
        collection: args.collection,
        documents_removed: removed,
    };

    match format {
        OutputFormat::Human => {
            println!(
                "{} Cleared collection '{}' ({} documents removed)",
                colors::success("✓"),
                colors::collection(&response.collection),
                colors::number(&response.documents_removed.to_string())
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn friendly_clear_error(error: LodestarError, collection: &str) -> Box<dyn std::error::Error> {
    match &error {
        LodestarError::CollectionNotFound { .. } => format!(
            "Collection '{}' not found. Run 'lodestar list-collections' to see what is indexed.",
            collection
        )
        .into(),
        LodestarError::BuildInProgress { .. } => format!(
            "Collection '{}' has a build in progress. Cancel it (Ctrl-C on the index command) before clearing.",
            collection
        )
        .into(),
        _ => error.into(),
    }
}
