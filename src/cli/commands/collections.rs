//! Collections command - list known collections and their state

use crate::cli::output::{colors, format_relative_time};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for list-collections
#[derive(Args, Debug)]
pub struct ListArgs {}

/// Collection list item
#[derive(Debug, Serialize)]
pub struct CollectionListItem {
    pub name: String,
    pub state: String,
    pub documents: usize,
    pub root_path: String,
    pub updated_at: String,
}

/// Collection list response
#[derive(Debug, Serialize)]
pub struct CollectionListResponse {
    pub count: usize,
    pub collections: Vec<CollectionListItem>,
}

/// Execute the list-collections command
pub async fn execute(
    _args: ListArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let infos = services.lifecycle.list_collections().await;

    let mut items = Vec::with_capacity(infos.len());
    for info in infos {
        let state = services.lifecycle.state(&info.name).await;
        items.push(CollectionListItem {
            name: info.name,
            state: state.as_str().to_string(),
            documents: info.documents,
            root_path: info.root_path,
            updated_at: info.updated_at,
        });
    }

    let response = CollectionListResponse {
        count: items.len(),
        collections: items,
    };

    match format {
        OutputFormat::Human => {
            if response.collections.is_empty() {
                println!(
                    "No collections found. Run '{}' to index a directory.",
                    colors::label("lodestar index <path>")
                );
            } else {
                println!(
                    "{} ({}):",
                    colors::label("Collections"),
                    colors::number(&response.count.to_string())
                );
                for collection in &response.collections {
                    let updated = chrono::DateTime::parse_from_rfc3339(&collection.updated_at)
                        .map(|dt| format_relative_time(&dt.with_timezone(&chrono::Utc)))
                        .unwrap_or_default();
                    println!(
                        "  {:<36} {:>8}  {:>8} docs  {}  {}",
                        colors::collection(&collection.name),
                        collection.state,
                        colors::number(&collection.documents.to_string()),
                        colors::file_path(&collection.root_path),
                        colors::dim(&updated)
                    );
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
