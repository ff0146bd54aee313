//! Index command - build a collection from a directory

use crate::cli::output::{colors, format_duration};
use crate::cli::OutputFormat;
use crate::core::error::LodestarError;
use crate::core::lifecycle::naming;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the index command
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Path to the directory to index
    pub path: PathBuf,

    /// Force a full re-index, discarding the existing collection
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Indexing result response
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub collection: String,
    pub path: String,
    pub files_scanned: usize,
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub documents: usize,
    pub endpoints: usize,
    pub duration_secs: f64,
    pub throughput_files_per_sec: f64,
}

/// Execute the index command
pub async fn execute(
    args: IndexArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    // Validate path
    let path = args.path.canonicalize().map_err(|e| {
        format!(
            "Invalid path '{}': {}. Make sure the path exists and is accessible.",
            args.path.display(),
            e
        )
    })?;

    if !path.is_dir() {
        return Err(format!(
            "Path '{}' is not a directory. Lodestar can only index directories, not individual files.",
            path.display()
        )
        .into());
    }

    let collection = naming::collection_name(&path);

    if !args.quiet && format == OutputFormat::Human {
        eprintln!(
            "Indexing {} into '{}'...",
            colors::file_path(&path.display().to_string()),
            colors::collection(&collection)
        );
    }

    // Run the build in a task so Ctrl-C can cancel it cleanly
    let mut build = {
        let services = Arc::clone(services);
        let path = path.clone();
        let force = args.force;
        tokio::spawn(async move { services.lifecycle.index_directory(&path, force).await })
    };

    let result = tokio::select! {
        result = &mut build => result?,
        _ = tokio::signal::ctrl_c() => {
            if format == OutputFormat::Human {
                eprintln!("{}", colors::dim("Cancelling build..."));
            }
            services.lifecycle.cancel_build(&collection).await;
            (&mut build).await?
        }
    };

    let stats = match result {
        Ok(stats) => stats,
        Err(LodestarError::BuildCancelled(_)) => {
            println!("{}", colors::dim("Cancelled."));
            return Ok(());
        }
        Err(LodestarError::AmbiguousCollectionName {
            name,
            existing_root,
            ..
        }) => {
            return Err(format!(
                "Collection '{name}' already indexes {existing_root}. \
                 Clear it with 'lodestar clear-collection {name}' before \
                 indexing a different directory with the same name."
            )
            .into());
        }
        Err(LodestarError::BuildInProgress(name)) => {
            return Err(format!("A build for '{name}' is already running.").into());
        }
        Err(e) => return Err(e.into()),
    };

    let duration_secs = stats.duration_ms as f64 / 1000.0;
    let throughput = if duration_secs > 0.0 {
        stats.files_indexed as f64 / duration_secs
    } else {
        0.0
    };

    let response = IndexResponse {
        collection: stats.collection,
        path: path.to_string_lossy().into_owned(),
        files_scanned: stats.files_scanned,
        files_indexed: stats.files_indexed,
        files_skipped: stats.files_skipped,
        documents: stats.documents_created,
        endpoints: stats.endpoints_found,
        duration_secs,
        throughput_files_per_sec: throughput,
    };

    match format {
        OutputFormat::Human => {
            println!(
                "{} {} files ({} documents, {} endpoints) in {}",
                colors::success("Indexed"),
                colors::number(&response.files_indexed.to_string()),
                colors::number(&response.documents.to_string()),
                colors::number(&response.endpoints.to_string()),
                colors::number(&format_duration(response.duration_secs))
            );
            if response.files_indexed < response.files_scanned {
                let reused = response.files_scanned - response.files_indexed - response.files_skipped;
                println!(
                    "Reused {} unchanged file(s); {} skipped",
                    colors::number(&reused.to_string()),
                    colors::number(&response.files_skipped.to_string())
                );
            }
            println!(
                "Collection: {}",
                colors::collection(&response.collection)
            );
            println!(
                "Throughput: {} files/sec",
                colors::number(&format!("{:.0}", response.throughput_files_per_sec))
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
