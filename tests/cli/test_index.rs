//! Tests for the index CLI command
//!
//! Tests the index command handler:
//! - Indexing a new directory (human and JSON output)
//! - Incremental and forced re-indexing
//! - Error cases (missing path, path that is a file, root conflicts)

use crate::cli::test_helpers::setup_indexed_collection;
use crate::common::{create_test_services, TestProject};
use lodestar::cli::commands::index::{execute, IndexArgs};
use lodestar::cli::OutputFormat;
use lodestar::core::lifecycle::CollectionState;

/// Test indexing a new directory
#[tokio::test]
async fn test_index_new_directory_human() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");

    let args = IndexArgs {
        path: project.path().to_path_buf(),
        force: false,
        quiet: true,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Index should succeed: {:?}", result.err());
    assert_eq!(
        services.lifecycle.state("codebase-index-webapp").await,
        CollectionState::Ready
    );
}

/// Test indexing a new directory (JSON format)
#[tokio::test]
async fn test_index_new_directory_json() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");

    let args = IndexArgs {
        path: project.path().to_path_buf(),
        force: false,
        quiet: true,
    };

    let result = execute(args, &services, OutputFormat::Json).await;
    assert!(
        result.is_ok(),
        "Index (JSON) should succeed: {:?}",
        result.err()
    );
}

/// Test re-indexing an unchanged directory
#[tokio::test]
async fn test_index_unchanged_directory_again() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");

    setup_indexed_collection(&services, project.path()).await;

    let args = IndexArgs {
        path: project.path().to_path_buf(),
        force: false,
        quiet: true,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Incremental re-index should succeed");
}

/// Test force re-indexing an existing collection
#[tokio::test]
async fn test_index_force_reindex() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");

    setup_indexed_collection(&services, project.path()).await;

    let args = IndexArgs {
        path: project.path().to_path_buf(),
        force: true,
        quiet: true,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Force re-index should succeed");
    assert_eq!(
        services.lifecycle.state("codebase-index-webapp").await,
        CollectionState::Ready
    );
}

/// Test indexing a non-existent path
#[tokio::test]
async fn test_index_missing_path() {
    let (services, _state) = create_test_services();

    let args = IndexArgs {
        path: "/nonexistent/path/that/does/not/exist".into(),
        force: false,
        quiet: true,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_err(), "Index of a missing path should fail");

    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("Invalid path"),
        "Error should mention the invalid path: {}",
        err_msg
    );
}

/// Test indexing a path that is a file rather than a directory
#[tokio::test]
async fn test_index_file_path_rejected() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");

    let args = IndexArgs {
        path: project.path().join("app.py"),
        force: false,
        quiet: true,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_err(), "Indexing a file should fail");

    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("not a directory"),
        "Error should explain only directories are indexable: {}",
        err_msg
    );
}

/// Test two roots mapping to the same collection name
#[tokio::test]
async fn test_index_conflicting_root_suggests_clear() {
    let (services, _state) = create_test_services();
    let first = TestProject::flask("webapp");
    let second = TestProject::flask("webapp");

    setup_indexed_collection(&services, first.path()).await;

    let args = IndexArgs {
        path: second.path().to_path_buf(),
        force: false,
        quiet: true,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_err(), "Conflicting root should fail");

    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("already indexes"),
        "Error should name the existing root: {}",
        err_msg
    );
    assert!(
        err_msg.contains("clear-collection"),
        "Error should suggest the clear command: {}",
        err_msg
    );
}

/// Test indexing an empty directory
#[tokio::test]
async fn test_index_empty_directory() {
    let (services, _state) = create_test_services();
    let project = TestProject::with_files("empty", &[]);
    std::fs::create_dir_all(project.path()).expect("Failed to create empty project dir");

    let args = IndexArgs {
        path: project.path().to_path_buf(),
        force: false,
        quiet: true,
    };

    // Nothing to chunk, but the analysis documents still get written
    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(
        result.is_ok(),
        "Empty directory should index without error: {:?}",
        result.err()
    );
}
