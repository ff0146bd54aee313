//! Tests for the search CLI command
//!
//! Tests the search command handler with various scenarios:
//! - Valid queries with results
//! - Empty results
//! - Collection not found errors
//! - Threshold validation
//! - Output format variations

use crate::cli::test_helpers::setup_indexed_collection;
use crate::common::{create_test_services, TestProject};
use lodestar::cli::commands::search::{execute, SearchArgs};
use lodestar::cli::OutputFormat;

/// Test search with valid query returning results
#[tokio::test]
async fn test_search_valid_query_human() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = SearchArgs {
        query: "@app.route('/users')".to_string(),
        collection,
        threshold: Some(0.0),
        limit: Some(10),
        files_only: false,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Search should succeed: {:?}", result.err());
}

/// Test search with valid query in JSON format
#[tokio::test]
async fn test_search_valid_query_json() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = SearchArgs {
        query: "health".to_string(),
        collection,
        threshold: None,
        limit: Some(5),
        files_only: false,
    };

    let result = execute(args, &services, OutputFormat::Json).await;
    assert!(
        result.is_ok(),
        "JSON search should succeed: {:?}",
        result.err()
    );
}

/// Test search with no matches
#[tokio::test]
async fn test_search_empty_results() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = SearchArgs {
        query: "nonexistent_symbol_xyz".to_string(),
        collection,
        threshold: Some(0.9),
        limit: Some(10),
        files_only: false,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Search with no results should succeed");
}

/// Test search on non-existent collection
#[tokio::test]
async fn test_search_collection_not_found() {
    let (services, _state) = create_test_services();

    let args = SearchArgs {
        query: "anything".to_string(),
        collection: "codebase-index-ghost".to_string(),
        threshold: None,
        limit: None,
        files_only: false,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_err(), "Search on missing collection should fail");

    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("not found"),
        "Error should mention 'not found': {}",
        err_msg
    );
    assert!(
        err_msg.contains("list-collections"),
        "Error should suggest listing collections: {}",
        err_msg
    );
}

/// Test search with an out-of-range threshold
#[tokio::test]
async fn test_search_invalid_threshold() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = SearchArgs {
        query: "users".to_string(),
        collection,
        threshold: Some(1.5),
        limit: None,
        files_only: false,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_err(), "Out-of-range threshold should fail");

    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("out of range"),
        "Error should mention the valid range: {}",
        err_msg
    );
}

/// Test search with an empty query
#[tokio::test]
async fn test_search_empty_query_rejected() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = SearchArgs {
        query: "   ".to_string(),
        collection,
        threshold: None,
        limit: None,
        files_only: false,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_err(), "Blank query should fail");
}

/// Test search with --files-only flag
#[tokio::test]
async fn test_search_files_only() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = SearchArgs {
        query: "@app.route('/health')".to_string(),
        collection,
        threshold: Some(0.0),
        limit: Some(10),
        files_only: true,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Files-only search should succeed");
}

/// Test that oversized limits are accepted and capped by the service
#[tokio::test]
async fn test_search_limit_capped() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = SearchArgs {
        query: "flask".to_string(),
        collection,
        threshold: Some(0.0),
        limit: Some(10_000),
        files_only: false,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Search with a huge limit should succeed (capped)");
}
