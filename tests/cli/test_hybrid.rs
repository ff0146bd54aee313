//! Tests for the hybrid-search CLI command
//!
//! Tests the hybrid search handler:
//! - Planned retrieval over an indexed collection
//! - Query expansion visible in both output formats
//! - Collection not found errors

use crate::cli::test_helpers::setup_indexed_collection;
use crate::common::{create_test_services, TestProject};
use lodestar::cli::commands::hybrid::{execute, HybridArgs};
use lodestar::cli::OutputFormat;

/// Test hybrid search over an indexed Flask project
#[tokio::test]
async fn test_hybrid_search_human() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = HybridArgs {
        query: "show the route handlers".to_string(),
        collection,
        limit: Some(10),
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(
        result.is_ok(),
        "Hybrid search should succeed: {:?}",
        result.err()
    );
}

/// Test hybrid search in JSON format
#[tokio::test]
async fn test_hybrid_search_json() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = HybridArgs {
        query: "what kind of project is this".to_string(),
        collection,
        limit: None,
    };

    let result = execute(args, &services, OutputFormat::Json).await;
    assert!(
        result.is_ok(),
        "Hybrid search (JSON) should succeed: {:?}",
        result.err()
    );
}

/// Test hybrid search with a dependency-style question
#[tokio::test]
async fn test_hybrid_search_dependency_question() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = HybridArgs {
        query: "list all dependencies".to_string(),
        collection,
        limit: Some(5),
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Dependency question should succeed");
}

/// Test hybrid search on non-existent collection
#[tokio::test]
async fn test_hybrid_search_collection_not_found() {
    let (services, _state) = create_test_services();

    let args = HybridArgs {
        query: "anything".to_string(),
        collection: "codebase-index-ghost".to_string(),
        limit: None,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_err(), "Hybrid search on missing collection should fail");

    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("not found"),
        "Error should mention 'not found': {}",
        err_msg
    );
}

/// Test hybrid search with an empty query
#[tokio::test]
async fn test_hybrid_search_empty_query_rejected() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = HybridArgs {
        query: String::new(),
        collection,
        limit: None,
    };

    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_err(), "Empty query should fail");
}
