//! Tests for the collection management CLI commands
//!
//! Tests the list-collections, clear-collection, and show-config
//! handlers:
//! - Listing with and without indexed collections
//! - Clearing with --force (no interactive prompt)
//! - Error cases (missing collection)
//! - show-config in both output formats

use crate::cli::test_helpers::setup_indexed_collection;
use crate::common::{create_test_services, TestProject};
use lodestar::cli::commands::clear::{self, ClearArgs};
use lodestar::cli::commands::collections::{self, ListArgs};
use lodestar::cli::commands::config::{self, ConfigArgs};
use lodestar::cli::OutputFormat;
use lodestar::core::lifecycle::CollectionState;

/// Test listing when nothing has been indexed
#[tokio::test]
async fn test_list_collections_empty() {
    let (services, _state) = create_test_services();

    let result = collections::execute(ListArgs {}, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Empty listing should succeed");

    let result = collections::execute(ListArgs {}, &services, OutputFormat::Json).await;
    assert!(result.is_ok(), "Empty listing (JSON) should succeed");
}

/// Test listing after indexing a project
#[tokio::test]
async fn test_list_collections_after_index() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    setup_indexed_collection(&services, project.path()).await;

    let result = collections::execute(ListArgs {}, &services, OutputFormat::Human).await;
    assert!(
        result.is_ok(),
        "Listing should succeed: {:?}",
        result.err()
    );
}

/// Test clearing a collection with --force
#[tokio::test]
async fn test_clear_collection_forced() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = ClearArgs {
        collection: collection.clone(),
        force: true,
    };

    let result = clear::execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Clear should succeed: {:?}", result.err());
    assert_eq!(
        services.lifecycle.state(&collection).await,
        CollectionState::Absent
    );
}

/// Test clearing with JSON output (never prompts)
#[tokio::test]
async fn test_clear_collection_json_skips_prompt() {
    let (services, _state) = create_test_services();
    let project = TestProject::flask("webapp");
    let collection = setup_indexed_collection(&services, project.path()).await;

    let args = ClearArgs {
        collection,
        force: false,
    };

    let result = clear::execute(args, &services, OutputFormat::Json).await;
    assert!(
        result.is_ok(),
        "JSON clear should proceed without a prompt: {:?}",
        result.err()
    );
}

/// Test clearing a collection that does not exist
#[tokio::test]
async fn test_clear_missing_collection() {
    let (services, _state) = create_test_services();

    let args = ClearArgs {
        collection: "codebase-index-ghost".to_string(),
        force: true,
    };

    let result = clear::execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_err(), "Clearing a missing collection should fail");

    let err_msg = result.unwrap_err().to_string();
    assert!(
        err_msg.contains("not found"),
        "Error should mention 'not found': {}",
        err_msg
    );
}

/// Test that clearing one collection leaves others intact
#[tokio::test]
async fn test_clear_leaves_other_collections() {
    let (services, _state) = create_test_services();
    let first = TestProject::flask("billing");
    let second = TestProject::flask("shipping");
    let first_name = setup_indexed_collection(&services, first.path()).await;
    let second_name = setup_indexed_collection(&services, second.path()).await;

    let args = ClearArgs {
        collection: first_name,
        force: true,
    };
    clear::execute(args, &services, OutputFormat::Human)
        .await
        .expect("Clear should succeed");

    assert_eq!(
        services.lifecycle.state(&second_name).await,
        CollectionState::Ready
    );
}

/// Test show-config in both output formats
#[tokio::test]
async fn test_show_config() {
    let (services, _state) = create_test_services();

    let result = config::execute(ConfigArgs {}, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "show-config should succeed: {:?}", result.err());

    let result = config::execute(ConfigArgs {}, &services, OutputFormat::Json).await;
    assert!(result.is_ok(), "show-config (JSON) should succeed");
}
