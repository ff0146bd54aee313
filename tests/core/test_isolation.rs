//! Collection isolation and clear semantics.
//!
//! Collections are scoped by name: documents from one project must
//! never leak into another project's queries, and clearing a
//! collection removes exactly that collection, in memory and on disk.

use crate::common::{create_test_services, index_project, TestProject};
use lodestar::core::config::Config;
use lodestar::core::lifecycle::CollectionState;
use lodestar::core::services::Services;
use lodestar::LodestarError;

fn payments_project() -> TestProject {
    TestProject::with_files(
        "payments",
        &[
            ("requirements.txt", "flask==2.3.0\n"),
            (
                "app.py",
                "\
from flask import Flask

app = Flask(__name__)

@app.route('/payments')
def list_payments():
    return 'payments ledger'
",
            ),
        ],
    )
}

fn inventory_project() -> TestProject {
    TestProject::with_files(
        "inventory",
        &[
            ("requirements.txt", "flask==2.3.0\n"),
            (
                "app.py",
                "\
from flask import Flask

app = Flask(__name__)

@app.route('/inventory')
def list_inventory():
    return 'inventory stock'
",
            ),
        ],
    )
}

#[tokio::test]
async fn test_documents_are_scoped_to_their_collection() {
    let payments = payments_project();
    let inventory = inventory_project();
    let (services, _state) = create_test_services();

    index_project(&services, payments.path()).await;
    index_project(&services, inventory.path()).await;

    let payments_snap = services
        .store
        .snapshot("codebase-index-payments")
        .await
        .unwrap();
    let inventory_snap = services
        .store
        .snapshot("codebase-index-inventory")
        .await
        .unwrap();

    assert!(payments_snap.get("app.py#endpoint@5").is_some());
    assert!(inventory_snap.get("app.py#endpoint@5").is_some());

    // Same ids, different collections, different content
    assert!(!payments_snap
        .documents()
        .iter()
        .any(|d| d.content.contains("inventory")));
    assert!(!inventory_snap
        .documents()
        .iter()
        .any(|d| d.content.contains("payments")));
}

#[tokio::test]
async fn test_keyword_query_never_crosses_collections() {
    let payments = payments_project();
    let inventory = inventory_project();
    let (services, _state) = create_test_services();

    index_project(&services, payments.path()).await;
    index_project(&services, inventory.path()).await;

    let hits = services
        .store
        .keyword_query("codebase-index-payments", "inventory stock", 50)
        .await
        .unwrap();
    assert!(
        hits.is_empty(),
        "payments collection matched the other project's vocabulary: {:?}",
        hits.iter().map(|h| h.document.id.as_str()).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_clear_then_query_is_not_found() {
    let payments = payments_project();
    let (services, _state) = create_test_services();
    index_project(&services, payments.path()).await;

    let removed = services
        .lifecycle
        .clear_collection("codebase-index-payments")
        .await
        .unwrap();
    assert!(removed > 0);

    let result = services
        .search
        .search("codebase-index-payments", "payments", None, None)
        .await;
    assert!(matches!(result, Err(LodestarError::CollectionNotFound(_))));

    assert!(services.store.snapshot("codebase-index-payments").await.is_none());
    assert_eq!(
        services.lifecycle.state("codebase-index-payments").await,
        CollectionState::Absent
    );
}

#[tokio::test]
async fn test_clear_removes_state_from_disk() {
    let payments = payments_project();
    let (services, _state) = create_test_services();
    index_project(&services, payments.path()).await;

    let dir = services.store.collection_dir("codebase-index-payments");
    assert!(dir.join("documents.json").is_file());
    assert!(dir.join("manifest.log").is_file());
    assert!(dir.join("meta.json").is_file());

    services
        .lifecycle
        .clear_collection("codebase-index-payments")
        .await
        .unwrap();

    assert!(!dir.exists(), "collection directory should be gone");
}

#[tokio::test]
async fn test_clear_missing_collection_errors() {
    let (services, _state) = create_test_services();

    let result = services
        .lifecycle
        .clear_collection("codebase-index-ghost")
        .await;
    assert!(matches!(result, Err(LodestarError::CollectionNotFound(_))));
}

#[tokio::test]
async fn test_clear_is_scoped_to_one_collection() {
    let payments = payments_project();
    let inventory = inventory_project();
    let (services, _state) = create_test_services();

    index_project(&services, payments.path()).await;
    index_project(&services, inventory.path()).await;

    services
        .lifecycle
        .clear_collection("codebase-index-payments")
        .await
        .unwrap();

    assert_eq!(
        services.lifecycle.state("codebase-index-inventory").await,
        CollectionState::Ready
    );
    let snapshot = services
        .store
        .snapshot("codebase-index-inventory")
        .await
        .expect("the other collection must survive the clear");
    assert!(snapshot.get("app.py#endpoint@5").is_some());
}

#[tokio::test]
async fn test_list_collections_reports_both_builds() {
    let payments = payments_project();
    let inventory = inventory_project();
    let (services, _state) = create_test_services();

    index_project(&services, payments.path()).await;
    index_project(&services, inventory.path()).await;

    let listed = services.lifecycle.list_collections().await;
    let mut names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
    names.sort();

    assert_eq!(
        names,
        vec!["codebase-index-inventory", "codebase-index-payments"]
    );
    assert!(listed.iter().all(|c| c.documents > 0));
    assert!(listed.iter().all(|c| !c.updated_at.is_empty()));
}

#[tokio::test]
async fn test_new_process_restores_collections_from_disk() {
    let payments = payments_project();
    let state = tempfile::TempDir::new().unwrap();

    let mut config = Config::default();
    config.storage.state_dir = state.path().join("collections");
    config.indexing.workers = 2;

    {
        let services = Services::new(config.clone()).unwrap();
        index_project(&std::sync::Arc::new(services), payments.path()).await;
    }

    // Fresh container over the same state dir, as a restart would make
    let services = Services::new(config).unwrap();
    let loaded = services.load_collections().await.unwrap();
    assert_eq!(loaded, 1);

    assert_eq!(
        services.lifecycle.state("codebase-index-payments").await,
        CollectionState::Ready
    );
    let snapshot = services
        .store
        .snapshot("codebase-index-payments")
        .await
        .unwrap();
    assert!(snapshot.get("app.py#endpoint@5").is_some());
}
