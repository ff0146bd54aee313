//! End-to-end pipeline tests.
//!
//! Index synthetic projects through the service facade and inspect the
//! documents that come out the other side: endpoint extraction at known
//! line positions, file summaries, project-level analysis, and the
//! search behavior over the built collection.

use crate::common::{
    assert_valid_stats, create_test_services, index_project, TestProject, ORDERS_ROUTE_LINES,
};
use lodestar::core::lifecycle::CollectionState;
use lodestar::core::types::DocumentType;
use lodestar::LodestarError;

/// Expected endpoint names for the orders fixture, by decorator line.
const ORDERS_ROUTES: [(usize, &str); 5] = [
    (31, "/orders"),
    (36, "/orders/<int:order_id>"),
    (126, "/orders"),
    (153, "/orders/<int:order_id>"),
    (181, "/health"),
];

#[tokio::test]
async fn test_orders_build_stats() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();

    let stats = index_project(&services, project.path()).await;

    assert_valid_stats(&stats);
    assert_eq!(stats.collection, "codebase-index-orders");
    assert_eq!(stats.files_scanned, 2, "requirements.txt and service.py");
    assert_eq!(stats.files_indexed, 2);
    assert_eq!(stats.files_skipped, 0);
    assert_eq!(stats.endpoints_found, 5);
}

#[tokio::test]
async fn test_orders_document_inventory() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();
    index_project(&services, project.path()).await;

    let snapshot = services
        .store
        .snapshot("codebase-index-orders")
        .await
        .expect("collection should exist after indexing");

    let mut expected: Vec<String> = ORDERS_ROUTE_LINES
        .iter()
        .map(|line| format!("service.py#endpoint@{line}"))
        .collect();
    expected.extend(
        [
            "service.py#summary",
            "requirements.txt#summary",
            "requirements.txt#chunk@0",
            "project#analysis",
            "project#framework@Flask",
            "project#dependency@flask",
        ]
        .map(String::from),
    );

    for id in &expected {
        assert!(snapshot.get(id).is_some(), "missing document {id}");
    }
    assert_eq!(
        snapshot.len(),
        expected.len(),
        "unexpected extra documents: {:?}",
        snapshot
            .documents()
            .iter()
            .map(|d| d.id.as_str())
            .filter(|id| !expected.iter().any(|e| e == id))
            .collect::<Vec<_>>()
    );

    // Files with endpoints are represented by those endpoints, not by
    // raw source chunks
    assert!(!snapshot.documents().iter().any(|d| {
        d.file_path == "service.py" && matches!(d.doc_type, DocumentType::SourceChunk { .. })
    }));
}

#[tokio::test]
async fn test_orders_endpoint_names_and_lines() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();
    index_project(&services, project.path()).await;

    let snapshot = services
        .store
        .snapshot("codebase-index-orders")
        .await
        .unwrap();

    for (line, route) in ORDERS_ROUTES {
        let doc = snapshot
            .get(&format!("service.py#endpoint@{line}"))
            .unwrap_or_else(|| panic!("no endpoint document at line {line}"));

        assert_eq!(doc.line_number, Some(line));
        assert_eq!(doc.file_path, "service.py");
        match &doc.doc_type {
            DocumentType::RestApiEndpoint { endpoint_name } => {
                assert_eq!(endpoint_name, route, "wrong route name at line {line}");
            }
            other => panic!("expected endpoint document at line {line}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_orders_endpoint_content_captures_handler() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();
    index_project(&services, project.path()).await;

    let snapshot = services
        .store
        .snapshot("codebase-index-orders")
        .await
        .unwrap();

    let list_orders = snapshot.get("service.py#endpoint@31").unwrap();
    assert!(list_orders
        .content
        .contains("@app.route('/orders', methods=['GET'])"));
    assert!(list_orders.content.contains("def list_orders():"));

    let health = snapshot.get("service.py#endpoint@181").unwrap();
    assert!(health.content.contains("def health():"));
    // The handler body ends with the function, not the rest of the file
    assert!(!health.content.contains("def delete_order"));
}

#[tokio::test]
async fn test_orders_summary_enumerates_routes() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();
    index_project(&services, project.path()).await;

    let snapshot = services
        .store
        .snapshot("codebase-index-orders")
        .await
        .unwrap();
    let summary = &snapshot.get("service.py#summary").unwrap().content;

    assert!(summary.contains("REST API Endpoints:"), "summary:\n{summary}");
    for (line, route) in ORDERS_ROUTES {
        assert!(
            summary.contains(&format!("- Line {line}: {route}")),
            "summary should list line {line} ({route}):\n{summary}"
        );
    }
}

#[tokio::test]
async fn test_reindex_unchanged_project_is_idempotent() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();

    let first = index_project(&services, project.path()).await;
    let first_ids = sorted_ids(&services, "codebase-index-orders").await;

    let second = index_project(&services, project.path()).await;
    let second_ids = sorted_ids(&services, "codebase-index-orders").await;

    assert_eq!(second.files_indexed, 0, "no file changed on disk");
    assert_eq!(second.files_scanned, first.files_scanned);
    assert_eq!(second.documents_created, first.documents_created);
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn test_collection_ready_after_build() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();
    index_project(&services, project.path()).await;

    assert_eq!(
        services.lifecycle.state("codebase-index-orders").await,
        CollectionState::Ready
    );

    let meta = services
        .lifecycle
        .collection_meta("codebase-index-orders")
        .expect("build should record metadata");
    let analysis = meta.project.expect("build should record project analysis");
    assert!(analysis.framework("flask").is_some());
    assert!(analysis.dependencies.iter().any(|d| d.name == "flask"));
}

#[tokio::test]
async fn test_search_finds_endpoint_documents() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();
    index_project(&services, project.path()).await;

    let response = services
        .search
        .search(
            "codebase-index-orders",
            "@app.route('/orders', methods=['GET'])",
            Some(0.0),
            Some(50),
        )
        .await
        .expect("search over a ready collection should succeed");

    assert!(!response.results.is_empty());
    assert_eq!(response.count, response.results.len());
    assert!(response
        .results
        .iter()
        .any(|r| r.document_type == "rest_api_endpoint" && r.file_path == "service.py"));
}

#[tokio::test]
async fn test_search_unknown_collection_is_not_found() {
    let (services, _state) = create_test_services();

    let result = services
        .search
        .search("codebase-index-ghost", "orders", None, None)
        .await;
    assert!(matches!(result, Err(LodestarError::CollectionNotFound(_))));
}

#[tokio::test]
async fn test_search_threshold_out_of_range_rejected() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();
    index_project(&services, project.path()).await;

    for bad in [-0.2f32, 1.5f32] {
        let result = services
            .search
            .search("codebase-index-orders", "orders", Some(bad), None)
            .await;
        assert!(
            matches!(result, Err(LodestarError::InvalidThreshold(v)) if v == bad),
            "threshold {bad} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_hybrid_search_expands_query_for_flask_project() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();
    index_project(&services, project.path()).await;

    let query = "show the route handlers";
    let response = services
        .search
        .hybrid_search("codebase-index-orders", query, None)
        .await
        .expect("hybrid search over a ready collection should succeed");

    let analysis = &response.ai_analysis;
    assert_eq!(analysis.original_query, query);
    assert!(
        analysis.expanded_query.starts_with(query),
        "expansion lost the original query: {:?}",
        analysis.expanded_query
    );
    // The build detected Flask, so code searches pick up its syntax
    assert!(analysis.added_terms.iter().any(|t| t == "@app.route"));
    for term in &analysis.added_terms {
        assert!(analysis.expanded_query.contains(term.as_str()));
    }
}

#[tokio::test]
async fn test_hybrid_search_literal_term_always_hits() {
    let project = TestProject::orders("orders");
    let (services, _state) = create_test_services();
    index_project(&services, project.path()).await;

    // "health" appears verbatim in the fixture, so the keyword pass
    // guarantees a hit even if the vector pass comes back thin
    let response = services
        .search
        .hybrid_search("codebase-index-orders", "health", Some(10))
        .await
        .unwrap();

    assert!(!response.vector_results.is_empty());
    assert!(response
        .vector_results
        .iter()
        .any(|r| r.content.contains("health")));
}

#[tokio::test]
async fn test_plain_text_project_has_no_endpoints() {
    let project = TestProject::with_files(
        "notes",
        &[(
            "README.txt",
            "Operational notes for the deployment pipeline.\n",
        )],
    );
    let (services, _state) = create_test_services();

    let stats = index_project(&services, project.path()).await;

    assert_eq!(stats.collection, "codebase-index-notes");
    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.endpoints_found, 0);

    let snapshot = services
        .store
        .snapshot("codebase-index-notes")
        .await
        .unwrap();
    assert!(snapshot.get("README.txt#summary").is_some());
    assert!(snapshot.get("project#analysis").is_some());
    assert!(!snapshot
        .documents()
        .iter()
        .any(|d| matches!(d.doc_type, DocumentType::FrameworkDocumentation { .. })));
}

async fn sorted_ids(
    services: &std::sync::Arc<lodestar::Services>,
    collection: &str,
) -> Vec<String> {
    let snapshot = services.store.snapshot(collection).await.unwrap();
    let mut ids: Vec<String> = snapshot.documents().iter().map(|d| d.id.clone()).collect();
    ids.sort();
    ids
}
