// Test helper functions

use lodestar::core::config::Config;
use lodestar::core::services::Services;
use lodestar::core::types::BuildStats;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Create test services with temporary storage.
///
/// The returned TempDir owns the state directory; keep it alive for the
/// duration of the test.
#[allow(dead_code)] // Used in integration tests
pub fn create_test_services() -> (Arc<Services>, TempDir) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.storage.state_dir = temp.path().join("collections");
    // Deterministic single-process builds keep test output stable
    config.indexing.workers = 2;

    let services = Services::new(config).expect("Failed to create services");
    (Arc::new(services), temp)
}

/// Index a project directory and return the build stats.
#[allow(dead_code)] // Used in integration tests
pub async fn index_project(services: &Arc<Services>, root: &Path) -> BuildStats {
    services
        .lifecycle
        .index_directory(root, false)
        .await
        .expect("Failed to index project")
}

/// Assert that build stats are internally consistent.
#[allow(dead_code)] // Used in integration tests
pub fn assert_valid_stats(stats: &BuildStats) {
    assert!(
        stats.files_scanned >= stats.files_indexed,
        "files_scanned ({}) should cover files_indexed ({})",
        stats.files_scanned,
        stats.files_indexed
    );
    assert!(
        stats.documents_created > 0,
        "Expected documents_created > 0, got {}",
        stats.documents_created
    );
    assert!(
        stats.collection.starts_with("codebase-index-"),
        "Collection name should carry the standard prefix: {}",
        stats.collection
    );
}
