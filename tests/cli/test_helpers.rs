//! CLI test helpers
//!
//! Thin wrappers over the shared fixtures matching what the CLI
//! execute() functions expect: an `Arc<Services>` plus an already
//! indexed collection to operate on.

use crate::common::index_project;
use lodestar::core::services::Services;
use std::path::Path;
use std::sync::Arc;

/// Index a project directory and return the derived collection name.
pub async fn setup_indexed_collection(services: &Arc<Services>, root: &Path) -> String {
    index_project(services, root).await.collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{create_test_services, TestProject};
    use lodestar::core::lifecycle::CollectionState;

    #[tokio::test]
    async fn test_setup_indexed_collection() {
        let (services, _state) = create_test_services();
        let project = TestProject::flask("webapp");

        let collection = setup_indexed_collection(&services, project.path()).await;

        assert_eq!(collection, "codebase-index-webapp");
        assert_eq!(
            services.lifecycle.state(&collection).await,
            CollectionState::Ready
        );
    }
}
