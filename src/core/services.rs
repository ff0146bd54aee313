//! Unified service container for Lodestar
//!
//! Provides shared access to all core services.

use crate::core::capability::CapabilityClient;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::lifecycle::LifecycleManager;
use crate::core::search::SearchService;
use crate::core::store::DocumentStore;
use std::sync::Arc;

/// Unified services container
///
/// All adapters use this same struct for service access.
#[derive(Clone)]
pub struct Services {
    /// Document store holding every collection
    pub store: Arc<DocumentStore>,

    /// Classification/embedding client with local fallback
    pub capability: Arc<CapabilityClient>,

    /// Search service for vector and hybrid queries
    pub search: Arc<SearchService>,

    /// Lifecycle manager coordinating builds
    pub lifecycle: Arc<LifecycleManager>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(DocumentStore::new(config.storage.state_dir.clone()));
        let capability = Arc::new(CapabilityClient::from_config(&config.capability)?);

        let search = Arc::new(SearchService::new(
            config.search.clone(),
            Arc::clone(&store),
            Arc::clone(&capability),
        ));

        let lifecycle = Arc::new(LifecycleManager::new(
            config.clone(),
            Arc::clone(&store),
            Arc::clone(&capability),
        ));

        Ok(Self {
            store,
            capability,
            search,
            lifecycle,
            config: Arc::new(config),
        })
    }

    /// Load persisted collections into memory. Called once at startup;
    /// returns the number of collections found.
    pub async fn load_collections(&self) -> Result<usize> {
        self.store.load_from_disk().await
    }
}
