//! Semantic search over indexed collections.
//!
//! Plain search embeds the query and ranks documents by cosine
//! similarity. Hybrid search first runs the query planner (intent
//! classification plus framework-aware expansion), retrieves with the
//! expanded query, and supplements thin vector results with keyword
//! matches. Both return ranked results; hybrid additionally returns
//! the planning trace.

mod planner;

pub use planner::{classify_intent, plan};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::core::capability::CapabilityClient;
use crate::core::config::SearchConfig;
use crate::core::error::{LodestarError, Result};
use crate::core::lifecycle::meta::{CollectionMeta, META_FILE};
use crate::core::store::DocumentStore;
use crate::core::types::{
    HybridSearchResponse, Project, SearchResponse, SearchResult,
};

/// Query execution over the document store.
pub struct SearchService {
    config: SearchConfig,
    store: Arc<DocumentStore>,
    capability: Arc<CapabilityClient>,
}

impl SearchService {
    pub fn new(
        config: SearchConfig,
        store: Arc<DocumentStore>,
        capability: Arc<CapabilityClient>,
    ) -> Self {
        Self {
            config,
            store,
            capability,
        }
    }

    /// Execute a plain semantic search.
    ///
    /// `threshold` and `max_results` fall back to the configured
    /// defaults; `max_results` is capped at the configured maximum.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        threshold: Option<f32>,
        max_results: Option<usize>,
    ) -> Result<SearchResponse> {
        let start = Instant::now();

        self.validate_query(query)?;
        let threshold = threshold.unwrap_or(self.config.default_threshold);
        let limit = self.result_limit(max_results);

        let embedding = self.capability.embed_query(query).await;
        let scored = self
            .store
            .query(collection, &embedding, threshold, limit)
            .await?;

        let results: Vec<SearchResult> = scored
            .iter()
            .map(|s| SearchResult::from_document(&s.document, s.score))
            .collect();

        let count = results.len();
        tracing::debug!(
            "Search in {} returned {} result(s) for {:?}",
            collection,
            count,
            query
        );

        Ok(SearchResponse {
            query: query.to_string(),
            results,
            count,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Execute a hybrid search: plan, retrieve with the expanded
    /// query, and supplement with keyword matches when the vector
    /// pass returns fewer results than requested.
    pub async fn hybrid_search(
        &self,
        collection: &str,
        query: &str,
        max_results: Option<usize>,
    ) -> Result<HybridSearchResponse> {
        let start = Instant::now();

        self.validate_query(query)?;
        let limit = self.result_limit(max_results);

        let project = self.load_project(collection);
        let analysis = planner::plan(query, project.as_ref());
        tracing::debug!(
            "Query intent {} with {} added term(s)",
            analysis.intent.as_str(),
            analysis.added_terms.len()
        );

        let embedding = self.capability.embed_query(&analysis.expanded_query).await;
        let mut hits = self
            .store
            .query(
                collection,
                &embedding,
                self.config.default_threshold,
                limit,
            )
            .await?;

        let mut used_keyword_fallback = false;
        if hits.len() < limit {
            let seen: HashSet<String> = hits.iter().map(|s| s.document.id.clone()).collect();
            let keyword = self
                .store
                .keyword_query(collection, &analysis.expanded_query, limit)
                .await?;

            for hit in keyword {
                if hits.len() >= limit {
                    break;
                }
                if seen.contains(&hit.document.id) {
                    continue;
                }
                used_keyword_fallback = true;
                hits.push(hit);
            }
        }

        let vector_results: Vec<SearchResult> = hits
            .iter()
            .map(|s| SearchResult::from_document(&s.document, s.score))
            .collect();

        Ok(HybridSearchResponse {
            query: query.to_string(),
            vector_results,
            ai_analysis: analysis,
            used_keyword_fallback,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn validate_query(&self, query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(LodestarError::InvalidQuery(
                "Query cannot be empty".to_string(),
            ));
        }
        if query.len() > self.config.max_query_length {
            return Err(LodestarError::InvalidQuery(format!(
                "Query exceeds maximum length of {} characters",
                self.config.max_query_length
            )));
        }
        Ok(())
    }

    fn result_limit(&self, max_results: Option<usize>) -> usize {
        max_results
            .unwrap_or(self.config.default_max_results)
            .min(self.config.max_results)
            .max(1)
    }

    /// Project analysis from the collection metadata, when a build has
    /// recorded one. Absence just disables query expansion.
    fn load_project(&self, collection: &str) -> Option<Project> {
        let path = self.store.collection_dir(collection).join(META_FILE);
        CollectionMeta::try_load(&path).and_then(|meta| meta.project)
    }
}
