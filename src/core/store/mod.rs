//! Document storage for indexed collections.
//!
//! The store keeps one immutable [`CollectionSnapshot`] per collection
//! behind an async `RwLock`, and mirrors each collection to disk as a
//! `documents.json` inside its collection directory. Queries clone the
//! snapshot `Arc` and never observe a build or clear mid-flight; every
//! mutation persists the new snapshot first and swaps it in afterwards,
//! so a failed write leaves both memory and disk on the previous state.
//!
//! Callers serialize builds per collection at the lifecycle layer; the
//! store itself only guarantees that each individual swap is atomic.

pub mod snapshot;

pub use snapshot::{cosine_similarity, CollectionSnapshot, ScoredDocument};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::error::{LodestarError, Result};
use crate::core::types::Document;

/// Filename for the serialized documents inside a collection directory.
pub const DOCUMENTS_FILE: &str = "documents.json";

/// Collection-scoped document storage with disk mirroring.
pub struct DocumentStore {
    storage_root: PathBuf,
    collections: RwLock<HashMap<String, Arc<CollectionSnapshot>>>,
}

impl DocumentStore {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            collections: RwLock::new(HashMap::new()),
        }
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// Directory holding everything for one collection (documents,
    /// manifest, metadata).
    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.storage_root.join(collection)
    }

    fn documents_path(&self, collection: &str) -> PathBuf {
        self.collection_dir(collection).join(DOCUMENTS_FILE)
    }

    /// Load every collection found under the storage root.
    ///
    /// A collection directory without a readable `documents.json` is
    /// skipped with a warning rather than failing startup; the
    /// lifecycle layer treats such a collection as absent.
    pub async fn load_from_disk(&self) -> Result<usize> {
        if !self.storage_root.exists() {
            return Ok(0);
        }

        let mut loaded = 0;
        for entry in fs::read_dir(&self.storage_root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path().join(DOCUMENTS_FILE);
            if !path.is_file() {
                continue;
            }

            let documents: Vec<Document> = match fs::read_to_string(&path)
                .map_err(LodestarError::from)
                .and_then(|text| serde_json::from_str(&text).map_err(LodestarError::from))
            {
                Ok(documents) => documents,
                Err(e) => {
                    tracing::warn!("Skipping unreadable collection {}: {}", name, e);
                    continue;
                }
            };

            let snapshot = Arc::new(CollectionSnapshot::from_documents(documents));
            self.collections.write().await.insert(name, snapshot);
            loaded += 1;
        }

        if loaded > 0 {
            tracing::info!("Loaded {} collection(s) from {:?}", loaded, self.storage_root);
        }
        Ok(loaded)
    }

    pub async fn collection_exists(&self, collection: &str) -> bool {
        self.collections.read().await.contains_key(collection)
    }

    /// Current snapshot of a collection, if it exists.
    pub async fn snapshot(&self, collection: &str) -> Option<Arc<CollectionSnapshot>> {
        self.collections.read().await.get(collection).cloned()
    }

    pub async fn document_count(&self, collection: &str) -> Option<usize> {
        self.snapshot(collection).await.map(|s| s.len())
    }

    /// Collection names with their document counts, sorted by name.
    pub async fn list_collections(&self) -> Vec<(String, usize)> {
        let mut collections: Vec<(String, usize)> = self
            .collections
            .read()
            .await
            .iter()
            .map(|(name, snapshot)| (name.clone(), snapshot.len()))
            .collect();
        collections.sort();
        collections
    }

    /// Upsert documents into a collection, creating it if needed.
    pub async fn upsert(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        let base = self
            .snapshot(collection)
            .await
            .unwrap_or_else(|| Arc::new(CollectionSnapshot::empty()));
        let next = Arc::new(base.with_upserts(documents));
        self.commit(collection, next).await
    }

    /// Apply one finished build: drop documents of changed or deleted
    /// files, then upsert the freshly produced documents, as a single
    /// snapshot swap.
    pub async fn apply_build(
        &self,
        collection: &str,
        removed_files: &HashSet<String>,
        documents: Vec<Document>,
    ) -> Result<usize> {
        let base = self
            .snapshot(collection)
            .await
            .unwrap_or_else(|| Arc::new(CollectionSnapshot::empty()));
        let next = Arc::new(base.without_files(removed_files).with_upserts(documents));
        self.commit(collection, next).await
    }

    /// Replace a collection's contents wholesale (forced re-index).
    pub async fn replace_collection(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize> {
        let next = Arc::new(CollectionSnapshot::from_documents(documents));
        self.commit(collection, next).await
    }

    /// Remove a collection from memory and disk.
    ///
    /// In-flight queries that already hold the old snapshot finish
    /// against it; queries issued after this returns see the
    /// collection as absent.
    pub async fn clear(&self, collection: &str) -> Result<()> {
        let removed = self.collections.write().await.remove(collection).is_some();

        let dir = self.collection_dir(collection);
        let on_disk = dir.exists();
        if on_disk {
            fs::remove_dir_all(&dir)?;
        }

        if !removed && !on_disk {
            return Err(LodestarError::CollectionNotFound(collection.to_string()));
        }

        tracing::info!("Cleared collection: {}", collection);
        Ok(())
    }

    /// Rank a collection's documents against a query embedding.
    ///
    /// `threshold` must be within `[0.0, 1.0]`; documents scoring below
    /// it are dropped.
    pub async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        threshold: f32,
        max_results: usize,
    ) -> Result<Vec<ScoredDocument>> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LodestarError::InvalidThreshold(threshold));
        }

        let snapshot = self
            .snapshot(collection)
            .await
            .ok_or_else(|| LodestarError::CollectionNotFound(collection.to_string()))?;
        Ok(snapshot.rank(embedding, threshold, max_results))
    }

    /// Rank a collection's documents by keyword overlap with the query.
    pub async fn keyword_query(
        &self,
        collection: &str,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let snapshot = self
            .snapshot(collection)
            .await
            .ok_or_else(|| LodestarError::CollectionNotFound(collection.to_string()))?;
        Ok(snapshot.keyword_rank(query, max_results))
    }

    /// Persist a snapshot, then swap it in. Persist failures leave the
    /// previous snapshot untouched.
    async fn commit(&self, collection: &str, next: Arc<CollectionSnapshot>) -> Result<usize> {
        self.persist(collection, &next)?;
        let count = next.len();
        self.collections
            .write()
            .await
            .insert(collection.to_string(), next);
        Ok(count)
    }

    fn persist(&self, collection: &str, snapshot: &CollectionSnapshot) -> Result<()> {
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir)?;

        let path = self.documents_path(collection);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(snapshot.documents())?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, DocumentStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(temp.path().join("collections"));
        (temp, store)
    }

    fn embedded(mut doc: Document, embedding: Vec<f32>) -> Document {
        doc.embedding = embedding;
        doc
    }

    #[tokio::test]
    async fn test_upsert_creates_collection() {
        let (_temp, store) = store();

        let count = store
            .upsert(
                "codebase-index-app",
                vec![Document::file_summary("a.py", "summary")],
            )
            .await
            .unwrap();

        assert_eq!(count, 1);
        assert!(store.collection_exists("codebase-index-app").await);
        assert_eq!(store.document_count("codebase-index-app").await, Some(1));
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_for_same_ids() {
        let (_temp, store) = store();
        let docs = vec![
            Document::file_summary("a.py", "summary"),
            Document::endpoint("a.py", 3, "/users", "@app.route('/users')"),
        ];

        store.upsert("codebase-index-app", docs.clone()).await.unwrap();
        let count = store.upsert("codebase-index-app", docs).await.unwrap();

        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_query_ranks_by_similarity() {
        let (_temp, store) = store();
        store
            .upsert(
                "codebase-index-app",
                vec![
                    embedded(Document::file_summary("near.py", "near"), vec![1.0, 0.0]),
                    embedded(Document::file_summary("far.py", "far"), vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();

        let results = store
            .query("codebase-index-app", &[1.0, 0.0], 0.0, 10)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.file_path, "near.py");
    }

    #[tokio::test]
    async fn test_query_invalid_threshold() {
        let (_temp, store) = store();
        store
            .upsert("codebase-index-app", vec![Document::file_summary("a.py", "s")])
            .await
            .unwrap();

        let too_high = store
            .query("codebase-index-app", &[1.0], 1.5, 10)
            .await;
        assert!(matches!(too_high, Err(LodestarError::InvalidThreshold(_))));

        let negative = store
            .query("codebase-index-app", &[1.0], -0.1, 10)
            .await;
        assert!(matches!(negative, Err(LodestarError::InvalidThreshold(_))));
    }

    #[tokio::test]
    async fn test_query_unknown_collection() {
        let (_temp, store) = store();
        let result = store.query("codebase-index-ghost", &[1.0], 0.5, 10).await;
        assert!(matches!(result, Err(LodestarError::CollectionNotFound(_))));
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let (_temp, store) = store();
        store
            .upsert(
                "codebase-index-alpha",
                vec![embedded(
                    Document::file_summary("alpha.py", "alpha only"),
                    vec![1.0],
                )],
            )
            .await
            .unwrap();
        store
            .upsert(
                "codebase-index-beta",
                vec![embedded(
                    Document::file_summary("beta.py", "beta only"),
                    vec![1.0],
                )],
            )
            .await
            .unwrap();

        let alpha = store
            .query("codebase-index-alpha", &[1.0], 0.0, 10)
            .await
            .unwrap();
        assert_eq!(alpha.len(), 1);
        assert_eq!(alpha[0].document.file_path, "alpha.py");
    }

    #[tokio::test]
    async fn test_clear_then_query_not_found() {
        let (_temp, store) = store();
        store
            .upsert("codebase-index-app", vec![Document::file_summary("a.py", "s")])
            .await
            .unwrap();

        store.clear("codebase-index-app").await.unwrap();

        let result = store.query("codebase-index-app", &[1.0], 0.0, 10).await;
        assert!(matches!(result, Err(LodestarError::CollectionNotFound(_))));
        assert!(!store.collection_dir("codebase-index-app").exists());
    }

    #[tokio::test]
    async fn test_clear_unknown_collection() {
        let (_temp, store) = store();
        let result = store.clear("codebase-index-ghost").await;
        assert!(matches!(result, Err(LodestarError::CollectionNotFound(_))));
    }

    #[tokio::test]
    async fn test_snapshot_isolation_across_clear() {
        let (_temp, store) = store();
        store
            .upsert(
                "codebase-index-app",
                vec![embedded(Document::file_summary("a.py", "s"), vec![1.0])],
            )
            .await
            .unwrap();

        // A query in flight holds the snapshot from before the clear
        let held = store.snapshot("codebase-index-app").await.unwrap();
        store.clear("codebase-index-app").await.unwrap();

        assert_eq!(held.len(), 1);
        assert!(!store.collection_exists("codebase-index-app").await);
    }

    #[tokio::test]
    async fn test_apply_build_drops_stale_file_documents() {
        let (_temp, store) = store();
        store
            .upsert(
                "codebase-index-app",
                vec![
                    Document::endpoint("a.py", 3, "/old", "@app.route('/old')"),
                    Document::endpoint("a.py", 9, "/gone", "@app.route('/gone')"),
                    Document::file_summary("a.py", "old summary"),
                    Document::file_summary("keep.py", "untouched"),
                ],
            )
            .await
            .unwrap();

        // a.py was re-chunked and now has a single endpoint at line 5
        let changed: HashSet<String> = ["a.py".to_string()].into_iter().collect();
        let count = store
            .apply_build(
                "codebase-index-app",
                &changed,
                vec![
                    Document::endpoint("a.py", 5, "/new", "@app.route('/new')"),
                    Document::file_summary("a.py", "new summary"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(count, 3);
        let snapshot = store.snapshot("codebase-index-app").await.unwrap();
        assert!(snapshot.get("a.py#endpoint@9").is_none());
        assert!(snapshot.get("a.py#endpoint@5").is_some());
        assert_eq!(snapshot.get("a.py#summary").unwrap().content, "new summary");
        assert!(snapshot.get("keep.py#summary").is_some());
    }

    #[tokio::test]
    async fn test_replace_collection_discards_previous_contents() {
        let (_temp, store) = store();
        store
            .upsert(
                "codebase-index-app",
                vec![Document::file_summary("old.py", "old")],
            )
            .await
            .unwrap();

        store
            .replace_collection(
                "codebase-index-app",
                vec![Document::file_summary("new.py", "new")],
            )
            .await
            .unwrap();

        let snapshot = store.snapshot("codebase-index-app").await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("old.py#summary").is_none());
        assert!(snapshot.get("new.py#summary").is_some());
    }

    #[tokio::test]
    async fn test_persistence_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("collections");

        {
            let store = DocumentStore::new(&root);
            store
                .upsert(
                    "codebase-index-app",
                    vec![embedded(
                        Document::endpoint("a.py", 3, "/users", "@app.route('/users')"),
                        vec![0.5, 0.5],
                    )],
                )
                .await
                .unwrap();
        }

        let reopened = DocumentStore::new(&root);
        let loaded = reopened.load_from_disk().await.unwrap();
        assert_eq!(loaded, 1);

        let snapshot = reopened.snapshot("codebase-index-app").await.unwrap();
        let doc = snapshot.get("a.py#endpoint@3").unwrap();
        assert_eq!(doc.embedding, vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn test_load_skips_corrupt_collection() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("collections");

        let good = root.join("codebase-index-good");
        fs::create_dir_all(&good).unwrap();
        fs::write(
            good.join(DOCUMENTS_FILE),
            serde_json::to_string(&vec![Document::file_summary("a.py", "s")]).unwrap(),
        )
        .unwrap();

        let bad = root.join("codebase-index-bad");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join(DOCUMENTS_FILE), "not json at all").unwrap();

        let store = DocumentStore::new(&root);
        let loaded = store.load_from_disk().await.unwrap();

        assert_eq!(loaded, 1);
        assert!(store.collection_exists("codebase-index-good").await);
        assert!(!store.collection_exists("codebase-index-bad").await);
    }

    #[tokio::test]
    async fn test_list_collections_sorted_with_counts() {
        let (_temp, store) = store();
        store
            .upsert("codebase-index-zeta", vec![Document::file_summary("z.py", "z")])
            .await
            .unwrap();
        store
            .upsert(
                "codebase-index-alpha",
                vec![
                    Document::file_summary("a.py", "a"),
                    Document::file_summary("b.py", "b"),
                ],
            )
            .await
            .unwrap();

        let listed = store.list_collections().await;
        assert_eq!(
            listed,
            vec![
                ("codebase-index-alpha".to_string(), 2),
                ("codebase-index-zeta".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_persist_leaves_no_temp_file() {
        let (_temp, store) = store();
        store
            .upsert("codebase-index-app", vec![Document::file_summary("a.py", "s")])
            .await
            .unwrap();

        let names: Vec<String> = fs::read_dir(store.collection_dir("codebase-index-app"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![DOCUMENTS_FILE.to_string()]);
    }
}
