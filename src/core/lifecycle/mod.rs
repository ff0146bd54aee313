//! Collection lifecycle: build orchestration and state transitions.
//!
//! A collection moves between three states. It starts absent, enters
//! building when a build claims it, and becomes ready once a build
//! completes and writes the manifest. Re-indexing a ready collection
//! moves it back through building; only an explicit cancellation (or a
//! clear) returns it to absent. The manifest file doubles as the
//! persistent ready marker, so state survives restarts without a
//! separate registry.
//!
//! A build runs in stages:
//! 1. Resolve the root and check it against the recorded root mapping
//! 2. Scan the tree and diff it against the manifest
//! 3. Analyze the project (manifests, imports, classification)
//! 4. Chunk and embed changed files on a bounded worker pool
//! 5. Swap the new documents into the store in one step
//! 6. Write the manifest and metadata
//!
//! Everything that can fail happens before step 5, so a failed build
//! leaves the previous ready state fully intact. A forced re-index
//! instead invalidates the manifest up front: if it then fails, the
//! collection honestly reports absent rather than serving a state it
//! can no longer reproduce.

pub mod meta;
pub mod naming;

pub use meta::{CollectionMeta, META_FILE, SCHEMA_VERSION};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::core::analyzer::ProjectAnalyzer;
use crate::core::capability::CapabilityClient;
use crate::core::chunker::LanguageChunker;
use crate::core::config::Config;
use crate::core::context::IndexContext;
use crate::core::error::{LodestarError, Result};
use crate::core::scanner::manifest::{IndexManifest, MANIFEST_FILE};
use crate::core::scanner::FileScanner;
use crate::core::store::DocumentStore;
use crate::core::types::{BuildStats, CollectionInfo, Document, DocumentType, ScannedFile};

/// Observable lifecycle state of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    /// Never built, cleared, or its last build was cancelled
    Absent,
    /// A build currently holds the collection
    Building,
    /// At least one build has completed
    Ready,
}

impl CollectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionState::Absent => "absent",
            CollectionState::Building => "building",
            CollectionState::Ready => "ready",
        }
    }
}

/// Per-file result from the chunking pool.
enum FileOutcome {
    Chunked(Vec<Document>),
    Skipped,
    Cancelled,
}

/// Coordinates builds, cancellation, and collection state.
pub struct LifecycleManager {
    config: Config,
    store: Arc<DocumentStore>,
    capability: Arc<CapabilityClient>,

    /// Cancellation flags for in-flight builds, one per collection.
    /// Presence of an entry is what makes a collection "building".
    active: Mutex<HashMap<String, Arc<AtomicBool>>>,
}

impl LifecycleManager {
    pub fn new(config: Config, store: Arc<DocumentStore>, capability: Arc<CapabilityClient>) -> Self {
        Self {
            config,
            store,
            capability,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Current state of a collection.
    pub async fn state(&self, collection: &str) -> CollectionState {
        if self.active.lock().await.contains_key(collection) {
            return CollectionState::Building;
        }
        if self.manifest_path(collection).is_file() {
            return CollectionState::Ready;
        }
        CollectionState::Absent
    }

    /// Index a directory into its collection.
    ///
    /// `force` discards the manifest and rebuilds from scratch;
    /// otherwise unchanged files (by content hash) are reused. At most
    /// one build runs per collection; builds for different collections
    /// proceed concurrently.
    pub async fn index_directory(&self, path: &Path, force: bool) -> Result<BuildStats> {
        let ctx = IndexContext::resolve(path)?;
        let collection = ctx.collection().to_string();

        self.check_root_mapping(&ctx)?;

        let cancel = self.claim_build(&collection).await?;
        let result = self.run_build(&ctx, force, &cancel).await;
        self.active.lock().await.remove(&collection);

        match result {
            Ok(stats) => {
                tracing::info!(
                    "Build complete for {}: {} document(s), {} endpoint(s) in {}ms",
                    collection,
                    stats.documents_created,
                    stats.endpoints_found,
                    stats.duration_ms
                );
                Ok(stats)
            }
            Err(LodestarError::BuildCancelled(name)) => {
                // A cancelled build reverts the collection to absent
                let _ = fs::remove_file(self.manifest_path(&collection));
                tracing::info!("Build cancelled for {}", collection);
                Err(LodestarError::BuildCancelled(name))
            }
            Err(e) => {
                tracing::warn!("Build failed for {}: {}", collection, e);
                Err(wrap_build_error(&collection, e))
            }
        }
    }

    /// Signal the running build for a collection to stop. Returns
    /// whether a build was actually running.
    pub async fn cancel_build(&self, collection: &str) -> bool {
        match self.active.lock().await.get(collection) {
            Some(flag) => {
                flag.store(true, Ordering::SeqCst);
                tracing::info!("Cancellation requested for {}", collection);
                true
            }
            None => false,
        }
    }

    /// Remove a collection entirely (documents, manifest, metadata).
    ///
    /// Returns the number of documents removed. A collection with a
    /// build in flight cannot be cleared; cancel the build first.
    pub async fn clear_collection(&self, collection: &str) -> Result<usize> {
        if self.active.lock().await.contains_key(collection) {
            return Err(LodestarError::BuildInProgress(collection.to_string()));
        }
        let removed = self.store.document_count(collection).await.unwrap_or(0);
        self.store.clear(collection).await?;
        Ok(removed)
    }

    /// Known collections with document counts and build metadata.
    pub async fn list_collections(&self) -> Vec<CollectionInfo> {
        let mut infos = Vec::new();
        for (name, documents) in self.store.list_collections().await {
            let (root_path, updated_at) = match CollectionMeta::try_load(&self.meta_path(&name)) {
                Some(meta) => (
                    meta.root_path.display().to_string(),
                    meta.updated_at.to_rfc3339(),
                ),
                None => (String::new(), String::new()),
            };
            infos.push(CollectionInfo {
                name,
                root_path,
                documents,
                updated_at,
            });
        }
        infos
    }

    /// Metadata for one collection, when a build has recorded it.
    pub fn collection_meta(&self, collection: &str) -> Option<CollectionMeta> {
        CollectionMeta::try_load(&self.meta_path(collection))
    }

    fn manifest_path(&self, collection: &str) -> PathBuf {
        self.store.collection_dir(collection).join(MANIFEST_FILE)
    }

    fn meta_path(&self, collection: &str) -> PathBuf {
        self.store.collection_dir(collection).join(META_FILE)
    }

    /// Two roots whose final segment normalizes identically must not
    /// share a collection.
    fn check_root_mapping(&self, ctx: &IndexContext) -> Result<()> {
        if let Some(existing) = CollectionMeta::try_load(&self.meta_path(ctx.collection())) {
            if existing.root_path != ctx.root_path() {
                return Err(LodestarError::AmbiguousCollectionName {
                    name: ctx.collection().to_string(),
                    existing_root: existing.root_path.display().to_string(),
                    requested_root: ctx.root_path().display().to_string(),
                });
            }
        }
        Ok(())
    }

    async fn claim_build(&self, collection: &str) -> Result<Arc<AtomicBool>> {
        let mut active = self.active.lock().await;
        if active.contains_key(collection) {
            return Err(LodestarError::BuildInProgress(collection.to_string()));
        }
        let cancel = Arc::new(AtomicBool::new(false));
        active.insert(collection.to_string(), Arc::clone(&cancel));
        Ok(cancel)
    }

    async fn run_build(
        &self,
        ctx: &IndexContext,
        force: bool,
        cancel: &Arc<AtomicBool>,
    ) -> Result<BuildStats> {
        let start = Instant::now();
        let collection = ctx.collection();
        let manifest_path = self.manifest_path(collection);

        if force && manifest_path.exists() {
            fs::remove_file(&manifest_path)?;
            tracing::info!("Forced re-index of {}: manifest invalidated", collection);
        }

        let scanner = FileScanner::from_config(&self.config.indexing)?;
        let files = scanner.scan(ctx.root_path())?;
        tracing::info!("Scanned {} file(s) under {:?}", files.len(), ctx.root_path());

        let manifest = IndexManifest::load(&manifest_path)?;
        let diff = manifest.diff(&files);
        tracing::info!(
            "Collection {}: {} file(s) to index, {} unchanged, {} removed",
            collection,
            diff.to_index.len(),
            diff.unchanged.len(),
            diff.removed.len()
        );

        let analyzer = ProjectAnalyzer::new(Arc::clone(&self.capability));
        let report = analyzer.analyze(ctx, &files).await;

        let (mut documents, files_skipped) = self.chunk_files(ctx, &diff.to_index, cancel).await?;
        let endpoints_found = documents
            .iter()
            .filter(|d| matches!(d.doc_type, DocumentType::RestApiEndpoint { .. }))
            .count();

        // Project-level documents are rewritten on every build
        let mut project_docs = report.documents;
        embed_documents(&self.capability, &mut project_docs).await;
        documents.extend(project_docs);

        if cancel.load(Ordering::SeqCst) {
            return Err(LodestarError::BuildCancelled(collection.to_string()));
        }

        // Single snapshot swap; queries either see the old build or
        // the new one, never a mix
        let documents_created = if force {
            self.store.replace_collection(collection, documents).await?
        } else {
            let removed_files: HashSet<String> = diff
                .removed
                .iter()
                .cloned()
                .chain(diff.to_index.iter().map(|f| f.relative_path.clone()))
                .collect();
            self.store
                .apply_build(collection, &removed_files, documents)
                .await?
        };

        let mut new_manifest = IndexManifest::new();
        for file in &files {
            new_manifest.record(&file.relative_path, &file.content_hash);
        }
        new_manifest.save(&manifest_path)?;

        let stats = BuildStats {
            collection: collection.to_string(),
            files_scanned: files.len(),
            files_indexed: diff.to_index.len().saturating_sub(files_skipped),
            files_skipped,
            documents_created,
            endpoints_found,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        let meta_path = self.meta_path(collection);
        let mut meta = CollectionMeta::try_load(&meta_path)
            .unwrap_or_else(|| CollectionMeta::new(collection, ctx.root_path()));
        meta.project = Some(report.project);
        meta.last_build = Some(stats.clone());
        meta.touch();
        meta.save(&meta_path)?;

        Ok(stats)
    }

    /// Chunk and embed files on a worker pool bounded by the
    /// configured worker count. Unreadable files are skipped and
    /// counted; a cancellation abandons the remaining queue.
    async fn chunk_files(
        &self,
        ctx: &IndexContext,
        files: &[ScannedFile],
        cancel: &Arc<AtomicBool>,
    ) -> Result<(Vec<Document>, usize)> {
        if files.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let semaphore = Arc::new(Semaphore::new(self.config.indexing.workers.max(1)));
        let chunker = Arc::new(LanguageChunker::from_config(&self.config.indexing));
        let mut workers = JoinSet::new();

        for file in files.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let chunker = Arc::clone(&chunker);
            let capability = Arc::clone(&self.capability);
            let cancel = Arc::clone(cancel);

            workers.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return FileOutcome::Cancelled,
                };
                if cancel.load(Ordering::SeqCst) {
                    return FileOutcome::Cancelled;
                }

                let content = match fs::read_to_string(&file.path) {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::warn!("Skipping unreadable file {}: {}", file.relative_path, e);
                        return FileOutcome::Skipped;
                    }
                };

                let mut documents = chunker.chunk_file(&file.relative_path, &content);
                embed_documents(&capability, &mut documents).await;
                FileOutcome::Chunked(documents)
            });
        }

        let mut documents = Vec::new();
        let mut skipped = 0;
        let mut cancelled = false;

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(FileOutcome::Chunked(docs)) => documents.extend(docs),
                Ok(FileOutcome::Skipped) => skipped += 1,
                Ok(FileOutcome::Cancelled) => cancelled = true,
                Err(e) => {
                    tracing::warn!("Chunking task failed: {}", e);
                    skipped += 1;
                }
            }
        }

        if cancelled || cancel.load(Ordering::SeqCst) {
            return Err(LodestarError::BuildCancelled(ctx.collection().to_string()));
        }

        Ok((documents, skipped))
    }
}

/// Fill in embeddings for a batch of documents.
async fn embed_documents(capability: &CapabilityClient, documents: &mut [Document]) {
    if documents.is_empty() {
        return;
    }
    let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
    let vectors = capability.embed(&texts).await;
    for (doc, vector) in documents.iter_mut().zip(vectors) {
        doc.embedding = vector;
    }
}

/// Internal failures surface as `BuildFailed` with the collection
/// attached; domain errors pass through unchanged.
fn wrap_build_error(collection: &str, error: LodestarError) -> LodestarError {
    match error {
        LodestarError::IoError(_)
        | LodestarError::SerdeError(_)
        | LodestarError::StorageError(_)
        | LodestarError::TomlError(_)
        | LodestarError::HttpError(_) => LodestarError::BuildFailed {
            collection: collection.to_string(),
            reason: error.to_string(),
        },
        other => other,
    }
}
