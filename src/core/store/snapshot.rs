//! Immutable collection snapshots and ranking.
//!
//! A snapshot is the unit of consistency for queries: every query
//! clones one `Arc<CollectionSnapshot>` and ranks against it, so
//! concurrent builds and clears never change what an in-flight query
//! sees. Builds produce a new snapshot from the old one plus the
//! changes, and the store swaps the `Arc` in one step.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::core::types::Document;

/// One document with its query score.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// Immutable set of documents for one collection.
#[derive(Debug, Default)]
pub struct CollectionSnapshot {
    documents: Vec<Document>,
    by_id: HashMap<String, usize>,
}

impl CollectionSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from documents. Later duplicates of an id win.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let mut snapshot = Self::empty();
        for document in documents {
            snapshot.insert(document);
        }
        snapshot
    }

    /// New snapshot with `documents` upserted over this one.
    pub fn with_upserts(&self, documents: Vec<Document>) -> Self {
        let mut snapshot = Self::from_documents(self.documents.clone());
        for document in documents {
            snapshot.insert(document);
        }
        snapshot
    }

    /// New snapshot without any documents from the given files.
    ///
    /// Project-level documents have an empty `file_path` and are never
    /// removed this way.
    pub fn without_files(&self, file_paths: &HashSet<String>) -> Self {
        let remaining: Vec<Document> = self
            .documents
            .iter()
            .filter(|d| d.file_path.is_empty() || !file_paths.contains(&d.file_path))
            .cloned()
            .collect();
        Self::from_documents(remaining)
    }

    fn insert(&mut self, document: Document) {
        match self.by_id.get(&document.id) {
            Some(&index) => self.documents[index] = document,
            None => {
                self.by_id.insert(document.id.clone(), self.documents.len());
                self.documents.push(document);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&index| &self.documents[index])
    }

    /// Rank documents against a query embedding.
    ///
    /// Documents scoring below `threshold` are dropped; the rest are
    /// ordered by score, then document priority, then line number,
    /// then path and id so equal scores rank deterministically.
    pub fn rank(
        &self,
        embedding: &[f32],
        threshold: f32,
        max_results: usize,
    ) -> Vec<ScoredDocument> {
        let mut scored: Vec<ScoredDocument> = self
            .documents
            .iter()
            .map(|document| ScoredDocument {
                score: cosine_similarity(embedding, &document.embedding),
                document: document.clone(),
            })
            .filter(|s| s.score >= threshold)
            .collect();

        scored.sort_unstable_by(compare_ranked);
        scored.truncate(max_results);
        scored
    }

    /// Rank documents by keyword overlap with the query terms.
    ///
    /// The score is the fraction of query terms present in the
    /// document content (case-insensitive). Documents matching no
    /// term are dropped.
    pub fn keyword_rank(&self, query: &str, max_results: usize) -> Vec<ScoredDocument> {
        let terms: Vec<String> = {
            let mut seen = HashSet::new();
            query
                .to_lowercase()
                .split_whitespace()
                .filter(|t| seen.insert(t.to_string()))
                .map(|t| t.to_string())
                .collect()
        };
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredDocument> = self
            .documents
            .iter()
            .filter_map(|document| {
                let content = document.content.to_lowercase();
                let matched = terms.iter().filter(|t| content.contains(t.as_str())).count();
                if matched == 0 {
                    return None;
                }
                Some(ScoredDocument {
                    score: matched as f32 / terms.len() as f32,
                    document: document.clone(),
                })
            })
            .collect();

        scored.sort_unstable_by(compare_ranked);
        scored.truncate(max_results);
        scored
    }
}

fn compare_ranked(a: &ScoredDocument, b: &ScoredDocument) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.document
                .doc_type
                .priority()
                .cmp(&b.document.doc_type.priority())
        })
        .then_with(|| a.document.sort_line().cmp(&b.document.sort_line()))
        .then_with(|| a.document.file_path.cmp(&b.document.file_path))
        .then_with(|| a.document.id.cmp(&b.document.id))
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when the vectors differ in length or either is empty,
/// so stale embeddings degrade to "no match" instead of failing.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}
