//! Collection metadata persisted next to the documents.
//!
//! `meta.json` records which root a collection indexes, when it was
//! last built, and the project analysis produced during that build.
//! The root path is what detects collisions: two different roots whose
//! final path segment normalizes to the same collection name must not
//! share a collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{LodestarError, Result};
use crate::core::types::{BuildStats, Project};

/// Metadata filename inside a collection directory.
pub const META_FILE: &str = "meta.json";

/// Current metadata schema version. Collections written by an
/// incompatible schema are treated as absent and rebuilt.
pub const SCHEMA_VERSION: u32 = 1;

/// Per-collection metadata stored as `meta.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMeta {
    pub schema_version: u32,

    /// Collection name (including the "codebase-index-" prefix)
    pub name: String,

    /// Canonical root directory this collection indexes
    pub root_path: PathBuf,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Project analysis from the most recent successful build
    pub project: Option<Project>,

    /// Statistics from the most recent successful build
    pub last_build: Option<BuildStats>,
}

impl CollectionMeta {
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            schema_version: SCHEMA_VERSION,
            name: name.into(),
            root_path: root_path.into(),
            created_at: now,
            updated_at: now,
            project: None,
            last_build: None,
        }
    }

    /// Load metadata, failing if the file is missing or unreadable.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LodestarError::StorageError(format!(
                "Collection metadata not found: {}",
                path.display()
            )));
        }
        let contents = fs::read_to_string(path)?;
        let meta: CollectionMeta = serde_json::from_str(&contents)?;
        Ok(meta)
    }

    /// Load metadata if present and readable with the current schema.
    ///
    /// Missing, corrupt, or schema-incompatible files yield `None`; the
    /// collection is then treated as never built.
    pub fn try_load(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load(path) {
            Ok(meta) if meta.schema_version == SCHEMA_VERSION => Some(meta),
            Ok(meta) => {
                tracing::warn!(
                    "Ignoring metadata with schema version {} (expected {}): {}",
                    meta.schema_version,
                    SCHEMA_VERSION,
                    path.display()
                );
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable metadata {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Persist metadata atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Refresh the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
