//! Request-scoped indexing context.
//!
//! Every index operation resolves the caller-supplied path into an
//! [`IndexContext`] up front: a canonical root plus the collection name
//! derived from it. All downstream components take the context as an
//! argument instead of consulting the process working directory, so
//! concurrent builds against different roots cannot interfere.

use crate::core::error::{LodestarError, Result};
use crate::core::lifecycle::naming;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Resolved root path and derived collection name for one index request.
#[derive(Debug, Clone)]
pub struct IndexContext {
    root_path: PathBuf,
    collection: String,
}

impl IndexContext {
    /// Resolve a caller-supplied path into a context.
    ///
    /// The path must exist and be a directory; resolution canonicalizes
    /// it so symlinked and relative spellings of the same root map to
    /// the same collection.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let root_path = path.canonicalize().map_err(|e| match e.kind() {
            ErrorKind::NotFound => LodestarError::PathNotFound(path.display().to_string()),
            ErrorKind::PermissionDenied => {
                LodestarError::PermissionDenied(path.display().to_string())
            }
            _ => LodestarError::IoError(e),
        })?;

        if !root_path.is_dir() {
            return Err(LodestarError::PathNotFound(format!(
                "{} is not a directory",
                root_path.display()
            )));
        }

        let collection = naming::collection_name(&root_path);

        Ok(Self {
            root_path,
            collection,
        })
    }

    /// Canonical root directory for this request.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Collection name derived from the root.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Render an absolute path relative to the root, with forward
    /// slashes. Paths outside the root are rendered as-is.
    pub fn relative_path(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root_path).unwrap_or(path);
        rel.to_string_lossy().replace('\\', "/")
    }
}
