//! File discovery and content hashing.
//!
//! The scanner walks a project root, applies include/exclude glob
//! patterns, and produces one [`ScannedFile`] per readable match with a
//! SHA-256 digest of its content. Output is sorted by relative path so
//! a fixed directory snapshot always scans to the same list.

pub mod manifest;

use glob::Pattern;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::core::config::IndexingConfig;
use crate::core::error::{LodestarError, Result};
use crate::core::types::ScannedFile;

/// Walks a root directory and hashes every file worth indexing.
pub struct FileScanner {
    include_patterns: Vec<Pattern>,
    exclude_patterns: Vec<Pattern>,
    max_file_size_bytes: u64,
}

impl FileScanner {
    /// Create a scanner from raw glob pattern lists.
    pub fn new(
        include_patterns: Vec<String>,
        exclude_patterns: Vec<String>,
        max_file_size_mb: usize,
    ) -> Result<Self> {
        let include = compile_patterns(include_patterns, "include")?;
        let exclude = compile_patterns(exclude_patterns, "exclude")?;

        Ok(Self {
            include_patterns: include,
            exclude_patterns: exclude,
            max_file_size_bytes: (max_file_size_mb as u64) * 1024 * 1024,
        })
    }

    /// Create a scanner from the indexing configuration.
    pub fn from_config(config: &IndexingConfig) -> Result<Self> {
        Self::new(
            config.include_patterns.clone(),
            config.exclude_patterns.clone(),
            config.max_file_size_mb,
        )
    }

    /// Scan a root directory.
    ///
    /// A missing or non-directory root is fatal. Individual files that
    /// cannot be read (permission denied, racing deletes) are logged
    /// and skipped. Results are sorted by relative path.
    pub fn scan(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        if !root.is_dir() {
            return Err(LodestarError::PathNotFound(root.display().to_string()));
        }

        let mut scanned = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_descend(e, root))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Walk error under {:?}: {}", root, e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();

            if let Ok(metadata) = entry.metadata() {
                if metadata.len() > self.max_file_size_bytes {
                    tracing::debug!("Skipping large file: {:?} ({} bytes)", path, metadata.len());
                    continue;
                }
            }

            if !self.matches_patterns(path) {
                continue;
            }

            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    tracing::warn!("Permission denied, skipping: {:?}", path);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Unreadable file, skipping: {:?} ({})", path, e);
                    continue;
                }
            };

            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");

            scanned.push(ScannedFile {
                path: path.to_path_buf(),
                relative_path,
                content_hash: hash_bytes(&bytes),
            });
        }

        scanned.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        tracing::debug!("Scanned {} files under {:?}", scanned.len(), root);
        Ok(scanned)
    }

    /// Directory filter applied during the walk.
    ///
    /// Hidden directories and excluded directory trees are pruned
    /// early; the root itself is never filtered.
    fn should_descend(&self, entry: &DirEntry, root: &Path) -> bool {
        let path = entry.path();

        if path == root {
            return true;
        }

        if !entry.file_type().is_dir() {
            return true;
        }

        // Skip hidden directories (starting with '.')
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        for pattern in &self.exclude_patterns {
            if pattern.matches_path(path) {
                tracing::debug!("Skipping excluded directory: {:?}", path);
                return false;
            }
        }

        true
    }

    /// Check a file path against the include/exclude patterns.
    fn matches_patterns(&self, path: &Path) -> bool {
        let path_str = match path.to_str() {
            Some(s) => s,
            None => return false,
        };

        // Include patterns match either the full path or just the
        // filename; an empty include list accepts everything.
        let matches_include = self.include_patterns.is_empty()
            || self.include_patterns.iter().any(|p| {
                p.matches(path_str)
                    || path
                        .file_name()
                        .and_then(|f| f.to_str())
                        .map(|f| p.matches(f))
                        .unwrap_or(false)
            });

        if !matches_include {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|p| p.matches(path_str) || p.matches_path(path))
    }
}

fn compile_patterns(patterns: Vec<String>, which: &str) -> Result<Vec<Pattern>> {
    patterns
        .into_iter()
        .map(|p| {
            Pattern::new(&p).map_err(|e| {
                LodestarError::ConfigError(format!("Invalid {which} pattern '{p}': {e}"))
            })
        })
        .collect()
}

/// Hex-encoded SHA-256 digest of a byte slice.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
