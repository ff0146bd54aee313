//! Per-collection index manifest.
//!
//! The manifest records which files a collection currently covers, one
//! `INDEXED:<relative-path>|<sha256>` line per file. Its presence on
//! disk marks a collection that has completed at least one build, and
//! its hashes let incremental builds skip unchanged files.

use crate::core::error::Result;
use crate::core::types::ScannedFile;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Manifest filename inside a collection directory.
pub const MANIFEST_FILE: &str = "manifest.log";

const LINE_PREFIX: &str = "INDEXED:";

/// Tracks indexed files and their content hashes.
#[derive(Debug, Clone, Default)]
pub struct IndexManifest {
    entries: HashMap<String, String>,
}

/// Partition of a scan against an existing manifest.
#[derive(Debug)]
pub struct ScanDiff {
    /// Files that are new or whose content hash changed
    pub to_index: Vec<ScannedFile>,

    /// Files whose recorded hash matches the scan
    pub unchanged: Vec<ScannedFile>,

    /// Relative paths in the manifest but absent from the scan
    pub removed: Vec<String>,
}

impl IndexManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest from disk. A missing file yields an empty
    /// manifest; malformed lines are logged and skipped.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let contents = fs::read_to_string(path)?;
        let mut entries = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some(rest) = line.strip_prefix(LINE_PREFIX) else {
                tracing::warn!("Ignoring malformed manifest line: {}", line);
                continue;
            };

            // Older manifests carry no hash; record those entries with
            // an empty hash so they always re-index.
            let (file, hash) = match rest.split_once('|') {
                Some((file, hash)) => (file, hash),
                None => (rest, ""),
            };

            entries.insert(file.to_string(), hash.to_string());
        }

        Ok(Self { entries })
    }

    /// Record (or refresh) a file entry.
    pub fn record(&mut self, relative_path: impl Into<String>, content_hash: impl Into<String>) {
        self.entries
            .insert(relative_path.into(), content_hash.into());
    }

    /// Drop a file entry. Returns whether it was present.
    pub fn remove(&mut self, relative_path: &str) -> bool {
        self.entries.remove(relative_path).is_some()
    }

    /// Whether the manifest already covers this exact file content.
    pub fn is_current(&self, file: &ScannedFile) -> bool {
        self.entries
            .get(&file.relative_path)
            .map(|hash| !hash.is_empty() && hash == &file.content_hash)
            .unwrap_or(false)
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.entries.contains_key(relative_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Partition a scan into files to (re-)index, files to reuse, and
    /// entries whose files disappeared.
    pub fn diff(&self, scanned: &[ScannedFile]) -> ScanDiff {
        let mut to_index = Vec::new();
        let mut unchanged = Vec::new();

        let scanned_paths: HashSet<&str> =
            scanned.iter().map(|f| f.relative_path.as_str()).collect();

        for file in scanned {
            if self.is_current(file) {
                unchanged.push(file.clone());
            } else {
                to_index.push(file.clone());
            }
        }

        let mut removed: Vec<String> = self
            .entries
            .keys()
            .filter(|path| !scanned_paths.contains(path.as_str()))
            .cloned()
            .collect();
        removed.sort();

        ScanDiff {
            to_index,
            unchanged,
            removed,
        }
    }

    /// Persist the manifest atomically (temp file + rename), entries
    /// sorted by path so the file is byte-stable.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut lines: Vec<String> = self
            .entries
            .iter()
            .map(|(file, hash)| format!("{LINE_PREFIX}{file}|{hash}"))
            .collect();
        lines.sort();

        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, path)?;

        Ok(())
    }
}
