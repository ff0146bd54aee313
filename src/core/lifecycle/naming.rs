//! Collection name derivation.
//!
//! Collection names are derived from the last path segment of the
//! indexed root, normalized to a Qdrant-safe slug and prefixed so
//! Lodestar's collections are recognizable next to anything else
//! sharing the store.

use std::path::Path;

/// Prefix applied to every derived collection name.
pub const COLLECTION_PREFIX: &str = "codebase-index-";

/// Slug used when normalization leaves nothing usable.
const DEFAULT_SEGMENT: &str = "default";

/// Derive the collection name for a project root.
///
/// The last non-empty path segment (ignoring `.` and `..`) is
/// normalized and prefixed. Two different roots with the same final
/// segment map to the same name; the lifecycle manager detects that
/// collision via collection metadata.
pub fn collection_name(root: &Path) -> String {
    let normalized = root.to_string_lossy().replace('\\', "/");
    let segment = normalized
        .split('/')
        .rev()
        .find(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(DEFAULT_SEGMENT);

    format!("{}{}", COLLECTION_PREFIX, normalize_segment(segment))
}

/// Normalize a path segment into a collection slug.
///
/// Characters outside `[a-zA-Z0-9_-]` become `-`, runs of `-` collapse
/// to one, the result is lowercased and trimmed of leading/trailing
/// dashes. An empty result falls back to `default`.
pub fn normalize_segment(segment: &str) -> String {
    let mut slug = String::with_capacity(segment.len());
    let mut prev_dash = false;

    for c in segment.chars() {
        let mapped = if c.is_ascii_alphanumeric() || c == '_' {
            prev_dash = false;
            c.to_ascii_lowercase()
        } else {
            if prev_dash {
                continue;
            }
            prev_dash = true;
            '-'
        };
        slug.push(mapped);
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        DEFAULT_SEGMENT.to_string()
    } else {
        slug.to_string()
    }
}
