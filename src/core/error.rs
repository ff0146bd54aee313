//! Error types and error handling for the Lodestar engine.
//!
//! This module defines the error taxonomy used throughout the
//! application. Adapter-specific presentation (CLI exit codes,
//! JSON error payloads) is handled in the adapter modules.

use thiserror::Error;

/// Result type alias for Lodestar operations
pub type Result<T> = std::result::Result<T, LodestarError>;

/// Main error type for the Lodestar engine
#[derive(Error, Debug)]
pub enum LodestarError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Invalid threshold {0}: must be within [0.0, 1.0]")]
    InvalidThreshold(f32),

    #[error("Build already in progress for collection: {0}")]
    BuildInProgress(String),

    #[error("Ambiguous collection name '{name}': already mapped to {existing_root}, requested for {requested_root}")]
    AmbiguousCollectionName {
        name: String,
        existing_root: String,
        requested_root: String,
    },

    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Build failed for collection '{collection}': {reason}")]
    BuildFailed { collection: String, reason: String },

    #[error("Build cancelled for collection: {0}")]
    BuildCancelled(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl LodestarError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LodestarError::PathNotFound(_) | LodestarError::CollectionNotFound(_)
        )
    }

    /// Check if this is a conflict error (exclusive state already claimed)
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            LodestarError::BuildInProgress(_) | LodestarError::AmbiguousCollectionName { .. }
        )
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            LodestarError::InvalidThreshold(_)
                | LodestarError::InvalidQuery(_)
                | LodestarError::ConfigError(_)
        )
    }

    /// Check if this error means the engine fell back to degraded behavior
    /// rather than failing the operation outright
    pub fn is_degraded(&self) -> bool {
        matches!(self, LodestarError::CapabilityUnavailable(_))
    }
}
