//! Configuration management for the Lodestar engine.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{LodestarError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub capability: CapabilityConfig,
}

/// Indexing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Characters per chunk when splitting oversized segments (not bytes!)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Character overlap between consecutive oversize chunks
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Maximum file size in MB (skip larger files)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,

    /// Worker count for the per-build chunk/embed pool
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// File patterns to include (glob syntax)
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// File patterns to exclude (glob syntax)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory for per-collection state (documents, manifest, metadata)
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Similarity threshold applied when the caller does not supply one
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,

    /// Default number of results to return
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    /// Maximum results per query
    #[serde(default = "default_max_results_cap")]
    pub max_results: usize,

    /// Maximum query string length
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
}

/// External capability (classification/embedding service) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CapabilityConfig {
    /// Base URL of the classification/embedding service.
    /// Empty string disables the remote capability entirely; the local
    /// deterministic fallback then serves every call.
    #[serde(default = "default_capability_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_capability_timeout")]
    pub timeout_secs: u64,

    /// Backoff before the single retry, in milliseconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Embedding vector dimensionality
    #[serde(default = "default_embedding_dims")]
    pub embedding_dims: usize,
}

// Default value functions
fn default_chunk_size() -> usize {
    3000
}

fn default_overlap() -> usize {
    500
}

fn default_max_file_size() -> usize {
    1
}

fn default_workers() -> usize {
    4
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_threshold() -> f32 {
    0.1
}

fn default_max_results() -> usize {
    10
}

fn default_max_results_cap() -> usize {
    50
}

fn default_max_query_length() -> usize {
    500
}

fn default_capability_endpoint() -> String {
    String::new()
}

fn default_capability_timeout() -> u64 {
    10
}

fn default_retry_backoff() -> u64 {
    250
}

fn default_embedding_dims() -> usize {
    384
}

fn default_include_patterns() -> Vec<String> {
    vec![
        "*.rs".to_string(),
        "*.toml".to_string(),
        "*.md".to_string(),
        "*.txt".to_string(),
        "*.php".to_string(),
        "*.js".to_string(),
        "*.ts".to_string(),
        "*.py".to_string(),
        "*.go".to_string(),
        "*.java".to_string(),
        "*.c".to_string(),
        "*.cpp".to_string(),
        "*.h".to_string(),
        "*.json".to_string(),
        "*.xml".to_string(),
        "*.gradle".to_string(),
        "*.yml".to_string(),
        "*.yaml".to_string(),
    ]
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        // Build artifacts and dependencies
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
        "**/vendor/**".to_string(),
        "**/.git/**".to_string(),
        "**/.idea/**".to_string(),
        "**/.vscode/**".to_string(),
        "**/build/**".to_string(),
        "**/__pycache__/**".to_string(),
        "**/dist/**".to_string(),
        "**/.next/**".to_string(),
        // Image files
        "**/*.jpg".to_string(),
        "**/*.jpeg".to_string(),
        "**/*.png".to_string(),
        "**/*.gif".to_string(),
        "**/*.bmp".to_string(),
        "**/*.svg".to_string(),
        "**/*.webp".to_string(),
        "**/*.ico".to_string(),
        // Audio/video files
        "**/*.mp3".to_string(),
        "**/*.wav".to_string(),
        "**/*.flac".to_string(),
        "**/*.ogg".to_string(),
        "**/*.mp4".to_string(),
        "**/*.avi".to_string(),
        "**/*.mov".to_string(),
        "**/*.mkv".to_string(),
        "**/*.webm".to_string(),
        // Document formats (binary/structured)
        "**/*.pdf".to_string(),
        "**/*.doc".to_string(),
        "**/*.docx".to_string(),
        "**/*.xls".to_string(),
        "**/*.xlsx".to_string(),
        "**/*.ppt".to_string(),
        "**/*.pptx".to_string(),
        // Archive files
        "**/*.zip".to_string(),
        "**/*.tar".to_string(),
        "**/*.gz".to_string(),
        "**/*.bz2".to_string(),
        "**/*.7z".to_string(),
        "**/*.rar".to_string(),
        // Executables and binaries
        "**/*.exe".to_string(),
        "**/*.dll".to_string(),
        "**/*.so".to_string(),
        "**/*.dylib".to_string(),
        "**/*.bin".to_string(),
        "**/*.o".to_string(),
        "**/*.a".to_string(),
        // Font files
        "**/*.ttf".to_string(),
        "**/*.otf".to_string(),
        "**/*.woff".to_string(),
        "**/*.woff2".to_string(),
    ]
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            max_file_size_mb: default_max_file_size(),
            workers: default_workers(),
            include_patterns: default_include_patterns(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
            default_max_results: default_max_results(),
            max_results: default_max_results_cap(),
            max_query_length: default_max_query_length(),
        }
    }
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            endpoint: default_capability_endpoint(),
            timeout_secs: default_capability_timeout(),
            retry_backoff_ms: default_retry_backoff(),
            embedding_dims: default_embedding_dims(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| LodestarError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Create default configuration
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// This method uses XDG Base Directory specification for file locations.
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. LODESTAR_CONFIG env var
    /// 2. XDG config file (~/.config/lodestar/config.toml)
    /// 3. Legacy ./lodestar.toml (for backward compatibility)
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        // Start with defaults
        let mut config = if let Ok(config_path) = env::var("LODESTAR_CONFIG") {
            // Load from file if LODESTAR_CONFIG is set (legacy)
            Self::from_file(config_path)?
        } else {
            // Try XDG config file
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("lodestar.toml").exists() {
                // Fall back to legacy location for backward compatibility
                Self::from_file("lodestar.toml")?
            } else {
                // Use defaults
                Self::default()
            }
        };

        // Override storage path with XDG data directory if not explicitly set
        if env::var("LODESTAR_DATA_DIR").is_err() && config.storage.state_dir == default_state_dir()
        {
            config.storage.state_dir = xdg.collections_dir();
        }

        // Override with environment variables
        config.merge_env();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Indexing configuration
        if let Ok(chunk_size) = env::var("LODESTAR_CHUNK_SIZE") {
            if let Ok(size) = chunk_size.parse() {
                self.indexing.chunk_size = size;
            }
        }
        if let Ok(overlap) = env::var("LODESTAR_OVERLAP") {
            if let Ok(o) = overlap.parse() {
                self.indexing.overlap = o;
            }
        }
        if let Ok(max_size) = env::var("LODESTAR_MAX_FILE_SIZE_MB") {
            if let Ok(size) = max_size.parse() {
                self.indexing.max_file_size_mb = size;
            }
        }
        if let Ok(workers) = env::var("LODESTAR_WORKERS") {
            if let Ok(w) = workers.parse() {
                self.indexing.workers = w;
            }
        }

        // Storage configuration
        if let Ok(data_dir) = env::var("LODESTAR_DATA_DIR") {
            self.storage.state_dir = PathBuf::from(data_dir).join("collections");
        }

        // Search configuration
        if let Ok(threshold) = env::var("LODESTAR_DEFAULT_THRESHOLD") {
            if let Ok(t) = threshold.parse() {
                self.search.default_threshold = t;
            }
        }
        if let Ok(max_results) = env::var("LODESTAR_DEFAULT_MAX_RESULTS") {
            if let Ok(m) = max_results.parse() {
                self.search.default_max_results = m;
            }
        }
        if let Ok(max_results) = env::var("LODESTAR_MAX_RESULTS") {
            if let Ok(m) = max_results.parse() {
                self.search.max_results = m;
            }
        }
        if let Ok(max_query_len) = env::var("LODESTAR_MAX_QUERY_LENGTH") {
            if let Ok(len) = max_query_len.parse() {
                self.search.max_query_length = len;
            }
        }

        // Capability configuration
        if let Ok(endpoint) = env::var("LODESTAR_CAPABILITY_ENDPOINT") {
            self.capability.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("LODESTAR_CAPABILITY_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.capability.timeout_secs = t;
            }
        }
        if let Ok(backoff) = env::var("LODESTAR_RETRY_BACKOFF_MS") {
            if let Ok(b) = backoff.parse() {
                self.capability.retry_backoff_ms = b;
            }
        }
        if let Ok(dims) = env::var("LODESTAR_EMBEDDING_DIMS") {
            if let Ok(d) = dims.parse() {
                self.capability.embedding_dims = d;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate indexing config
        if self.indexing.chunk_size == 0 {
            return Err(LodestarError::ConfigError(
                "Chunk size must be non-zero".to_string(),
            ));
        }

        if self.indexing.overlap >= self.indexing.chunk_size {
            return Err(LodestarError::ConfigError(
                "Overlap must be less than chunk size".to_string(),
            ));
        }

        if self.indexing.workers == 0 {
            return Err(LodestarError::ConfigError(
                "Worker count must be non-zero".to_string(),
            ));
        }

        // Validate search config
        if !(0.0..=1.0).contains(&self.search.default_threshold) {
            return Err(LodestarError::ConfigError(
                "Default threshold must be within [0.0, 1.0]".to_string(),
            ));
        }

        if self.search.default_max_results == 0 {
            return Err(LodestarError::ConfigError(
                "Default max results must be non-zero".to_string(),
            ));
        }

        if self.search.default_max_results > self.search.max_results {
            return Err(LodestarError::ConfigError(
                "Default max results cannot exceed max results".to_string(),
            ));
        }

        if self.search.max_query_length == 0 {
            return Err(LodestarError::ConfigError(
                "Max query length must be non-zero".to_string(),
            ));
        }

        // Validate capability config
        if self.capability.timeout_secs == 0 {
            return Err(LodestarError::ConfigError(
                "Capability timeout must be non-zero".to_string(),
            ));
        }

        if self.capability.embedding_dims == 0 {
            return Err(LodestarError::ConfigError(
                "Embedding dimensionality must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration (redacting sensitive values)
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Chunk size: {} chars", self.indexing.chunk_size);
        tracing::info!("  Overlap: {} chars", self.indexing.overlap);
        tracing::info!("  Max file size: {} MB", self.indexing.max_file_size_mb);
        tracing::info!("  Workers: {}", self.indexing.workers);
        tracing::info!(
            "  Include patterns: {} patterns",
            self.indexing.include_patterns.len()
        );
        tracing::info!(
            "  Exclude patterns: {} patterns",
            self.indexing.exclude_patterns.len()
        );
        tracing::info!("  State dir: {:?}", self.storage.state_dir);
        tracing::info!("  Default threshold: {}", self.search.default_threshold);
        tracing::info!("  Default max results: {}", self.search.default_max_results);
        tracing::info!("  Max results: {}", self.search.max_results);
        if self.capability.endpoint.is_empty() {
            tracing::info!("  Capability: local fallback only");
        } else {
            tracing::info!("  Capability endpoint: {}", self.capability.endpoint);
            tracing::info!("  Capability timeout: {}s", self.capability.timeout_secs);
        }
        tracing::info!("  Embedding dims: {}", self.capability.embedding_dims);
    }
}
