//! XDG Base Directory Support
//!
//! Implements XDG Base Directory specification for proper file organization
//! on Linux/Unix systems. Provides automatic migration from legacy paths.

use std::env;
use std::fs;
use std::path::PathBuf;

/// XDG directory structure for Lodestar
///
/// Implements XDG Base Directory specification with fallbacks and
/// backward compatibility for legacy environment variables.
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub state_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl XdgDirs {
    /// Create new XDG directory structure with proper resolution order
    ///
    /// Priority order (highest to lowest):
    /// 1. Explicit LODESTAR_* env vars
    /// 2. XDG_* environment variables
    /// 3. XDG defaults (~/.config, ~/.local/share, etc.)
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
            data_dir: Self::resolve_data_dir(),
            state_dir: Self::resolve_state_dir(),
            cache_dir: Self::resolve_cache_dir(),
        }
    }

    /// Resolve config directory
    fn resolve_config_dir() -> PathBuf {
        // 1. Check LODESTAR_CONFIG_DIR
        if let Ok(dir) = env::var("LODESTAR_CONFIG_DIR") {
            return PathBuf::from(dir);
        }

        // 2. Check XDG_CONFIG_HOME
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("lodestar");
        }

        // 3. Use XDG default
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("lodestar")
    }

    /// Resolve data directory
    fn resolve_data_dir() -> PathBuf {
        // 1. Check LODESTAR_DATA_DIR
        if let Ok(dir) = env::var("LODESTAR_DATA_DIR") {
            return PathBuf::from(dir);
        }

        // 2. Check XDG_DATA_HOME
        if let Ok(xdg) = env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("lodestar");
        }

        // 3. Use XDG default
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local")
            .join("share")
            .join("lodestar")
    }

    /// Resolve state directory
    fn resolve_state_dir() -> PathBuf {
        // 1. Check LODESTAR_STATE_DIR
        if let Ok(dir) = env::var("LODESTAR_STATE_DIR") {
            return PathBuf::from(dir);
        }

        // 2. Check XDG_STATE_HOME
        if let Ok(xdg) = env::var("XDG_STATE_HOME") {
            return PathBuf::from(xdg).join("lodestar");
        }

        // 3. Use XDG default
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local")
            .join("state")
            .join("lodestar")
    }

    /// Resolve cache directory
    fn resolve_cache_dir() -> PathBuf {
        // 1. Check LODESTAR_CACHE_DIR
        if let Ok(dir) = env::var("LODESTAR_CACHE_DIR") {
            return PathBuf::from(dir);
        }

        // 2. Check XDG_CACHE_HOME
        if let Ok(xdg) = env::var("XDG_CACHE_HOME") {
            return PathBuf::from(xdg).join("lodestar");
        }

        // 3. Use XDG default
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cache")
            .join("lodestar")
    }

    /// Get config file path
    pub fn config_file(&self) -> PathBuf {
        // Check LODESTAR_CONFIG_FILE first (explicit override)
        if let Ok(file) = env::var("LODESTAR_CONFIG_FILE") {
            return PathBuf::from(file);
        }

        self.config_dir.join("config.toml")
    }

    /// Get collections directory path (per-collection documents and manifests)
    pub fn collections_dir(&self) -> PathBuf {
        self.data_dir.join("collections")
    }

    /// Get logs directory path
    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    /// Create all XDG directories if they don't exist
    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::create_dir_all(self.collections_dir())?;
        fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// Log the resolved XDG paths
    pub fn log_paths(&self) {
        tracing::info!("XDG directories resolved:");
        tracing::info!("  Config: {:?}", self.config_dir);
        tracing::info!("  Data: {:?}", self.data_dir);
        tracing::info!("  State: {:?}", self.state_dir);
        tracing::info!("  Cache: {:?}", self.cache_dir);
        tracing::info!("  Config file: {:?}", self.config_file());
        tracing::info!("  Collections: {:?}", self.collections_dir());
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}

/// Migrate legacy paths to XDG structure
///
/// Automatically copies config from legacy location to XDG paths.
/// Safe operation: never deletes original files, only copies.
pub fn migrate_legacy_paths(xdg: &XdgDirs) -> std::io::Result<()> {
    // Migrate config: ./lodestar.toml → XDG_CONFIG/config.toml
    let legacy_config = PathBuf::from("./lodestar.toml");
    let new_config = xdg.config_file();

    if legacy_config.exists() && !new_config.exists() {
        fs::create_dir_all(&xdg.config_dir)?;
        fs::copy(&legacy_config, &new_config)?;
        tracing::info!("Migrated config: {:?} → {:?}", legacy_config, new_config);
        tracing::info!(
            "Legacy config file preserved at {:?} (safe to delete after verification)",
            legacy_config
        );
    }

    Ok(())
}
