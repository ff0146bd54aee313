//! Core domain logic (protocol-agnostic)
//!
//! This module contains all business logic that is independent
//! of the interface it is driven through (CLI today, other
//! adapters tomorrow).
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **context**: Per-request index context (root path, collection name)
//! - **scanner**: File discovery, hashing, and the index manifest
//! - **chunker**: Language-aware chunking into documents
//! - **analyzer**: Dependency discovery and framework detection
//! - **capability**: Classification/embedding seam with local fallback
//! - **store**: Collection document store with snapshot queries
//! - **search**: Query planning, vector search, hybrid search
//! - **lifecycle**: Build orchestration and collection state
//! - **services**: Unified service container

pub mod analyzer;
pub mod capability;
pub mod chunker;
pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod scanner;
pub mod search;
pub mod services;
pub mod store;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{LodestarError, Result};
pub use services::Services;
