//! Lodestar - Project-Aware Code Search
//!
//! An indexing and search engine that turns a project directory into a
//! queryable collection of typed documents: REST endpoint markers, per-file
//! summaries, source chunks, and a project analysis produced from the
//! project's manifest and imports.
//!
//! # Architecture
//!
//! The codebase is organized into two main modules:
//!
//! - **core**: Domain logic (interface-agnostic)
//!   - config, error, types, xdg
//!   - scanner (root walking, include/exclude globs, change detection)
//!   - chunker (endpoint extraction, summaries, fallback chunking)
//!   - analyzer (dependency discovery, framework classification)
//!   - store (collection-scoped document storage and similarity queries)
//!   - search (query planning, intent expansion, hybrid retrieval)
//!   - capability (remote classification/embedding with local fallback)
//!   - lifecycle (collection builds, cancellation, atomic swap)
//!   - services (unified service container)
//!
//! - **cli**: Command-line adapter (depends on core)
//!   - commands, output formatting
//!
//! # Key Features
//!
//! - Deterministic scans and idempotent re-chunking
//! - Collection lifecycle with one build per collection and atomic swap
//! - Graceful degradation when the capability service is unreachable
//! - Incremental reindexing driven by content hashes

// Core domain logic (interface-agnostic)
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{LodestarError, Result};
pub use core::services::Services;
pub use core::types::*;
