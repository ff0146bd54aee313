//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a specific
//! CLI command.

pub mod clear;
pub mod collections;
pub mod completions;
pub mod config;
pub mod hybrid;
pub mod index;
pub mod search;

// Re-export argument types for use in mod.rs
pub use clear::ClearArgs;
pub use collections::ListArgs;
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use hybrid::HybridArgs;
pub use index::IndexArgs;
pub use search::SearchArgs;
