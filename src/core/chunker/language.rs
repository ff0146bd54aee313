//! Source language detection.
//!
//! Detection is extension-first with a shebang fallback for
//! extensionless scripts. Anything unrecognized is treated as plain
//! text and chunked without structural analysis.

use std::path::Path;

/// Languages the chunker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Rust,
    Go,
    PlainText,
}

impl Language {
    /// Detect the language of a file from its relative path and
    /// content.
    pub fn detect(relative_path: &str, content: &str) -> Self {
        if let Some(lang) = Self::from_extension(relative_path) {
            return lang;
        }
        if let Some(lang) = Self::from_shebang(content) {
            return lang;
        }
        Language::PlainText
    }

    fn from_extension(relative_path: &str) -> Option<Self> {
        let ext = Path::new(relative_path)
            .extension()
            .and_then(|e| e.to_str())?
            .to_lowercase();

        match ext.as_str() {
            "py" => Some(Language::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "java" => Some(Language::Java),
            "rs" => Some(Language::Rust),
            "go" => Some(Language::Go),
            _ => None,
        }
    }

    fn from_shebang(content: &str) -> Option<Self> {
        let first_line = content.lines().next()?;
        if !first_line.starts_with("#!") {
            return None;
        }

        if first_line.contains("python") {
            Some(Language::Python)
        } else if first_line.contains("node") {
            Some(Language::JavaScript)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::PlainText => "text",
        }
    }

    /// Whether blocks are delimited by indentation rather than braces.
    pub fn indentation_scoped(&self) -> bool {
        matches!(self, Language::Python)
    }
}
