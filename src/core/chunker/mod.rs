//! Language-aware chunking.
//!
//! Turns one source file into documents. Files with route declarations
//! produce one endpoint document per declaration; every file also gets
//! exactly one summary document that maps line numbers to what was
//! found. Files without endpoints fall back to chunks cut at
//! function/class boundaries, and a file with no recognizable
//! boundaries becomes a single chunk. Oversized segments are split with
//! overlap, keeping line numbers accurate.
//!
//! Chunking is a pure function of the file content, so re-chunking an
//! unchanged file reproduces identical documents.

pub mod endpoints;
pub mod language;
pub mod splitter;

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use self::endpoints::EndpointScan;
use self::language::Language;
use self::splitter::TextSplitter;
use crate::core::config::IndexingConfig;
use crate::core::types::Document;

/// Splits files into endpoint, summary, and source-chunk documents.
#[derive(Debug, Clone)]
pub struct LanguageChunker {
    splitter: TextSplitter,
    chunk_size: usize,
}

/// A function or class found while outlining a file.
#[derive(Debug, Clone)]
struct OutlineItem {
    line_number: usize,
    name: String,
    kind: OutlineKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutlineKind {
    Function,
    Class,
}

static PY_FUNC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:async\s+)?def\s+(\w+)").unwrap());
static PY_CLASS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^class\s+(\w+)").unwrap());

static JS_FUNC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(\w+)").unwrap()
});
static JS_ARROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:export\s+)?(?:const|let|var)\s+(\w+)\s*=.*=>").unwrap());
static JS_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:export\s+)?(?:default\s+)?class\s+(\w+)").unwrap());

static JAVA_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*\(").unwrap());
static JAVA_CLASS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"class\s+(\w+)").unwrap());

static RUST_FN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub\s*(?:\([^)]*\))?\s*)?(?:async\s+)?(?:unsafe\s+)?fn\s+(\w+)").unwrap()
});
static RUST_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub\s*(?:\([^)]*\))?\s*)?(?:struct|enum|trait)\s+(\w+)").unwrap()
});
static RUST_IMPL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^impl(?:\s*<[^>]*>)?\s+(\w+)").unwrap());

static GO_FUNC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^func\s+(?:\([^)]*\)\s*)?(\w+)").unwrap());
static GO_TYPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^type\s+(\w+)").unwrap());

impl LanguageChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            splitter: TextSplitter::new(chunk_size, overlap),
            chunk_size,
        }
    }

    pub fn from_config(config: &IndexingConfig) -> Self {
        Self::new(config.chunk_size, config.overlap)
    }

    /// Chunk one file into documents. Embeddings are left empty and
    /// filled in by the indexing pipeline.
    pub fn chunk_file(&self, relative_path: &str, content: &str) -> Vec<Document> {
        let lang = Language::detect(relative_path, content);
        let lines: Vec<&str> = content.lines().collect();

        let scan = endpoints::scan(lang, &lines);
        let outline = outline(lang, &lines);

        let mut docs = Vec::new();

        for ep in &scan.endpoints {
            docs.push(Document::endpoint(
                relative_path,
                ep.line_number,
                &ep.name,
                &ep.content,
            ));
        }

        let summary = build_summary(relative_path, lang, &scan, &outline);
        docs.push(Document::file_summary(relative_path, summary));

        // Files covered by endpoint documents don't also get raw chunks
        if scan.endpoints.is_empty() && !content.trim().is_empty() {
            self.append_source_chunks(&mut docs, relative_path, &lines, &outline);
        }

        docs
    }

    /// Cut the file at outline boundaries and emit one chunk per
    /// segment, splitting any segment too large for one chunk.
    fn append_source_chunks(
        &self,
        docs: &mut Vec<Document>,
        relative_path: &str,
        lines: &[&str],
        outline: &[OutlineItem],
    ) {
        let mut boundaries: Vec<usize> = outline.iter().map(|item| item.line_number).collect();
        boundaries.sort_unstable();
        boundaries.dedup();

        // Segment start lines: the file head plus each boundary
        let mut starts = vec![1];
        for b in boundaries {
            if b > 1 {
                starts.push(b);
            }
        }
        starts.dedup();

        let mut chunk_index = 0;
        for (pos, &start) in starts.iter().enumerate() {
            let end = starts
                .get(pos + 1)
                .map(|next| next - 1)
                .unwrap_or(lines.len());
            if end < start {
                continue;
            }

            let segment = lines[start - 1..end].join("\n");
            if segment.trim().is_empty() {
                continue;
            }

            if segment.chars().count() <= self.chunk_size {
                docs.push(Document::source_chunk(
                    relative_path,
                    chunk_index,
                    start,
                    segment,
                ));
                chunk_index += 1;
            } else {
                for piece in self.splitter.split(&segment) {
                    docs.push(Document::source_chunk(
                        relative_path,
                        chunk_index,
                        start + piece.line_offset,
                        piece.text,
                    ));
                    chunk_index += 1;
                }
            }
        }
    }
}

/// Collect the functions and classes in a file, for the summary and for
/// chunk boundaries.
fn outline(lang: Language, lines: &[&str]) -> Vec<OutlineItem> {
    let mut items = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        let line_number = i + 1;

        let item = match lang {
            Language::Python => PY_CLASS_RE
                .captures(trimmed)
                .map(|c| (c[1].to_string(), OutlineKind::Class))
                .or_else(|| {
                    PY_FUNC_RE
                        .captures(trimmed)
                        .map(|c| (c[1].to_string(), OutlineKind::Function))
                }),
            Language::JavaScript | Language::TypeScript => JS_CLASS_RE
                .captures(trimmed)
                .map(|c| (c[1].to_string(), OutlineKind::Class))
                .or_else(|| {
                    JS_FUNC_RE
                        .captures(trimmed)
                        .or_else(|| JS_ARROW_RE.captures(trimmed))
                        .map(|c| (c[1].to_string(), OutlineKind::Function))
                }),
            Language::Java => java_outline_item(trimmed),
            Language::Rust => RUST_TYPE_RE
                .captures(trimmed)
                .or_else(|| RUST_IMPL_RE.captures(trimmed))
                .map(|c| (c[1].to_string(), OutlineKind::Class))
                .or_else(|| {
                    RUST_FN_RE
                        .captures(trimmed)
                        .map(|c| (c[1].to_string(), OutlineKind::Function))
                }),
            Language::Go => GO_TYPE_RE
                .captures(trimmed)
                .map(|c| (c[1].to_string(), OutlineKind::Class))
                .or_else(|| {
                    GO_FUNC_RE
                        .captures(trimmed)
                        .map(|c| (c[1].to_string(), OutlineKind::Function))
                }),
            Language::PlainText => None,
        };

        if let Some((name, kind)) = item {
            items.push(OutlineItem {
                line_number,
                name,
                kind,
            });
        }
    }

    items
}

fn java_outline_item(trimmed: &str) -> Option<(String, OutlineKind)> {
    let has_modifier = trimmed.starts_with("public")
        || trimmed.starts_with("private")
        || trimmed.starts_with("protected");

    if trimmed.contains("class ") && has_modifier {
        return JAVA_CLASS_RE
            .captures(trimmed)
            .map(|c| (c[1].to_string(), OutlineKind::Class));
    }

    if has_modifier && trimmed.contains('(') {
        return JAVA_NAME_RE
            .captures(trimmed)
            .map(|c| (c[1].to_string(), OutlineKind::Function));
    }

    None
}

/// Render the per-file summary document content.
///
/// The summary names the file, then lists endpoints (line and route),
/// malformed route declarations, functions, and classes, each section
/// only when non-empty.
fn build_summary(
    relative_path: &str,
    lang: Language,
    scan: &EndpointScan,
    outline: &[OutlineItem],
) -> String {
    let file_name = Path::new(relative_path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| relative_path.to_string());

    let mut out = String::new();
    out.push_str(&format!("File: {file_name}\n"));
    out.push_str(&format!("Path: {relative_path}\n"));
    out.push_str(&format!("Language: {}\n", lang.as_str()));

    if !scan.endpoints.is_empty() {
        out.push_str("\nREST API Endpoints:\n");
        for ep in &scan.endpoints {
            let first_line = ep.content.lines().next().unwrap_or("").trim();
            out.push_str(&format!(
                "- Line {}: {} ({})\n",
                ep.line_number, ep.name, first_line
            ));
        }
    }

    if !scan.malformed.is_empty() {
        out.push_str("\nMalformed route declarations:\n");
        for m in &scan.malformed {
            out.push_str(&format!("- Line {}: {}\n", m.line_number, m.decorator));
        }
    }

    let functions: Vec<_> = outline
        .iter()
        .filter(|i| i.kind == OutlineKind::Function)
        .collect();
    if !functions.is_empty() {
        out.push_str("\nFunctions:\n");
        for f in &functions {
            out.push_str(&format!("- Line {}: {}\n", f.line_number, f.name));
        }
    }

    let classes: Vec<_> = outline
        .iter()
        .filter(|i| i.kind == OutlineKind::Class)
        .collect();
    if !classes.is_empty() {
        out.push_str("\nClasses:\n");
        for c in &classes {
            out.push_str(&format!("- Line {}: {}\n", c.line_number, c.name));
        }
    }

    out
}
