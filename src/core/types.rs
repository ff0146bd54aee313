//! Core data types for the Lodestar indexing engine.
//!
//! This module defines the document model stored in collections, the
//! project analysis types, and the request/response structures returned
//! by the search surface.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Document classification stored alongside every indexed document.
///
/// The enum is closed: each variant carries the fields that are required
/// for that kind of document, so a document cannot be constructed without
/// them. Ranking ties between documents with equal scores are broken by
/// [`DocumentType::priority`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentType {
    /// A REST API endpoint: the route decorator plus its handler body.
    RestApiEndpoint {
        /// Route or handler name (never empty)
        endpoint_name: String,
    },

    /// Per-file summary enumerating the endpoints found in that file.
    FileSummary,

    /// Fallback chunk split on function/class boundaries.
    SourceChunk {
        /// Sequential chunk number within the file
        chunk_index: usize,
    },

    /// Project-wide analysis document (one per collection).
    ProjectAnalysis,

    /// Documentation for a detected framework, referencing observed usage.
    FrameworkDocumentation {
        /// Framework name as detected (e.g. "flask")
        framework: String,
    },

    /// A single declared or imported dependency.
    Dependency {
        /// Dependency name
        name: String,
        /// Declared version, when the manifest pins one
        version: Option<String>,
    },
}

impl DocumentType {
    /// Tie-break priority when scores are equal (lower sorts first).
    ///
    /// Curated documents (endpoints, project analysis, framework docs)
    /// outrank raw source chunks.
    pub fn priority(&self) -> u8 {
        match self {
            DocumentType::RestApiEndpoint { .. } => 0,
            DocumentType::ProjectAnalysis => 1,
            DocumentType::FrameworkDocumentation { .. } => 2,
            DocumentType::FileSummary => 3,
            DocumentType::Dependency { .. } => 4,
            DocumentType::SourceChunk { .. } => 5,
        }
    }

    /// Stable label used in result payloads and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::RestApiEndpoint { .. } => "rest_api_endpoint",
            DocumentType::FileSummary => "file_summary",
            DocumentType::SourceChunk { .. } => "source_chunk",
            DocumentType::ProjectAnalysis => "project_analysis",
            DocumentType::FrameworkDocumentation { .. } => "framework_documentation",
            DocumentType::Dependency { .. } => "dependency",
        }
    }
}

/// A single document held in a collection.
///
/// Documents are created through the typed constructors below, which
/// derive deterministic ids and enforce the per-variant requirements.
/// Re-indexing an unchanged file therefore produces documents with the
/// same ids, making upserts idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Deterministic identifier, unique within a collection
    pub id: String,

    /// Text content that is embedded and searched
    pub content: String,

    /// Document classification with its required fields
    pub doc_type: DocumentType,

    /// Source file path relative to the project root (empty for
    /// project-level documents)
    pub file_path: String,

    /// 1-indexed line where the document starts, where applicable
    pub line_number: Option<usize>,

    /// Embedding vector (filled in during indexing)
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl Document {
    /// Create a REST API endpoint document.
    ///
    /// `line_number` is the 1-indexed line of the route decorator. An
    /// empty or whitespace-only `endpoint_name` is replaced with a
    /// deterministic placeholder so the name is never empty.
    pub fn endpoint(
        file_path: impl Into<String>,
        line_number: usize,
        endpoint_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let file_path = file_path.into();
        let mut endpoint_name = endpoint_name.into().trim().to_string();
        if endpoint_name.is_empty() {
            endpoint_name = format!("endpoint-line-{line_number}");
        }
        Self {
            id: format!("{file_path}#endpoint@{line_number}"),
            content: content.into(),
            doc_type: DocumentType::RestApiEndpoint { endpoint_name },
            file_path,
            line_number: Some(line_number),
            embedding: Vec::new(),
        }
    }

    /// Create the per-file summary document.
    pub fn file_summary(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        let file_path = file_path.into();
        Self {
            id: format!("{file_path}#summary"),
            content: content.into(),
            doc_type: DocumentType::FileSummary,
            file_path,
            line_number: None,
            embedding: Vec::new(),
        }
    }

    /// Create a fallback source chunk document.
    pub fn source_chunk(
        file_path: impl Into<String>,
        chunk_index: usize,
        line_number: usize,
        content: impl Into<String>,
    ) -> Self {
        let file_path = file_path.into();
        Self {
            id: format!("{file_path}#chunk@{chunk_index}"),
            content: content.into(),
            doc_type: DocumentType::SourceChunk { chunk_index },
            file_path,
            line_number: Some(line_number),
            embedding: Vec::new(),
        }
    }

    /// Create the collection-wide project analysis document.
    pub fn project_analysis(content: impl Into<String>) -> Self {
        Self {
            id: "project#analysis".to_string(),
            content: content.into(),
            doc_type: DocumentType::ProjectAnalysis,
            file_path: String::new(),
            line_number: None,
            embedding: Vec::new(),
        }
    }

    /// Create a framework documentation document.
    pub fn framework_documentation(
        framework: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let framework = framework.into();
        Self {
            id: format!("project#framework@{framework}"),
            content: content.into(),
            doc_type: DocumentType::FrameworkDocumentation { framework },
            file_path: String::new(),
            line_number: None,
            embedding: Vec::new(),
        }
    }

    /// Create a dependency document.
    pub fn dependency(
        name: impl Into<String>,
        version: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: format!("project#dependency@{name}"),
            content: content.into(),
            doc_type: DocumentType::Dependency {
                name,
                version,
            },
            file_path: String::new(),
            line_number: None,
            embedding: Vec::new(),
        }
    }

    /// Line number used for tie-break ordering (file-level documents
    /// sort as line 0).
    pub fn sort_line(&self) -> usize {
        self.line_number.unwrap_or(0)
    }
}

/// A file discovered by the scanner, ready for chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedFile {
    /// Absolute path on disk
    pub path: PathBuf,

    /// Path relative to the scanned root, with forward slashes
    pub relative_path: String,

    /// Hex-encoded SHA-256 digest of the file content
    pub content_hash: String,
}

/// Where a dependency was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencySource {
    /// Declared in a manifest file (Cargo.toml, package.json, ...)
    Manifest,
    /// Seen in an import/use statement in source code
    Import,
}

/// A single project dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: Option<String>,
    pub source: DependencySource,
}

/// Framework category assigned by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkKind {
    Web,
    Database,
    Testing,
    Ui,
    Templating,
    Other,
}

impl FrameworkKind {
    /// Parse a category name leniently (unknown values become `Other`).
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "web" => FrameworkKind::Web,
            "database" | "db" => FrameworkKind::Database,
            "testing" | "test" => FrameworkKind::Testing,
            "ui" => FrameworkKind::Ui,
            "templating" | "template" => FrameworkKind::Templating,
            _ => FrameworkKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameworkKind::Web => "web",
            FrameworkKind::Database => "database",
            FrameworkKind::Testing => "testing",
            FrameworkKind::Ui => "ui",
            FrameworkKind::Templating => "templating",
            FrameworkKind::Other => "other",
        }
    }
}

/// Confidence attached to a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Parse a confidence label leniently (unknown values become `Low`).
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// A framework detected in the project, with its category and how sure
/// the classifier was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkClassification {
    pub name: String,
    pub kind: FrameworkKind,
    pub confidence: Confidence,
}

/// Result of analyzing a project root: its dependencies and the
/// frameworks they imply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    /// Project name, taken from the primary manifest when available
    pub name: Option<String>,

    /// Merged dependencies from manifests and import scanning
    pub dependencies: Vec<Dependency>,

    /// Classified frameworks
    pub frameworks: Vec<FrameworkClassification>,

    /// Manifest files that were parsed (relative paths)
    pub manifests: Vec<String>,
}

impl Project {
    /// Whether any framework of the given kind was detected.
    pub fn has_framework_kind(&self, kind: FrameworkKind) -> bool {
        self.frameworks.iter().any(|f| f.kind == kind)
    }

    /// Look up a framework classification by name (case-insensitive).
    pub fn framework(&self, name: &str) -> Option<&FrameworkClassification> {
        self.frameworks
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// Statistics from a completed build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStats {
    /// Collection the build wrote into
    pub collection: String,

    /// Files discovered by the scanner
    pub files_scanned: usize,

    /// Files chunked and indexed this build (unchanged files are reused)
    pub files_indexed: usize,

    /// Files skipped (unreadable, oversized, or excluded after scan)
    pub files_skipped: usize,

    /// Total documents in the collection after the build
    pub documents_created: usize,

    /// REST API endpoint documents found
    pub endpoints_found: usize,

    /// Build duration in milliseconds
    pub duration_ms: u64,
}

/// Collection metadata for the listing surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name (including the "codebase-index-" prefix)
    pub name: String,

    /// Root directory this collection indexes
    pub root_path: String,

    /// Number of documents in the collection
    pub documents: usize,

    /// Last successful build timestamp (ISO 8601)
    pub updated_at: String,
}

/// Query intent determined during planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    CodeSearch,
    DependencyListing,
    ProjectTypeDiscovery,
}

impl QueryIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::CodeSearch => "code_search",
            QueryIntent::DependencyListing => "dependency_listing",
            QueryIntent::ProjectTypeDiscovery => "project_type_discovery",
        }
    }
}

/// Trace of the planning stage, returned verbatim by hybrid search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalysis {
    /// Detected query intent
    pub intent: QueryIntent,

    /// The query exactly as the caller supplied it
    pub original_query: String,

    /// The expanded query actually used for retrieval. Always contains
    /// the original query as a prefix.
    pub expanded_query: String,

    /// Terms the planner appended
    pub added_terms: Vec<String>,
}

/// One ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Cosine similarity score (higher = more relevant)
    pub score: f32,

    /// Document content
    pub content: String,

    /// Source file path relative to the project root
    pub file_path: String,

    /// 1-indexed line where the document starts, where applicable
    pub line_number: Option<usize>,

    /// Document classification label
    pub document_type: String,
}

impl SearchResult {
    /// Build a result payload from a stored document and its score.
    pub fn from_document(doc: &Document, score: f32) -> Self {
        Self {
            score,
            content: doc.content.clone(),
            file_path: doc.file_path.clone(),
            line_number: doc.line_number,
            document_type: doc.doc_type.label().to_string(),
        }
    }
}

/// Response from a plain search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Original query string
    pub query: String,

    /// Ranked results
    pub results: Vec<SearchResult>,

    /// Number of results returned
    pub count: usize,

    /// Query duration in milliseconds
    pub duration_ms: u64,
}

/// Response from a hybrid search: ranked results plus the planning trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridSearchResponse {
    /// Original query string
    pub query: String,

    /// Ranked vector results
    pub vector_results: Vec<SearchResult>,

    /// Stage-one planning trace
    pub ai_analysis: QueryAnalysis,

    /// Whether keyword retrieval supplemented the vector results
    pub used_keyword_fallback: bool,

    /// Query duration in milliseconds
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_document_construction() {
        let doc = Document::endpoint("src/app.py", 31, "/users", "@app.route('/users')\ndef users():");

        assert_eq!(doc.id, "src/app.py#endpoint@31");
        assert_eq!(doc.line_number, Some(31));
        match &doc.doc_type {
            DocumentType::RestApiEndpoint { endpoint_name } => {
                assert_eq!(endpoint_name, "/users");
            }
            other => panic!("expected endpoint, got {other:?}"),
        }
    }

    #[test]
    fn test_endpoint_name_never_empty() {
        let doc = Document::endpoint("src/app.py", 12, "   ", "@app.route(");
        match &doc.doc_type {
            DocumentType::RestApiEndpoint { endpoint_name } => {
                assert_eq!(endpoint_name, "endpoint-line-12");
            }
            other => panic!("expected endpoint, got {other:?}"),
        }
    }

    #[test]
    fn test_deterministic_ids() {
        let a = Document::source_chunk("lib/util.js", 2, 40, "function a() {}");
        let b = Document::source_chunk("lib/util.js", 2, 40, "function a() {}");
        assert_eq!(a.id, b.id);

        let summary = Document::file_summary("lib/util.js", "File summary");
        assert_eq!(summary.id, "lib/util.js#summary");
    }

    #[test]
    fn test_type_priority_ordering() {
        let endpoint = DocumentType::RestApiEndpoint {
            endpoint_name: "/a".to_string(),
        };
        let analysis = DocumentType::ProjectAnalysis;
        let framework = DocumentType::FrameworkDocumentation {
            framework: "flask".to_string(),
        };
        let chunk = DocumentType::SourceChunk { chunk_index: 0 };

        assert!(endpoint.priority() < analysis.priority());
        assert!(analysis.priority() < framework.priority());
        assert!(framework.priority() < chunk.priority());
    }

    #[test]
    fn test_framework_kind_parse() {
        assert_eq!(FrameworkKind::parse("Web"), FrameworkKind::Web);
        assert_eq!(FrameworkKind::parse("DATABASE"), FrameworkKind::Database);
        assert_eq!(FrameworkKind::parse("ui"), FrameworkKind::Ui);
        assert_eq!(FrameworkKind::parse("something-else"), FrameworkKind::Other);
    }

    #[test]
    fn test_confidence_parse_defaults_low() {
        assert_eq!(Confidence::parse("high"), Confidence::High);
        assert_eq!(Confidence::parse("Medium"), Confidence::Medium);
        assert_eq!(Confidence::parse("unsure"), Confidence::Low);
        assert_eq!(Confidence::parse(""), Confidence::Low);
    }

    #[test]
    fn test_document_serialization_round_trip() {
        let doc = Document::dependency(
            "flask",
            Some("2.3.0".to_string()),
            "Dependency: flask 2.3.0",
        );

        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, "project#dependency@flask");
        match back.doc_type {
            DocumentType::Dependency { name, version } => {
                assert_eq!(name, "flask");
                assert_eq!(version.as_deref(), Some("2.3.0"));
            }
            other => panic!("expected dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_sort_line_for_file_level_documents() {
        let summary = Document::file_summary("a.py", "summary");
        let endpoint = Document::endpoint("a.py", 31, "/users", "...");

        assert_eq!(summary.sort_line(), 0);
        assert_eq!(endpoint.sort_line(), 31);
    }

    #[test]
    fn test_search_result_from_document() {
        let doc = Document::endpoint("src/app.py", 31, "/users", "@app.route('/users')");
        let result = SearchResult::from_document(&doc, 0.87);

        assert_eq!(result.score, 0.87);
        assert_eq!(result.file_path, "src/app.py");
        assert_eq!(result.line_number, Some(31));
        assert_eq!(result.document_type, "rest_api_endpoint");
    }

    #[test]
    fn test_project_framework_lookup() {
        let project = Project {
            name: Some("demo".to_string()),
            dependencies: vec![],
            frameworks: vec![FrameworkClassification {
                name: "Flask".to_string(),
                kind: FrameworkKind::Web,
                confidence: Confidence::High,
            }],
            manifests: vec!["requirements.txt".to_string()],
        };

        assert!(project.has_framework_kind(FrameworkKind::Web));
        assert!(!project.has_framework_kind(FrameworkKind::Database));
        assert!(project.framework("flask").is_some());
        assert!(project.framework("django").is_none());
    }
}
