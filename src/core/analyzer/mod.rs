//! Project analysis: dependency discovery and framework detection.
//!
//! Runs once per build, before chunking. Combines three evidence
//! sources:
//! 1. Manifest files at the project root ([`manifests`])
//! 2. Import statements in source code ([`imports`])
//! 3. Literal framework patterns in source code ([`frameworks`])
//!
//! The merged dependency list is classified through the capability
//! client, and the results become collection documents: one analysis
//! summary, one documentation document per framework, and one document
//! per dependency. Analysis never fails a build; missing manifests,
//! unreadable files, and capability outages all degrade to whatever
//! evidence remains.

pub mod frameworks;
pub mod imports;
pub mod manifests;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::core::capability::CapabilityClient;
use crate::core::context::IndexContext;
use crate::core::types::{
    Confidence, Dependency, DependencySource, Document, FrameworkClassification, Project,
    ScannedFile,
};

// Cap the dependency lines embedded in the analysis summary; the full
// list still gets one document per dependency.
const SUMMARY_DEPENDENCY_CAP: usize = 50;

const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "mjs", "cjs", "rs", "go", "java",
];

/// Outcome of analyzing a project root.
#[derive(Debug)]
pub struct ProjectReport {
    /// Structured analysis, attached to the collection
    pub project: Project,

    /// Documents to index: analysis summary, framework docs,
    /// dependency docs
    pub documents: Vec<Document>,

    /// True when the remote capability was unreachable and the static
    /// fallback classified instead
    pub degraded: bool,
}

/// Analyzes a project root into dependencies, frameworks, and the
/// documents describing them.
pub struct ProjectAnalyzer {
    capability: Arc<CapabilityClient>,
}

impl ProjectAnalyzer {
    pub fn new(capability: Arc<CapabilityClient>) -> Self {
        Self { capability }
    }

    /// Analyze the project at `ctx.root_path()`.
    ///
    /// `files` is the scanner output for the same snapshot; source
    /// files are re-read here for import and pattern scanning. This
    /// method does not fail: every error path degrades to partial
    /// evidence.
    pub async fn analyze(&self, ctx: &IndexContext, files: &[ScannedFile]) -> ProjectReport {
        let scan = manifests::parse_manifests(ctx.root_path());

        let mut import_deps = Vec::new();
        let mut observed = Vec::new();
        for file in files {
            if !is_source_file(&file.relative_path) {
                continue;
            }
            let content = match std::fs::read_to_string(&file.path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!(
                        "Skipping {} during analysis: {}",
                        file.relative_path,
                        e
                    );
                    continue;
                }
            };
            import_deps.extend(imports::imports_for_file(&file.relative_path, &content));
            frameworks::scan_file(&file.relative_path, &content, &mut observed);
        }

        let dependencies = merge_dependencies(scan.dependencies, import_deps);
        let outcome = self.capability.classify(&dependencies).await;

        if outcome.degraded {
            tracing::warn!(
                "Framework classification degraded to static fallback for {:?}",
                ctx.root_path()
            );
        }

        let project = Project {
            name: scan.name,
            dependencies,
            frameworks: outcome.frameworks,
            manifests: scan.manifests,
        };

        let mut documents = Vec::new();
        for framework in &project.frameworks {
            documents.push(Document::framework_documentation(
                &framework.name,
                frameworks::documentation_for(framework, &observed),
            ));
        }
        for dependency in &project.dependencies {
            documents.push(Document::dependency(
                &dependency.name,
                dependency.version.clone(),
                dependency_content(dependency),
            ));
        }
        documents.push(Document::project_analysis(analysis_summary(
            &project,
            ctx.root_path(),
            outcome.degraded,
        )));

        tracing::info!(
            "Analyzed {:?}: {} dependencies, {} frameworks, {} manifests",
            ctx.root_path(),
            project.dependencies.len(),
            project.frameworks.len(),
            project.manifests.len()
        );

        ProjectReport {
            project,
            documents,
            degraded: outcome.degraded,
        }
    }
}

fn is_source_file(relative_path: &str) -> bool {
    let extension = relative_path.rsplit('.').next().unwrap_or("");
    SOURCE_EXTENSIONS.contains(&extension)
}

/// Merge manifest and import dependencies. Manifest entries win on
/// name collisions because they carry version information; hyphen and
/// underscore spellings of the same package collapse together.
fn merge_dependencies(
    manifest_deps: Vec<Dependency>,
    import_deps: Vec<Dependency>,
) -> Vec<Dependency> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for dep in manifest_deps.into_iter().chain(import_deps) {
        let key = dep.name.to_lowercase().replace('-', "_");
        if seen.insert(key) {
            merged.push(dep);
        }
    }

    merged
}

fn dependency_content(dependency: &Dependency) -> String {
    let version = dependency.version.as_deref().unwrap_or("unspecified");
    let source = match dependency.source {
        DependencySource::Manifest => "manifest",
        DependencySource::Import => "import",
    };
    format!(
        "Dependency: {}\nVersion: {}\nSource: {}\n",
        dependency.name, version, source
    )
}

fn overall_confidence(degraded: bool, frameworks: &[FrameworkClassification]) -> Confidence {
    if degraded {
        return Confidence::Low;
    }
    if frameworks.iter().any(|f| f.confidence == Confidence::High) {
        Confidence::High
    } else if frameworks.iter().any(|f| f.confidence == Confidence::Medium) {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn analysis_summary(project: &Project, root: &Path, degraded: bool) -> String {
    let mut summary = String::from("Project Analysis\n");

    if let Some(name) = &project.name {
        summary.push_str(&format!("Name: {name}\n"));
    }
    summary.push_str(&format!("Root: {}\n", root.display()));

    if project.manifests.is_empty() {
        summary.push_str("Manifests: (none)\n");
    } else {
        summary.push_str(&format!("Manifests: {}\n", project.manifests.join(", ")));
    }

    summary.push_str(&format!("Dependencies ({}):\n", project.dependencies.len()));
    for dependency in project.dependencies.iter().take(SUMMARY_DEPENDENCY_CAP) {
        match &dependency.version {
            Some(version) => {
                summary.push_str(&format!("- {} {}\n", dependency.name, version))
            }
            None => summary.push_str(&format!("- {}\n", dependency.name)),
        }
    }
    if project.dependencies.len() > SUMMARY_DEPENDENCY_CAP {
        summary.push_str(&format!(
            "... and {} more\n",
            project.dependencies.len() - SUMMARY_DEPENDENCY_CAP
        ));
    }

    if project.frameworks.is_empty() {
        summary.push_str("Frameworks: (none detected)\n");
    } else {
        summary.push_str("Frameworks:\n");
        for framework in &project.frameworks {
            summary.push_str(&format!(
                "- {} ({}, {} confidence)\n",
                framework.name,
                framework.kind.as_str(),
                framework.confidence.as_str()
            ));
        }
    }

    summary.push_str(&format!(
        "Analysis confidence: {}\n",
        overall_confidence(degraded, &project.frameworks).as_str()
    ));

    summary
}
