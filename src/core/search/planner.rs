//! Query planning: intent classification and vocabulary expansion.
//!
//! Planning runs in two steps before retrieval. First the query is
//! classified into one of three intents from its wording alone. Then,
//! when a project analysis is available, the query is expanded with
//! vocabulary matching the intent and the detected frameworks, so a
//! query like "show the route handlers" also retrieves documents that
//! say `@app.route`.
//!
//! Expansion is strictly additive: the expanded query always begins
//! with the original query text, and without a project analysis the
//! query passes through unchanged.

use crate::core::types::{FrameworkKind, Project, QueryAnalysis, QueryIntent};

/// Upper bound on appended terms so expansion cannot drown the query.
const MAX_ADDED_TERMS: usize = 8;

const PROJECT_TYPE_MARKERS: &[&str] = &[
    "what kind of project",
    "type of project",
    "project type",
    "what framework",
    "which framework",
    "what frameworks",
    "tech stack",
    "technology stack",
    "built with",
    "what language",
];

const DEPENDENCY_MARKERS: &[&str] = &[
    "dependencies",
    "dependency",
    "libraries",
    "packages",
    "imports",
    "requirements",
    "third-party",
    "third party",
];

/// Classify a query into an intent from its wording.
pub fn classify_intent(query: &str) -> QueryIntent {
    let query = query.to_lowercase();

    // Project-type phrasings are the most specific, so they win over
    // the single-word dependency markers they sometimes contain.
    if PROJECT_TYPE_MARKERS.iter().any(|m| query.contains(m)) {
        return QueryIntent::ProjectTypeDiscovery;
    }
    if DEPENDENCY_MARKERS.iter().any(|m| query.contains(m)) {
        return QueryIntent::DependencyListing;
    }
    QueryIntent::CodeSearch
}

/// Plan a query: classify its intent and, when a project analysis is
/// available, expand it with intent- and framework-specific terms.
pub fn plan(query: &str, project: Option<&Project>) -> QueryAnalysis {
    let intent = classify_intent(query);

    let added_terms = match project {
        Some(project) => expansion_terms(query, intent, project),
        None => Vec::new(),
    };

    let expanded_query = if added_terms.is_empty() {
        query.to_string()
    } else {
        format!("{} {}", query, added_terms.join(" "))
    };

    QueryAnalysis {
        intent,
        original_query: query.to_string(),
        expanded_query,
        added_terms,
    }
}

fn expansion_terms(query: &str, intent: QueryIntent, project: &Project) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let mut terms: Vec<String> = Vec::new();

    let mut push = |term: &str, terms: &mut Vec<String>| {
        if terms.len() >= MAX_ADDED_TERMS {
            return;
        }
        if query_lower.contains(&term.to_lowercase()) {
            return;
        }
        if terms.iter().any(|t| t.eq_ignore_ascii_case(term)) {
            return;
        }
        terms.push(term.to_string());
    };

    match intent {
        QueryIntent::CodeSearch => {
            for framework in &project.frameworks {
                for term in framework_syntax_terms(&framework.name) {
                    push(term, &mut terms);
                }
            }
        }
        QueryIntent::DependencyListing => {
            for term in ["dependency", "version", "manifest"] {
                push(term, &mut terms);
            }
            for framework in &project.frameworks {
                push(&framework.name, &mut terms);
            }
        }
        QueryIntent::ProjectTypeDiscovery => {
            for term in ["framework", "project analysis"] {
                push(term, &mut terms);
            }
            for framework in &project.frameworks {
                push(&framework.name, &mut terms);
                if framework.kind == FrameworkKind::Web {
                    push("web framework", &mut terms);
                }
            }
        }
    }

    terms
}

/// Source-level vocabulary characteristic of a framework, used to
/// expand code searches so they match the syntax actually indexed.
fn framework_syntax_terms(name: &str) -> &'static [&'static str] {
    match name.to_lowercase().as_str() {
        "flask" => &["@app.route", "render_template", "Blueprint"],
        "fastapi" => &["@app.get", "@app.post", "APIRouter"],
        "django" => &["urlpatterns", "models.Model"],
        "express" => &["app.get", "app.post", "router"],
        "spring boot" => &["@RestController", "@GetMapping", "@RequestMapping"],
        "react" => &["useState", "useEffect", "component"],
        "vue" => &["defineComponent"],
        "angular" => &["@Component", "@Injectable"],
        "actix web" => &["HttpServer", "web::get"],
        "axum" => &["Router", "axum::routing"],
        "rocket" => &["#[get(", "routes!"],
        "gin" => &["gin.Default", "c.JSON"],
        _ => &[],
    }
}
