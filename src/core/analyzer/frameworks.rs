//! Framework usage evidence and documentation content.
//!
//! The analyzer pairs every classified framework with a documentation
//! document. The body combines a syntax reference for the framework
//! with the places its patterns actually appear in the indexed code,
//! so a search for "flask route" lands on both the doc and the code
//! that uses it.

use crate::core::types::{FrameworkClassification, FrameworkKind};

/// Probe table: framework display name and a literal code pattern that
/// indicates it is in use.
const PATTERN_PROBES: &[(&str, &str)] = &[
    ("Flask", "@app.route"),
    ("Flask", "render_template"),
    ("Flask", "request.get_json"),
    ("FastAPI", "@app.get"),
    ("FastAPI", "@app.post"),
    ("Django", "urlpatterns"),
    ("Django", "models.Model"),
    ("SQLAlchemy", "db.Model"),
    ("SQLAlchemy", "create_engine"),
    ("Spring Boot", "@RestController"),
    ("Spring Boot", "@Service"),
    ("Spring Boot", "@Repository"),
    ("Spring Boot", "@Autowired"),
    ("Express", "express()"),
    ("Express", "app.listen"),
    ("React", "useState"),
    ("React", "useEffect"),
    ("Vue", "defineComponent"),
    ("Angular", "@Injectable"),
    ("Angular", "@Component"),
    ("Gin", "gin.Default"),
    ("Actix Web", "actix_web"),
    ("Axum", "axum::"),
];

/// One framework pattern observed in the scanned sources.
#[derive(Debug, Clone)]
pub struct ObservedPattern {
    pub framework: &'static str,
    pub pattern: &'static str,
    /// First file the pattern appeared in (relative path)
    pub file: String,
    /// Total occurrences across all scanned files
    pub occurrences: usize,
}

/// Record every probe hit in one file, merging counts into `observed`.
pub fn scan_file(relative_path: &str, content: &str, observed: &mut Vec<ObservedPattern>) {
    for (framework, pattern) in PATTERN_PROBES {
        let count = content.matches(pattern).count();
        if count == 0 {
            continue;
        }

        match observed
            .iter_mut()
            .find(|o| o.framework == *framework && o.pattern == *pattern)
        {
            Some(existing) => existing.occurrences += count,
            None => observed.push(ObservedPattern {
                framework,
                pattern,
                file: relative_path.to_string(),
                occurrences: count,
            }),
        }
    }
}

/// Build documentation content for one classified framework.
///
/// The body is a static syntax reference followed by the patterns
/// observed in this project, when there are any.
pub fn documentation_for(
    classification: &FrameworkClassification,
    observed: &[ObservedPattern],
) -> String {
    let mut doc = base_documentation(classification);

    let hits: Vec<&ObservedPattern> = observed
        .iter()
        .filter(|o| o.framework.eq_ignore_ascii_case(&classification.name))
        .collect();

    if !hits.is_empty() {
        doc.push_str("\nObserved in this codebase:\n");
        for hit in hits {
            doc.push_str(&format!(
                "- {} ({} occurrences, first in {})\n",
                hit.pattern, hit.occurrences, hit.file
            ));
        }
    }

    doc
}

fn base_documentation(classification: &FrameworkClassification) -> String {
    match classification.name.to_lowercase().as_str() {
        "flask" => "\
# Flask

Lightweight WSGI web framework for Python.

Routing:
- @app.route('/path') binds a URL to a handler function
- @app.route('/path', methods=['GET', 'POST']) restricts HTTP methods
- Path parameters: @app.route('/users/<int:user_id>')

Request handling:
- request.get_json() parses a JSON body
- request.args reads query parameters
- jsonify(data) builds a JSON response

Templates:
- render_template('page.html', name=value) renders a Jinja2 template

Run with `flask run` or `python app.py`.
"
        .to_string(),
        "fastapi" => "\
# FastAPI

Async Python web framework with type-driven validation.

Routing:
- @app.get('/path') / @app.post('/path') bind handlers per method
- Path parameters are typed function arguments
- Pydantic models validate request bodies

Run with `uvicorn main:app --reload`.
"
        .to_string(),
        "django" => "\
# Django

Batteries-included Python web framework.

Routing:
- urlpatterns lists path() entries mapping URLs to views
- Views are functions or classes returning HttpResponse

Models:
- Classes extending models.Model map to database tables
- Migrations via `python manage.py makemigrations`
"
        .to_string(),
        "express" => "\
# Express

Minimal Node.js web framework.

Routing:
- const app = express() creates the application
- app.get('/path', handler) / app.post('/path', handler) bind routes
- app.use(middleware) mounts middleware

Handlers receive (req, res); res.json(data) sends JSON.
Start with app.listen(port).
"
        .to_string(),
        "spring boot" => "\
# Spring Boot

Convention-over-configuration Java framework.

REST controllers:
- @RestController marks a request-handling class
- @GetMapping(\"/path\") / @PostMapping(\"/path\") bind handler methods
- @RequestMapping(value = \"/path\") is the general form

Dependency injection:
- @Service, @Repository, @Component register beans
- @Autowired injects them

Build with Maven (pom.xml) or Gradle (build.gradle).
"
        .to_string(),
        "react" => "\
# React

Component-based UI library for JavaScript.

Components:
- Function components return JSX
- useState(initial) holds local state
- useEffect(fn, deps) runs side effects

Built with a bundler; dependencies live in package.json.
"
        .to_string(),
        _ => generic_documentation(classification),
    }
}

fn generic_documentation(classification: &FrameworkClassification) -> String {
    let role = match classification.kind {
        FrameworkKind::Web => "web framework: routing, request handling, responses",
        FrameworkKind::Database => "database layer: models, queries, migrations",
        FrameworkKind::Testing => "testing framework: test discovery, assertions, fixtures",
        FrameworkKind::Ui => "UI framework: components, state, rendering",
        FrameworkKind::Templating => "template engine: template files, variable interpolation",
        FrameworkKind::Other => "library detected from project dependencies",
    };

    format!(
        "# {}\n\n{} ({}).\nCommon concerns: application structure, dependency management, build configuration.\n",
        classification.name,
        role,
        classification.kind.as_str()
    )
}
