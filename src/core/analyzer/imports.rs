//! Import scanning: dependencies observed in source code.
//!
//! Complements manifest parsing. A package that is imported but never
//! declared (or the reverse) still shows up in the dependency listing,
//! which matters for projects with stale or missing manifests.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::core::types::{Dependency, DependencySource};

// Python standard library modules that imports should not report.
static PY_STDLIB: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "os", "sys", "json", "re", "datetime", "time", "math", "random", "collections",
        "itertools", "functools", "operator", "copy", "pickle", "csv", "xml", "html", "urllib",
        "http", "email", "logging", "unittest", "threading", "multiprocessing", "subprocess",
        "io", "pathlib", "tempfile", "shutil", "glob", "fnmatch", "sqlite3", "typing", "abc",
        "dataclasses", "enum", "asyncio", "contextlib",
    ]
    .into_iter()
    .collect()
});

static JS_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:import\s+[^'"()]*?from\s*|import\s*\(\s*|require\s*\(\s*|import\s*)['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

/// Extract imported package names from one source file.
///
/// The language is chosen by file extension; unrecognized extensions
/// yield nothing. Returned names are deduplicated per file.
pub fn imports_for_file(relative_path: &str, content: &str) -> Vec<Dependency> {
    let extension = relative_path.rsplit('.').next().unwrap_or("");

    let names = match extension {
        "py" => python_imports(content),
        "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" => javascript_imports(content),
        "rs" => rust_imports(content),
        "go" => go_imports(content),
        "java" => java_imports(content),
        _ => Vec::new(),
    };

    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .map(|name| Dependency {
            name,
            version: None,
            source: DependencySource::Import,
        })
        .collect()
}

fn python_imports(content: &str) -> Vec<String> {
    let mut names = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("import ") {
            // "import os, sys" names several modules
            for part in rest.split(',') {
                if let Some(token) = part.trim().split_whitespace().next() {
                    push_python_module(token, &mut names);
                }
            }
        } else if let Some(rest) = line.strip_prefix("from ") {
            if let Some(token) = rest.split_whitespace().next() {
                push_python_module(token, &mut names);
            }
        }
    }

    names
}

fn push_python_module(token: &str, names: &mut Vec<String>) {
    let root = token.split('.').next().unwrap_or("");
    if root.is_empty() || PY_STDLIB.contains(root) {
        return;
    }
    names.push(root.to_string());
}

fn javascript_imports(content: &str) -> Vec<String> {
    JS_IMPORT_RE
        .captures_iter(content)
        .filter_map(|captures| normalize_js_package(&captures[1]))
        .collect()
}

fn normalize_js_package(specifier: &str) -> Option<String> {
    if specifier.starts_with('.') || specifier.starts_with('/') || specifier.starts_with("node:") {
        return None;
    }

    let mut segments = specifier.split('/');
    if specifier.starts_with('@') {
        // Scoped packages keep "@scope/name"
        let scope = segments.next()?;
        let name = segments.next()?;
        Some(format!("{scope}/{name}"))
    } else {
        segments.next().map(|s| s.to_string())
    }
}

fn rust_imports(content: &str) -> Vec<String> {
    let mut names = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        let root = if let Some(rest) = line.strip_prefix("use ") {
            rest.split(&[':', ';', ' ', '{'][..]).next().unwrap_or("")
        } else if let Some(rest) = line.strip_prefix("extern crate ") {
            rest.split(&[';', ' '][..]).next().unwrap_or("")
        } else {
            continue;
        };

        match root {
            "" | "std" | "core" | "alloc" | "crate" | "self" | "super" => {}
            name => names.push(name.to_string()),
        }
    }

    names
}

fn go_imports(content: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        let line = line.trim();

        if line.starts_with("import (") {
            in_block = true;
            continue;
        }
        if in_block && line == ")" {
            in_block = false;
            continue;
        }

        let candidate = if let Some(rest) = line.strip_prefix("import ") {
            rest.trim()
        } else if in_block {
            line
        } else {
            continue;
        };

        // Optional alias before the quoted path
        if let Some(quoted) = candidate.split('"').nth(1) {
            // Module paths have a dotted host; "fmt" and friends do not
            if quoted.split('/').next().is_some_and(|host| host.contains('.')) {
                names.push(quoted.to_string());
            }
        }
    }

    names
}

fn java_imports(content: &str) -> Vec<String> {
    let mut names = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        let Some(rest) = line
            .strip_prefix("import static ")
            .or_else(|| line.strip_prefix("import "))
        else {
            continue;
        };

        let path = rest.trim_end_matches(';').trim();
        if path.starts_with("java.") || path.starts_with("javax.") {
            continue;
        }

        // Group id approximation: the first two package segments
        let segments: Vec<&str> = path.split('.').collect();
        if segments.len() >= 2 {
            names.push(format!("{}.{}", segments[0], segments[1]));
        }
    }

    names
}
