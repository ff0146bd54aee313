//! Manifest parsing for dependency discovery.
//!
//! Reads the well-known manifest files at the project root and
//! extracts declared dependencies. Each parser is lenient: a manifest
//! that fails to parse contributes nothing instead of failing the
//! analysis.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::core::types::{Dependency, DependencySource};

/// Result of reading the project root's manifest files.
#[derive(Debug, Default)]
pub struct ManifestScan {
    /// Project name, from the first manifest that declares one
    pub name: Option<String>,
    /// Declared dependencies in manifest order
    pub dependencies: Vec<Dependency>,
    /// Manifest file names that were successfully read
    pub manifests: Vec<String>,
}

// Version portion of a Python requirement specifier, e.g. ">=2.3.0".
static PY_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[=<>!~]+\s*([0-9][0-9A-Za-z.\-+*]*)").unwrap());

// setup.py install_requires list body.
static SETUP_REQUIRES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)install_requires\s*=\s*\[([^\]]*)\]").unwrap());

static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).unwrap());

// Leading <dependency> children in conventional order; the closing tag
// is not required because only these fields matter.
static POM_DEP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<dependency>\s*<groupId>([^<]+)</groupId>\s*<artifactId>([^<]+)</artifactId>\s*(?:<version>([^<]+)</version>)?",
    )
    .unwrap()
});

static GRADLE_DEP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:implementation|api|compileOnly|compile|runtimeOnly|testImplementation)\s*\(?\s*['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

/// Parse every recognized manifest at `root`.
///
/// Unreadable or malformed manifests are logged and skipped.
pub fn parse_manifests(root: &Path) -> ManifestScan {
    let mut scan = ManifestScan::default();

    for file_name in [
        "requirements.txt",
        "setup.py",
        "pyproject.toml",
        "package.json",
        "pom.xml",
        "build.gradle",
        "build.gradle.kts",
        "Cargo.toml",
        "go.mod",
    ] {
        let path = root.join(file_name);
        if !path.is_file() {
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Skipping unreadable manifest {:?}: {}", path, e);
                continue;
            }
        };

        let (name, mut dependencies) = match file_name {
            "requirements.txt" => (None, parse_requirements_txt(&content)),
            "setup.py" => (None, parse_setup_py(&content)),
            "pyproject.toml" => parse_pyproject_toml(&content),
            "package.json" => parse_package_json(&content),
            "pom.xml" => (None, parse_pom_xml(&content)),
            "build.gradle" | "build.gradle.kts" => (None, parse_build_gradle(&content)),
            "Cargo.toml" => parse_cargo_toml(&content),
            "go.mod" => parse_go_mod(&content),
            _ => (None, Vec::new()),
        };

        if scan.name.is_none() {
            scan.name = name;
        }
        scan.dependencies.append(&mut dependencies);
        scan.manifests.push(file_name.to_string());
    }

    scan
}

fn manifest_dep(name: impl Into<String>, version: Option<String>) -> Dependency {
    Dependency {
        name: name.into(),
        version,
        source: DependencySource::Manifest,
    }
}

/// Parse one PEP 508-ish requirement line into name and version.
fn parse_requirement_spec(spec: &str) -> Option<(String, Option<String>)> {
    let spec = spec.trim();
    if spec.is_empty() || spec.starts_with('#') || spec.starts_with('-') {
        return None;
    }

    let name: String = spec
        .chars()
        .take_while(|c| !"=<>!~;[ \t".contains(*c))
        .collect();
    let name = name.trim().to_string();
    if name.is_empty() {
        return None;
    }

    let version = PY_VERSION_RE
        .captures(spec)
        .map(|captures| captures[1].to_string());
    Some((name, version))
}

pub(crate) fn parse_requirements_txt(content: &str) -> Vec<Dependency> {
    content
        .lines()
        .filter_map(parse_requirement_spec)
        .map(|(name, version)| manifest_dep(name, version))
        .collect()
}

pub(crate) fn parse_setup_py(content: &str) -> Vec<Dependency> {
    let Some(captures) = SETUP_REQUIRES_RE.captures(content) else {
        return Vec::new();
    };

    QUOTED_RE
        .captures_iter(&captures[1])
        .filter_map(|quoted| parse_requirement_spec(&quoted[1]))
        .map(|(name, version)| manifest_dep(name, version))
        .collect()
}

pub(crate) fn parse_pyproject_toml(content: &str) -> (Option<String>, Vec<Dependency>) {
    let value: toml::Value = match toml::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Malformed pyproject.toml: {}", e);
            return (None, Vec::new());
        }
    };

    let project = value.get("project");
    let name = project
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(|n| n.to_string());

    let dependencies = project
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
        .map(|specs| {
            specs
                .iter()
                .filter_map(|s| s.as_str())
                .filter_map(parse_requirement_spec)
                .map(|(name, version)| manifest_dep(name, version))
                .collect()
        })
        .unwrap_or_default();

    (name, dependencies)
}

pub(crate) fn parse_package_json(content: &str) -> (Option<String>, Vec<Dependency>) {
    let value: serde_json::Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Malformed package.json: {}", e);
            return (None, Vec::new());
        }
    };

    let name = value
        .get("name")
        .and_then(|n| n.as_str())
        .map(|n| n.to_string());

    let mut dependencies = Vec::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = value.get(section).and_then(|d| d.as_object()) {
            for (dep_name, dep_version) in deps {
                let version = dep_version
                    .as_str()
                    .map(|v| v.trim_start_matches(['^', '~', '>', '=', '<', ' ']).to_string())
                    .filter(|v| !v.is_empty());
                dependencies.push(manifest_dep(dep_name.clone(), version));
            }
        }
    }

    (name, dependencies)
}

pub(crate) fn parse_cargo_toml(content: &str) -> (Option<String>, Vec<Dependency>) {
    let value: toml::Value = match toml::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Malformed Cargo.toml: {}", e);
            return (None, Vec::new());
        }
    };

    let name = value
        .get("package")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(|n| n.to_string());

    let mut dependencies = Vec::new();
    for section in ["dependencies", "dev-dependencies"] {
        if let Some(table) = value.get(section).and_then(|t| t.as_table()) {
            for (dep_name, spec) in table {
                let version = spec
                    .as_str()
                    .map(|v| v.to_string())
                    .or_else(|| {
                        spec.get("version")
                            .and_then(|v| v.as_str())
                            .map(|v| v.to_string())
                    });
                dependencies.push(manifest_dep(dep_name.clone(), version));
            }
        }
    }

    (name, dependencies)
}

pub(crate) fn parse_pom_xml(content: &str) -> Vec<Dependency> {
    POM_DEP_RE
        .captures_iter(content)
        .map(|captures| {
            let name = format!("{}:{}", captures[1].trim(), captures[2].trim());
            let version = captures.get(3).map(|v| v.as_str().trim().to_string());
            manifest_dep(name, version)
        })
        .collect()
}

pub(crate) fn parse_build_gradle(content: &str) -> Vec<Dependency> {
    GRADLE_DEP_RE
        .captures_iter(content)
        .filter_map(|captures| {
            let coordinate = &captures[1];
            let parts: Vec<&str> = coordinate.split(':').collect();
            match parts.len() {
                0 => None,
                1 => Some(manifest_dep(parts[0], None)),
                2 => Some(manifest_dep(format!("{}:{}", parts[0], parts[1]), None)),
                _ => Some(manifest_dep(
                    format!("{}:{}", parts[0], parts[1]),
                    Some(parts[2].to_string()),
                )),
            }
        })
        .collect()
}

pub(crate) fn parse_go_mod(content: &str) -> (Option<String>, Vec<Dependency>) {
    let mut name = None;
    let mut dependencies = Vec::new();
    let mut in_require = false;

    for line in content.lines() {
        // Strip trailing comments like "// indirect"
        let line = line.split("//").next().unwrap_or("").trim();

        if let Some(module) = line.strip_prefix("module ") {
            name = module
                .trim()
                .rsplit('/')
                .next()
                .map(|segment| segment.to_string());
            continue;
        }

        if line == "require (" {
            in_require = true;
            continue;
        }
        if in_require && line == ")" {
            in_require = false;
            continue;
        }

        let dep_line = if let Some(rest) = line.strip_prefix("require ") {
            rest
        } else if in_require && !line.is_empty() {
            line
        } else {
            continue;
        };

        let mut parts = dep_line.split_whitespace();
        if let (Some(module), Some(version)) = (parts.next(), parts.next()) {
            dependencies.push(manifest_dep(module, Some(version.to_string())));
        }
    }

    (name, dependencies)
}
