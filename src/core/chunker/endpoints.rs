//! REST API endpoint extraction.
//!
//! Scans source lines for route declarations (Flask/FastAPI decorators,
//! Spring mapping annotations, Express-style registration calls, Rocket
//! and Actix attributes, Go handler registrations) and captures each one
//! together with its handler, from the decorator's first line to the
//! handler's natural end. A route declaration with no handler following
//! it yields no endpoint but is reported as malformed.

use once_cell::sync::Lazy;
use regex::Regex;

use super::language::Language;

/// One extracted endpoint.
#[derive(Debug, Clone)]
pub struct EndpointMatch {
    /// 1-indexed line of the route declaration
    pub line_number: usize,

    /// Route path when extractable, otherwise the handler name
    pub name: String,

    /// Declaration line(s) plus the handler body
    pub content: String,
}

/// A route declaration with no handler attached.
#[derive(Debug, Clone)]
pub struct MalformedDecorator {
    /// 1-indexed line of the declaration
    pub line_number: usize,

    /// First line of the declaration, trimmed
    pub decorator: String,
}

/// Everything the endpoint scan found in one file.
#[derive(Debug, Default)]
pub struct EndpointScan {
    pub endpoints: Vec<EndpointMatch>,
    pub malformed: Vec<MalformedDecorator>,
}

// Declarations rarely run long; bodies can.
const MAX_DECORATOR_LINES: usize = 20;
const MAX_SIGNATURE_LINES: usize = 20;
const MAX_BODY_LINES: usize = 2000;
const MAX_CALL_LINES: usize = 400;

static PYTHON_ROUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@\w+(?:\.\w+)*\.(?:route|get|post|put|delete|patch)\s*\(").unwrap());
static PY_DEF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:async\s+)?def\s+(\w+)").unwrap());

static JAVA_MAPPING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@(?:RequestMapping|GetMapping|PostMapping|PutMapping|DeleteMapping|PatchMapping)\b")
        .unwrap()
});
static JAVA_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:value|path)\s*=\s*["']([^"']+)["']"#).unwrap());
static JAVA_METHOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*\(").unwrap());

static JS_ROUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:app|router|server|api)\.(?:get|post|put|delete|patch)\s*\(").unwrap()
});

static RUST_ROUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\[(?:get|post|put|delete|patch|route)\s*\(").unwrap());
static RUST_FN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:pub\s*(?:\([^)]*\))?\s*)?(?:async\s+)?(?:unsafe\s+)?fn\s+(\w+)").unwrap()
});

static GO_ROUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+\.(?:HandleFunc|Handle|GET|POST|PUT|DELETE|PATCH)\s*\(").unwrap());

static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).unwrap());

/// Lexical hints used while balancing delimiters across lines.
struct ScanSyntax {
    quotes: &'static [char],
    line_comment: &'static str,
}

const PY_SYNTAX: ScanSyntax = ScanSyntax {
    quotes: &['\'', '"'],
    line_comment: "#",
};
const JS_SYNTAX: ScanSyntax = ScanSyntax {
    quotes: &['\'', '"', '`'],
    line_comment: "//",
};
// Single quotes are skipped: Rust lifetimes and Java char literals
// would otherwise derail the balance.
const C_SYNTAX: ScanSyntax = ScanSyntax {
    quotes: &['"'],
    line_comment: "//",
};

/// Scan a file's lines for endpoints in the given language.
pub fn scan(language: Language, lines: &[&str]) -> EndpointScan {
    match language {
        Language::Python => scan_python(lines),
        Language::Java => scan_java(lines),
        Language::JavaScript | Language::TypeScript => {
            scan_call_style(lines, &JS_ROUTE_RE, &JS_SYNTAX)
        }
        Language::Rust => scan_rust(lines),
        Language::Go => scan_call_style(lines, &GO_ROUTE_RE, &C_SYNTAX),
        Language::PlainText => EndpointScan::default(),
    }
}

fn scan_python(lines: &[&str]) -> EndpointScan {
    let mut result = EndpointScan::default();
    let mut i = 0;

    while i < lines.len() {
        if !PYTHON_ROUTE_RE.is_match(lines[i].trim_start()) {
            i += 1;
            continue;
        }

        let Some(decorator_end) =
            balanced_end(lines, i, MAX_DECORATOR_LINES, '(', ')', &PY_SYNTAX)
        else {
            result.malformed.push(malformed_at(lines, i));
            i += 1;
            continue;
        };

        let decorator_text = lines[i..=decorator_end].join("\n");
        let j = skip_decorators(lines, decorator_end + 1, &PY_SYNTAX);

        let handler = lines
            .get(j)
            .and_then(|line| PY_DEF_RE.captures(line.trim_start()));
        let Some(def_caps) = handler else {
            result.malformed.push(malformed_at(lines, i));
            i = decorator_end + 1;
            continue;
        };

        let def_indent = indent_width(lines[j]);
        let sig_end = if lines[j].contains('(') {
            balanced_end(lines, j, MAX_SIGNATURE_LINES, '(', ')', &PY_SYNTAX).unwrap_or(j)
        } else {
            j
        };

        // Body runs while lines stay indented deeper than the def
        let mut body_end = sig_end;
        for (k, line) in lines.iter().enumerate().skip(sig_end + 1) {
            if line.trim().is_empty() {
                continue;
            }
            if indent_width(line) > def_indent && k - sig_end <= MAX_BODY_LINES {
                body_end = k;
            } else {
                break;
            }
        }

        let name = QUOTED_RE
            .captures(&decorator_text)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| def_caps[1].to_string());

        result.endpoints.push(EndpointMatch {
            line_number: i + 1,
            name,
            content: lines[i..=body_end].join("\n"),
        });

        // Resume right after this decorator so stacked route
        // decorators on the same handler each produce a document.
        i = decorator_end + 1;
    }

    result
}

fn scan_java(lines: &[&str]) -> EndpointScan {
    let mut result = EndpointScan::default();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim_start();
        if !JAVA_MAPPING_RE.is_match(trimmed) {
            i += 1;
            continue;
        }

        // Bare annotations like `@GetMapping` have no parentheses
        let decorator_end = if trimmed.contains('(') {
            match balanced_end(lines, i, MAX_DECORATOR_LINES, '(', ')', &C_SYNTAX) {
                Some(end) => end,
                None => {
                    result.malformed.push(malformed_at(lines, i));
                    i += 1;
                    continue;
                }
            }
        } else {
            i
        };

        let annotation_text = lines[i..=decorator_end].join("\n");
        let j = skip_decorators(lines, decorator_end + 1, &C_SYNTAX);

        // A handler signature needs a parameter list
        if j >= lines.len() || !lines[j].contains('(') {
            result.malformed.push(malformed_at(lines, i));
            i = decorator_end + 1;
            continue;
        }

        let sig_end =
            balanced_end(lines, j, MAX_SIGNATURE_LINES, '(', ')', &C_SYNTAX).unwrap_or(j);
        let body_end = brace_body_end(lines, sig_end, &C_SYNTAX);

        let name = JAVA_VALUE_RE
            .captures(&annotation_text)
            .or_else(|| QUOTED_RE.captures(&annotation_text))
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| {
                let signature = lines[j..=sig_end].join(" ");
                JAVA_METHOD_RE
                    .captures(&signature)
                    .map(|c| c[1].to_string())
                    .unwrap_or_default()
            });

        result.endpoints.push(EndpointMatch {
            line_number: i + 1,
            name,
            content: lines[i..=body_end].join("\n"),
        });

        i = decorator_end + 1;
    }

    result
}

fn scan_rust(lines: &[&str]) -> EndpointScan {
    let mut result = EndpointScan::default();
    let mut i = 0;

    while i < lines.len() {
        if !RUST_ROUTE_RE.is_match(lines[i].trim_start()) {
            i += 1;
            continue;
        }

        let Some(attr_end) = balanced_end(lines, i, MAX_DECORATOR_LINES, '[', ']', &C_SYNTAX)
        else {
            result.malformed.push(malformed_at(lines, i));
            i += 1;
            continue;
        };

        let attr_text = lines[i..=attr_end].join("\n");
        let j = skip_rust_attributes(lines, attr_end + 1);

        let handler = lines
            .get(j)
            .and_then(|line| RUST_FN_RE.captures(line.trim_start()));
        let Some(fn_caps) = handler else {
            result.malformed.push(malformed_at(lines, i));
            i = attr_end + 1;
            continue;
        };

        let sig_end = if lines[j].contains('(') {
            balanced_end(lines, j, MAX_SIGNATURE_LINES, '(', ')', &C_SYNTAX).unwrap_or(j)
        } else {
            j
        };
        let body_end = brace_body_end(lines, sig_end, &C_SYNTAX);

        let name = QUOTED_RE
            .captures(&attr_text)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| fn_caps[1].to_string());

        result.endpoints.push(EndpointMatch {
            line_number: i + 1,
            name,
            content: lines[i..=body_end].join("\n"),
        });

        i = attr_end + 1;
    }

    result
}

fn scan_call_style(lines: &[&str], route_re: &Regex, syntax: &ScanSyntax) -> EndpointScan {
    let mut result = EndpointScan::default();
    let mut i = 0;

    while i < lines.len() {
        if !route_re.is_match(lines[i].trim_start()) {
            i += 1;
            continue;
        }

        match balanced_end(lines, i, MAX_CALL_LINES, '(', ')', syntax) {
            Some(end) => {
                let text = lines[i..=end].join("\n");
                let name = QUOTED_RE
                    .captures(&text)
                    .map(|c| c[1].to_string())
                    .unwrap_or_default();

                result.endpoints.push(EndpointMatch {
                    line_number: i + 1,
                    name,
                    content: text,
                });
                i = end + 1;
            }
            None => {
                result.malformed.push(malformed_at(lines, i));
                i += 1;
            }
        }
    }

    result
}

fn malformed_at(lines: &[&str], i: usize) -> MalformedDecorator {
    MalformedDecorator {
        line_number: i + 1,
        decorator: lines[i].trim().to_string(),
    }
}

/// Skip blank lines and further `@…` decorators/annotations starting at
/// `from`, returning the index of the first line that is neither.
fn skip_decorators(lines: &[&str], from: usize, syntax: &ScanSyntax) -> usize {
    let mut j = from;
    while j < lines.len() {
        let t = lines[j].trim_start();
        if t.is_empty() {
            j += 1;
            continue;
        }
        if t.starts_with('@') {
            j = if t.contains('(') {
                match balanced_end(lines, j, MAX_DECORATOR_LINES, '(', ')', syntax) {
                    Some(end) => end + 1,
                    None => lines.len(),
                }
            } else {
                j + 1
            };
            continue;
        }
        break;
    }
    j
}

/// Skip blank lines and further `#[…]` attributes.
fn skip_rust_attributes(lines: &[&str], from: usize) -> usize {
    let mut j = from;
    while j < lines.len() {
        let t = lines[j].trim_start();
        if t.is_empty() {
            j += 1;
            continue;
        }
        if t.starts_with("#[") {
            j = match balanced_end(lines, j, MAX_DECORATOR_LINES, '[', ']', &C_SYNTAX) {
                Some(end) => end + 1,
                None => lines.len(),
            };
            continue;
        }
        break;
    }
    j
}

/// Find where a brace-delimited body ends, starting the search on the
/// signature's last line. Declarations that end in `;` before any `{`
/// (interface methods, trait fns) end on that line. If nothing closes,
/// capture runs to end of file.
fn brace_body_end(lines: &[&str], sig_end: usize, syntax: &ScanSyntax) -> usize {
    for k in sig_end..lines.len().min(sig_end + MAX_SIGNATURE_LINES) {
        let line = lines[k];
        let brace = line.find('{');
        let semi = line.find(';');

        match (brace, semi) {
            (Some(b), Some(s)) if s < b => return k,
            (Some(_), _) => {
                return balanced_end(lines, k, MAX_BODY_LINES, '{', '}', syntax)
                    .unwrap_or(lines.len() - 1);
            }
            (None, Some(_)) => return k,
            (None, None) => continue,
        }
    }
    sig_end
}

/// Line index where the delimiter group opening at or after `start`
/// closes. Quote- and line-comment-aware so delimiters inside string
/// literals and trailing comments don't skew the count. String literals
/// are assumed not to span lines.
fn balanced_end(
    lines: &[&str],
    start: usize,
    limit: usize,
    open: char,
    close: char,
    syntax: &ScanSyntax,
) -> Option<usize> {
    let mut depth = 0i32;
    let mut opened = false;

    for (idx, line) in lines
        .iter()
        .enumerate()
        .skip(start)
        .take(limit.min(lines.len() - start))
    {
        let chars: Vec<char> = line.chars().collect();
        let mut in_string: Option<char> = None;
        let mut c_idx = 0;

        while c_idx < chars.len() {
            let c = chars[c_idx];

            if let Some(q) = in_string {
                if c == '\\' {
                    c_idx += 2;
                    continue;
                }
                if c == q {
                    in_string = None;
                }
                c_idx += 1;
                continue;
            }

            if starts_with_at(&chars, c_idx, syntax.line_comment) {
                break;
            }

            if syntax.quotes.contains(&c) {
                in_string = Some(c);
            } else if c == open {
                depth += 1;
                opened = true;
            } else if c == close {
                depth -= 1;
                if opened && depth <= 0 {
                    return Some(idx);
                }
            }

            c_idx += 1;
        }
    }

    None
}

fn starts_with_at(chars: &[char], idx: usize, needle: &str) -> bool {
    !needle.is_empty()
        && needle
            .chars()
            .enumerate()
            .all(|(k, nc)| chars.get(idx + k) == Some(&nc))
}

fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
