// Test fixtures for integration testing

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test project fixture for creating synthetic project directories.
///
/// The project lives in a named subdirectory of a temp dir so the
/// derived collection name is stable across runs.
#[allow(dead_code)] // Used in integration tests
pub struct TestProject {
    pub dir: TempDir,
    pub root: PathBuf,
}

impl TestProject {
    /// Create a project under `<temp>/<name>` with the given files.
    #[allow(dead_code)] // Used in integration tests
    pub fn with_files(name: &str, files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().join(name);

        for (path, content) in files {
            let full_path = root.join(path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create directories");
            }
            std::fs::write(&full_path, content).expect("Failed to write file");
        }

        Self { dir, root }
    }

    /// A minimal Flask project: manifest plus one two-route module.
    /// Routes sit at lines 5 and 9 of app.py.
    #[allow(dead_code)] // Used in integration tests
    pub fn flask(name: &str) -> Self {
        Self::with_files(
            name,
            &[
                ("requirements.txt", "flask==2.3.0\n"),
                (
                    "app.py",
                    "\
from flask import Flask, jsonify

app = Flask(__name__)

@app.route('/users')
def list_users():
    return jsonify([])

@app.route('/health')
def health():
    return jsonify({'status': 'ok'})
",
                ),
            ],
        )
    }

    /// A Flask project whose service module has five routes at known
    /// line positions (see [`orders_service_source`]).
    #[allow(dead_code)] // Used in integration tests
    pub fn orders(name: &str) -> Self {
        let source = orders_service_source();
        Self::with_files(
            name,
            &[
                ("requirements.txt", "flask==2.3.0\n"),
                ("service.py", source.as_str()),
            ],
        )
    }

    /// Get path to the project root
    #[allow(dead_code)] // Used in integration tests
    pub fn path(&self) -> &Path {
        &self.root
    }
}

/// Decorator line positions in [`orders_service_source`].
#[allow(dead_code)] // Used in integration tests
pub const ORDERS_ROUTE_LINES: [usize; 5] = [31, 36, 126, 153, 181];

/// Flask service source with route decorators at the exact lines in
/// [`ORDERS_ROUTE_LINES`]. Built line by line with position assertions
/// so edits to the fixture can't silently shift the routes.
pub fn orders_service_source() -> String {
    let mut b = SourceBuilder::new();

    b.line("from flask import Flask, jsonify, request");
    b.line("from datetime import datetime");
    b.line("");
    b.line("app = Flask(__name__)");
    b.line("");
    b.line("ORDERS = {}");
    b.line("");
    b.pad_to(30);

    b.at(31, "@app.route('/orders', methods=['GET'])");
    b.line("def list_orders():");
    b.line("    return jsonify(list(ORDERS.values()))");
    b.line("");
    b.line("");

    b.at(36, "@app.route('/orders/<int:order_id>', methods=['GET'])");
    b.line("def get_order(order_id):");
    b.line("    order = ORDERS.get(order_id)");
    b.line("    if order is None:");
    b.line("        return jsonify({'error': 'not found'}), 404");
    b.line("    return jsonify(order)");
    b.pad_to(125);

    b.at(126, "@app.route('/orders', methods=['POST'])");
    b.line("def create_order():");
    b.line("    payload = request.get_json()");
    b.line("    order_id = len(ORDERS) + 1");
    b.line("    ORDERS[order_id] = payload");
    b.line("    return jsonify({'id': order_id}), 201");
    b.pad_to(152);

    b.at(153, "@app.route('/orders/<int:order_id>', methods=['DELETE'])");
    b.line("def delete_order(order_id):");
    b.line("    ORDERS.pop(order_id, None)");
    b.line("    return '', 204");
    b.pad_to(180);

    b.at(181, "@app.route('/health')");
    b.line("def health():");
    b.line("    return jsonify({'status': 'ok', 'time': datetime.utcnow().isoformat()})");

    b.build()
}

/// Line-by-line source builder with 1-indexed position assertions.
struct SourceBuilder {
    lines: Vec<String>,
}

impl SourceBuilder {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn line(&mut self, s: &str) {
        self.lines.push(s.to_string());
    }

    /// Append `s`, asserting it lands on line `expected`.
    fn at(&mut self, expected: usize, s: &str) {
        assert_eq!(
            self.lines.len() + 1,
            expected,
            "fixture drifted: next line is {} but expected {expected}",
            self.lines.len() + 1
        );
        self.line(s);
    }

    /// Fill with comment lines until `last` lines exist.
    fn pad_to(&mut self, last: usize) {
        while self.lines.len() < last {
            let n = self.lines.len() + 1;
            self.line(&format!("# bookkeeping section, line {n}"));
        }
    }

    fn build(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_source_route_positions() {
        let source = orders_service_source();
        let lines: Vec<&str> = source.lines().collect();

        for &line in &ORDERS_ROUTE_LINES {
            assert!(
                lines[line - 1].starts_with("@app.route("),
                "line {line} should hold a route decorator, got: {}",
                lines[line - 1]
            );
        }

        // No stray decorators beyond the five
        let total = lines
            .iter()
            .filter(|l| l.starts_with("@app.route("))
            .count();
        assert_eq!(total, ORDERS_ROUTE_LINES.len());
    }
}
