//! HTTP-backed capability implementation.
//!
//! Talks to a classification/embedding service over JSON. The service
//! contract is deliberately loose: classification responses may be a
//! structured `classifications` array or a free-text `response` field
//! using the `FRAMEWORK: name | TYPE: kind | CONFIDENCE: level` line
//! protocol, which model-backed services tend to produce.

use async_trait::async_trait;
use std::time::Duration;

use crate::core::capability::Capability;
use crate::core::config::CapabilityConfig;
use crate::core::error::{LodestarError, Result};
use crate::core::types::{Confidence, Dependency, FrameworkClassification, FrameworkKind};

/// Capability backend speaking JSON over HTTP.
pub struct HttpCapability {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCapability {
    /// Build a backend from configuration. The per-request timeout is
    /// enforced by the underlying HTTP client.
    pub fn new(config: &CapabilityConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl Capability for HttpCapability {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn classify(
        &self,
        dependencies: &[Dependency],
    ) -> Result<Vec<FrameworkClassification>> {
        let payload: Vec<_> = dependencies
            .iter()
            .map(|d| {
                serde_json::json!({
                    "name": d.name,
                    "version": d.version,
                })
            })
            .collect();

        let response = self
            .client
            .post(self.url("classify"))
            .json(&serde_json::json!({ "dependencies": payload }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LodestarError::CapabilityUnavailable(format!(
                "classify returned HTTP {status}"
            )));
        }

        let json: serde_json::Value = response.json().await?;
        parse_classify_response(&json)
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(self.url("embed"))
            .json(&serde_json::json!({ "texts": texts }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LodestarError::CapabilityUnavailable(format!(
                "embed returned HTTP {status}"
            )));
        }

        let json: serde_json::Value = response.json().await?;
        parse_embed_response(&json)
    }
}

/// Parse a classification response.
///
/// Accepts either shape:
/// - `{"classifications": [{"name": ..., "kind": ..., "confidence": ...}]}`
///   (a `"type"` key is accepted in place of `"kind"`)
/// - `{"response": "FRAMEWORK: ... | TYPE: ... | CONFIDENCE: ..."}`
fn parse_classify_response(json: &serde_json::Value) -> Result<Vec<FrameworkClassification>> {
    if let Some(items) = json.get("classifications").and_then(|c| c.as_array()) {
        let mut frameworks = Vec::with_capacity(items.len());
        for item in items {
            let name = item
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or("")
                .trim();
            if name.is_empty() {
                continue;
            }
            let kind = item
                .get("kind")
                .or_else(|| item.get("type"))
                .and_then(|k| k.as_str())
                .unwrap_or("other");
            let confidence = item
                .get("confidence")
                .and_then(|c| c.as_str())
                .unwrap_or("low");

            frameworks.push(FrameworkClassification {
                name: name.to_string(),
                kind: FrameworkKind::parse(kind),
                confidence: Confidence::parse(confidence),
            });
        }
        return Ok(frameworks);
    }

    if let Some(text) = json.get("response").and_then(|r| r.as_str()) {
        return Ok(parse_classification_lines(text));
    }

    Err(LodestarError::CapabilityUnavailable(
        "classify response had neither 'classifications' nor 'response'".to_string(),
    ))
}

/// Parse the `FRAMEWORK: name | TYPE: kind | CONFIDENCE: level` line
/// protocol. Lines that do not match are skipped.
pub(crate) fn parse_classification_lines(text: &str) -> Vec<FrameworkClassification> {
    let mut frameworks = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if !line.starts_with("FRAMEWORK:") {
            continue;
        }

        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() < 3 {
            continue;
        }

        let name = parts[0].trim_start_matches("FRAMEWORK:").trim();
        let kind = parts[1].trim().trim_start_matches("TYPE:").trim();
        let confidence = parts[2].trim().trim_start_matches("CONFIDENCE:").trim();

        if name.is_empty() {
            continue;
        }

        frameworks.push(FrameworkClassification {
            name: name.to_string(),
            kind: FrameworkKind::parse(kind),
            confidence: Confidence::parse(confidence),
        });
    }

    frameworks
}

/// Parse an embedding response of shape `{"embeddings": [[f32, ...]]}`.
fn parse_embed_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let rows = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| {
            LodestarError::CapabilityUnavailable(
                "embed response missing 'embeddings' array".to_string(),
            )
        })?;

    let mut embeddings = Vec::with_capacity(rows.len());
    for row in rows {
        let values = row.as_array().ok_or_else(|| {
            LodestarError::CapabilityUnavailable("embedding row is not an array".to_string())
        })?;
        embeddings.push(
            values
                .iter()
                .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                .collect(),
        );
    }

    Ok(embeddings)
}
