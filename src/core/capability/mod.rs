//! External capability seam: framework classification and text embedding.
//!
//! Both operations the engine delegates to a model-backed service go
//! through the [`Capability`] trait. [`CapabilityClient`] wraps an
//! optional remote implementation with the retry/fallback protocol:
//! every remote call gets a bounded timeout, one retry after a short
//! backoff, and then falls back to the deterministic local
//! implementation. Callers never see a hard failure from this layer;
//! degraded answers carry low confidence instead.

pub mod http;
pub mod local;

pub use http::HttpCapability;
pub use local::LocalCapability;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::CapabilityConfig;
use crate::core::error::Result;
use crate::core::types::{Dependency, FrameworkClassification};

/// A classification/embedding backend.
///
/// Implementations must be cheap to share across tasks; the engine
/// holds them behind `Arc<dyn Capability>`.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Short backend identifier used in log lines.
    fn name(&self) -> &'static str;

    /// Classify project dependencies into framework categories.
    async fn classify(
        &self,
        dependencies: &[Dependency],
    ) -> Result<Vec<FrameworkClassification>>;

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Classification result with a degradation marker.
///
/// `degraded` is true when the static fallback produced the
/// classifications, meaning the remote capability was unreachable
/// after the retry. Downstream analysis reports low confidence in
/// that case.
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub frameworks: Vec<FrameworkClassification>,
    pub degraded: bool,
}

/// Capability front-end with the retry-once-then-fallback protocol.
///
/// Holds an optional remote backend and the always-available local
/// one. The public methods are infallible: when the remote fails
/// twice, the local implementation answers instead.
pub struct CapabilityClient {
    remote: Option<Arc<dyn Capability>>,
    local: LocalCapability,
    retry_backoff: Duration,
}

impl CapabilityClient {
    /// Create a client from explicit parts. `remote = None` routes
    /// every call straight to the local implementation.
    pub fn new(
        remote: Option<Arc<dyn Capability>>,
        local: LocalCapability,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            remote,
            local,
            retry_backoff,
        }
    }

    /// Build a client from configuration. An empty endpoint disables
    /// the remote backend entirely.
    pub fn from_config(config: &CapabilityConfig) -> Result<Self> {
        let remote: Option<Arc<dyn Capability>> = if config.endpoint.trim().is_empty() {
            None
        } else {
            Some(Arc::new(HttpCapability::new(config)?))
        };

        Ok(Self::new(
            remote,
            LocalCapability::new(config.embedding_dims),
            Duration::from_millis(config.retry_backoff_ms),
        ))
    }

    /// Whether a remote backend is configured.
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Classify dependencies, falling back to the static signature
    /// table when the remote backend fails twice.
    pub async fn classify(&self, dependencies: &[Dependency]) -> ClassificationOutcome {
        if let Some(remote) = &self.remote {
            match self.remote_classify(remote, dependencies).await {
                Ok(frameworks) => {
                    return ClassificationOutcome {
                        frameworks,
                        degraded: false,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Capability '{}' classify failed after retry: {}. Using static fallback",
                        remote.name(),
                        e
                    );
                }
            }
        }

        ClassificationOutcome {
            frameworks: self.local.classify_static(dependencies),
            degraded: self.remote.is_some(),
        }
    }

    /// Embed texts, falling back to deterministic local vectors when
    /// the remote backend fails twice. Always returns one vector per
    /// input text.
    pub async fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
        if texts.is_empty() {
            return Vec::new();
        }

        if let Some(remote) = &self.remote {
            match self.remote_embed(remote, texts).await {
                Ok(vectors) => return vectors,
                Err(e) => {
                    tracing::warn!(
                        "Capability '{}' embed failed after retry: {}. Using local embeddings",
                        remote.name(),
                        e
                    );
                }
            }
        }

        self.local.embed_deterministic(texts)
    }

    /// Embed a single query text.
    pub async fn embed_query(&self, text: &str) -> Vec<f32> {
        self.embed(&[text.to_string()])
            .await
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    async fn remote_classify(
        &self,
        remote: &Arc<dyn Capability>,
        dependencies: &[Dependency],
    ) -> Result<Vec<FrameworkClassification>> {
        let mut last_err = None;

        for attempt in 0..2 {
            if attempt > 0 {
                tokio::time::sleep(self.retry_backoff).await;
            }
            match remote.classify(dependencies).await {
                Ok(frameworks) => return Ok(frameworks),
                Err(e) => {
                    tracing::debug!(
                        "classify attempt {} against '{}' failed: {}",
                        attempt + 1,
                        remote.name(),
                        e
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            crate::core::error::LodestarError::CapabilityUnavailable(
                "classify failed without error detail".to_string(),
            )
        }))
    }

    async fn remote_embed(
        &self,
        remote: &Arc<dyn Capability>,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        let mut last_err = None;

        for attempt in 0..2 {
            if attempt > 0 {
                tokio::time::sleep(self.retry_backoff).await;
            }
            match remote.embed(texts).await {
                Ok(vectors) if vectors.len() == texts.len() => return Ok(vectors),
                Ok(vectors) => {
                    last_err = Some(crate::core::error::LodestarError::CapabilityUnavailable(
                        format!(
                            "embed returned {} vectors for {} texts",
                            vectors.len(),
                            texts.len()
                        ),
                    ));
                }
                Err(e) => {
                    tracing::debug!(
                        "embed attempt {} against '{}' failed: {}",
                        attempt + 1,
                        remote.name(),
                        e
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            crate::core::error::LodestarError::CapabilityUnavailable(
                "embed failed without error detail".to_string(),
            )
        }))
    }
}
