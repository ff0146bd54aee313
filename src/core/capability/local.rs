//! Deterministic local capability used when no remote is configured
//! or the remote is unreachable.
//!
//! Embeddings are feature-hashed bags of unigrams and bigrams, so two
//! texts sharing vocabulary land near each other without any model.
//! Classification walks a static signature table of well-known
//! dependency names; every hit carries low confidence because nothing
//! validated it against the actual code.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::core::capability::Capability;
use crate::core::error::Result;
use crate::core::types::{Confidence, Dependency, FrameworkClassification, FrameworkKind};

/// Signature table: substring of a dependency name, canonical framework
/// name, category. A dependency may hit several rows (for example
/// `flask-sqlalchemy` names both a web and a database framework).
const SIGNATURES: &[(&str, &str, FrameworkKind)] = &[
    ("flask", "Flask", FrameworkKind::Web),
    ("django", "Django", FrameworkKind::Web),
    ("fastapi", "FastAPI", FrameworkKind::Web),
    ("spring", "Spring Boot", FrameworkKind::Web),
    ("express", "Express", FrameworkKind::Web),
    ("actix", "Actix Web", FrameworkKind::Web),
    ("axum", "Axum", FrameworkKind::Web),
    ("rocket", "Rocket", FrameworkKind::Web),
    ("gin-gonic", "Gin", FrameworkKind::Web),
    ("react", "React", FrameworkKind::Ui),
    ("vue", "Vue", FrameworkKind::Ui),
    ("angular", "Angular", FrameworkKind::Ui),
    ("bootstrap", "Bootstrap", FrameworkKind::Ui),
    ("tailwind", "Tailwind CSS", FrameworkKind::Ui),
    ("sqlalchemy", "SQLAlchemy", FrameworkKind::Database),
    ("psycopg", "psycopg", FrameworkKind::Database),
    ("pymongo", "PyMongo", FrameworkKind::Database),
    ("mongoose", "Mongoose", FrameworkKind::Database),
    ("sequelize", "Sequelize", FrameworkKind::Database),
    ("diesel", "Diesel", FrameworkKind::Database),
    ("sqlx", "SQLx", FrameworkKind::Database),
    ("hibernate", "Hibernate", FrameworkKind::Database),
    ("jpa", "Spring Data JPA", FrameworkKind::Database),
    ("pytest", "pytest", FrameworkKind::Testing),
    ("jest", "Jest", FrameworkKind::Testing),
    ("junit", "JUnit", FrameworkKind::Testing),
    ("mocha", "Mocha", FrameworkKind::Testing),
    ("vitest", "Vitest", FrameworkKind::Testing),
    ("jinja", "Jinja2", FrameworkKind::Templating),
    ("handlebars", "Handlebars", FrameworkKind::Templating),
    ("thymeleaf", "Thymeleaf", FrameworkKind::Templating),
];

/// Always-available capability with no external dependencies.
pub struct LocalCapability {
    dims: usize,
}

impl LocalCapability {
    /// Create a local capability producing vectors of `dims` entries.
    pub fn new(dims: usize) -> Self {
        assert!(dims > 0, "embedding dims must be > 0");
        Self { dims }
    }

    /// Vector dimensionality.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Classify dependencies against the static signature table.
    ///
    /// Every match is reported with [`Confidence::Low`]. Results are
    /// deduplicated by framework name, preserving first-seen order.
    pub fn classify_static(&self, dependencies: &[Dependency]) -> Vec<FrameworkClassification> {
        let mut frameworks: Vec<FrameworkClassification> = Vec::new();

        for dep in dependencies {
            let name = dep.name.to_lowercase();
            for (pattern, display, kind) in SIGNATURES {
                if name.contains(pattern)
                    && !frameworks.iter().any(|f| f.name == *display)
                {
                    frameworks.push(FrameworkClassification {
                        name: (*display).to_string(),
                        kind: *kind,
                        confidence: Confidence::Low,
                    });
                }
            }
        }

        frameworks
    }

    /// Embed a batch of texts. Deterministic: the same text always
    /// produces the same vector.
    pub fn embed_deterministic(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return vector;
        }

        for token in &tokens {
            self.bump(&mut vector, token);
        }
        for pair in tokens.windows(2) {
            self.bump(&mut vector, &format!("{} {}", pair[0], pair[1]));
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }

    fn bump(&self, vector: &mut [f32], feature: &str) {
        let h = feature_hash(feature);
        let bucket = (h >> 1) as usize % self.dims;
        let sign = if h & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }
}

#[async_trait]
impl Capability for LocalCapability {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn classify(
        &self,
        dependencies: &[Dependency],
    ) -> Result<Vec<FrameworkClassification>> {
        Ok(self.classify_static(dependencies))
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.embed_deterministic(texts))
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

fn feature_hash(feature: &str) -> u64 {
    let digest = Sha256::digest(feature.as_bytes());
    u64::from_le_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}
