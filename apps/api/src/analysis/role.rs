//! Role Predictor — adapter over an opaque embedding + classifier pair.
//!
//! The predictor is built once at startup. When the classifier or its embedding
//! provider is unavailable it is built in degraded mode and always answers with
//! [`DEFAULT_ROLE`]; `is_degraded()` lets the API surface that.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::normalize::normalize;
use crate::analysis::semantic::cosine_similarity;
use crate::embedding::{EmbeddingError, EmbeddingProvider, EmbeddingVector};

/// Returned without consulting the model when there is too little text.
pub const SHORT_TEXT_ROLE: &str = "General Professional";
/// Returned in degraded mode and when embedding fails mid-request.
pub const DEFAULT_ROLE: &str = "Software Developer";
/// Returned when the classifier has no opinion.
pub const UNKNOWN_ROLE: &str = "Unknown Role";

const MIN_PREDICTION_CHARS: usize = 10;

#[derive(Debug, Error)]
pub enum RoleModelError {
    #[error("failed to read role model {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid role model {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("role model has no profiles")]
    Empty,

    #[error("embedding role profile failed: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Opaque classifier from a text embedding to a role label.
pub trait RoleClassifier: Send + Sync {
    fn classify(&self, embedding: &EmbeddingVector) -> Option<String>;
}

/// A labelled role description; its embedding becomes the role's centroid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleProfile {
    pub role: String,
    pub profile: String,
}

/// Built-in role profiles used when no model file is configured.
const BUILTIN_PROFILES: &[(&str, &str)] = &[
    (
        "Software Developer",
        "software developer engineer java python javascript c++ git apis backend services \
         object oriented programming unit testing agile code review",
    ),
    (
        "Web Developer",
        "web developer frontend html css javascript typescript react angular vue node \
         express responsive design rest apis",
    ),
    (
        "Data Scientist",
        "data scientist machine learning deep learning statistics python pandas numpy \
         scikit learn tensorflow pytorch data analysis models experiments",
    ),
    (
        "Data Analyst",
        "data analyst sql excel power bi tableau reporting dashboards data analysis \
         statistics business insights",
    ),
    (
        "DevOps Engineer",
        "devops engineer docker kubernetes aws azure gcp terraform jenkins ci cd \
         infrastructure monitoring linux automation",
    ),
    (
        "Mobile Developer",
        "mobile developer android ios swift kotlin flutter react native mobile apps \
         play store app store",
    ),
    (
        "QA Engineer",
        "qa engineer quality assurance testing test automation selenium jest pytest \
         unit testing regression test plans bugs",
    ),
    (
        "Project Manager",
        "project manager project management agile scrum stakeholders planning budget \
         leadership communication delivery roadmap",
    ),
];

/// Nearest-centroid classifier over embedded role profiles.
pub struct CentroidClassifier {
    centroids: Vec<(String, EmbeddingVector)>,
}

impl CentroidClassifier {
    /// Embeds every profile with `provider`.
    pub async fn build(
        profiles: &[RoleProfile],
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self, RoleModelError> {
        if profiles.is_empty() {
            return Err(RoleModelError::Empty);
        }

        let mut centroids = Vec::with_capacity(profiles.len());
        for p in profiles {
            let vector = provider.embed(&normalize(&p.profile)).await?;
            centroids.push((p.role.clone(), vector));
        }
        Ok(Self { centroids })
    }

    pub fn builtin_profiles() -> Vec<RoleProfile> {
        BUILTIN_PROFILES
            .iter()
            .map(|(role, profile)| RoleProfile {
                role: role.to_string(),
                profile: profile.to_string(),
            })
            .collect()
    }

    /// Reads `[{"role": ..., "profile": ...}, ...]` from a JSON file.
    pub fn load_profiles(path: &Path) -> Result<Vec<RoleProfile>, RoleModelError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| RoleModelError::Io {
            path: display.clone(),
            source,
        })?;
        let profiles: Vec<RoleProfile> =
            serde_json::from_str(&raw).map_err(|source| RoleModelError::Parse {
                path: display,
                source,
            })?;
        if profiles.is_empty() {
            return Err(RoleModelError::Empty);
        }
        Ok(profiles)
    }
}

impl RoleClassifier for CentroidClassifier {
    fn classify(&self, embedding: &EmbeddingVector) -> Option<String> {
        self.centroids
            .iter()
            .map(|(role, centroid)| {
                (role, cosine_similarity(embedding.as_slice(), centroid.as_slice()))
            })
            .filter(|(_, score)| *score > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(role, _)| role.clone())
    }
}

struct Backend {
    provider: Arc<dyn EmbeddingProvider>,
    classifier: Arc<dyn RoleClassifier>,
}

pub struct RolePredictor {
    backend: Option<Backend>,
}

impl RolePredictor {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, classifier: Arc<dyn RoleClassifier>) -> Self {
        if provider.is_degraded() {
            warn!(
                provider = provider.name(),
                "embedding provider degraded; role predictor using fixed label"
            );
            return Self::degraded();
        }
        Self {
            backend: Some(Backend {
                provider,
                classifier,
            }),
        }
    }

    /// Predictor that always answers [`DEFAULT_ROLE`].
    pub fn degraded() -> Self {
        Self { backend: None }
    }

    /// Builds the centroid model from `model_path` (or the built-in profiles).
    /// Any failure yields a degraded predictor.
    pub async fn initialize(provider: Arc<dyn EmbeddingProvider>, model_path: Option<&Path>) -> Self {
        if provider.is_degraded() {
            warn!(
                provider = provider.name(),
                "embedding provider degraded; role predictor using fixed label"
            );
            return Self::degraded();
        }

        let profiles = match model_path {
            Some(path) => match CentroidClassifier::load_profiles(path) {
                Ok(p) => p,
                Err(err) => {
                    warn!(error = %err, "role model unavailable; role predictor degraded");
                    return Self::degraded();
                }
            },
            None => CentroidClassifier::builtin_profiles(),
        };

        match CentroidClassifier::build(&profiles, provider.as_ref()).await {
            Ok(classifier) => {
                info!(roles = profiles.len(), "role classifier ready");
                Self::new(provider, Arc::new(classifier))
            }
            Err(err) => {
                warn!(error = %err, "role classifier build failed; role predictor degraded");
                Self::degraded()
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.backend.is_none()
    }

    /// Predicts a role label from normalized resume text. Never fails.
    pub async fn predict(&self, normalized_text: &str) -> String {
        if normalized_text.trim().chars().count() < MIN_PREDICTION_CHARS {
            return SHORT_TEXT_ROLE.to_string();
        }

        let Some(backend) = &self.backend else {
            return DEFAULT_ROLE.to_string();
        };

        match backend.provider.embed(normalized_text).await {
            Ok(embedding) => {
                let role = backend
                    .classifier
                    .classify(&embedding)
                    .unwrap_or_else(|| UNKNOWN_ROLE.to_string());
                debug!(%role, "role predicted");
                role
            }
            Err(err) => {
                warn!(error = %err, "role embedding failed; using default role");
                DEFAULT_ROLE.to_string()
            }
        }
    }
}
