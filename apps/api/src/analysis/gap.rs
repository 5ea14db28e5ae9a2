//! Gap Analyzer — resume vs job description.
//!
//! Pipeline: normalize → lexical match both texts → missing skills via the
//! selected `MissingSkillStrategy` → presence-ratio match score → role.
//!
//! Input-quality problems never surface as errors: they are recorded as
//! `Degradation` notices and flip the report status to `degraded`.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::analysis::catalog::{CatalogSource, SkillCatalog};
use crate::analysis::lexical::{contains_skill, match_skills, SkillSet};
use crate::analysis::normalize::{normalize, prepare_for_matching};
use crate::analysis::role::RolePredictor;
use crate::analysis::semantic::unsatisfied_skills;
use crate::embedding::{EmbeddingError, EmbeddingProvider};

pub const MAX_RESUME_SKILLS: usize = 15;
pub const MAX_MISSING_SKILLS: usize = 10;
pub const MAX_JOB_SKILLS: usize = 10;

pub const MIN_RESUME_CHARS: usize = 50;
pub const MIN_MATCH_SCORE: u32 = 20;
pub const MAX_MATCH_SCORE: u32 = 100;
/// Score reported when the job description yields no catalog skills.
pub const NEUTRAL_MATCH_SCORE: u32 = 50;

/// Analyzed in place of a resume whose extracted text is empty or too short.
pub const FALLBACK_RESUME_NARRATIVE: &str = "Software developer with experience in Python, \
    JavaScript, and web development. Worked on multiple projects using React, Node.js, \
    and databases.";

// ────────────────────────────────────────────────────────────────────────────
// Result types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    LexicalOnly,
    LexicalPlusSemantic,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical_only" | "lexical" => Ok(MatchMode::LexicalOnly),
            "lexical_plus_semantic" | "semantic" => Ok(MatchMode::LexicalPlusSemantic),
            other => Err(format!(
                "unknown match mode '{other}' (expected lexical_only or lexical_plus_semantic)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Success,
    Degraded,
}

/// Why a report is degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    InsufficientResumeText,
    MissingJobDescription,
    EmbeddingProviderUnavailable,
    RolePredictorDegraded,
    CatalogFallback,
}

impl Degradation {
    pub fn describe(self) -> &'static str {
        match self {
            Degradation::InsufficientResumeText => {
                "Too little text could be extracted from the resume; a sample profile was analyzed instead."
            }
            Degradation::MissingJobDescription => {
                "No job description was provided; match score is neutral."
            }
            Degradation::EmbeddingProviderUnavailable => {
                "Semantic matching is unavailable; missing skills were computed lexically."
            }
            Degradation::RolePredictorDegraded => {
                "Role model is unavailable; a default role was reported."
            }
            Degradation::CatalogFallback => {
                "Configured skill catalog could not be loaded; the built-in catalog was used."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapResult {
    #[serde(rename = "predicted_job_role")]
    pub predicted_role: String,
    pub resume_skills: SkillSet,
    pub missing_skills: SkillSet,
    #[serde(rename = "job_description_skills")]
    pub job_skills: SkillSet,
    pub match_score: u32,
}

/// Envelope returned to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub status: AnalysisStatus,
    pub mode: MatchMode,
    #[serde(flatten)]
    pub result: GapResult,
    pub notices: Vec<Degradation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub generated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Missing-skill strategies
// ────────────────────────────────────────────────────────────────────────────

/// Decides which job skills the resume does not cover.
#[async_trait]
pub trait MissingSkillStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn missing_skills(
        &self,
        job_skills: &[String],
        resume_skills: &[String],
    ) -> Result<SkillSet, EmbeddingError>;
}

/// Case-insensitive set difference, in job order.
pub struct LexicalStrategy;

#[async_trait]
impl MissingSkillStrategy for LexicalStrategy {
    fn name(&self) -> &'static str {
        "lexical"
    }

    async fn missing_skills(
        &self,
        job_skills: &[String],
        resume_skills: &[String],
    ) -> Result<SkillSet, EmbeddingError> {
        Ok(lexical_difference(job_skills, resume_skills))
    }
}

/// Thresholded max-similarity over skill embeddings.
pub struct SemanticStrategy {
    provider: Arc<dyn EmbeddingProvider>,
    threshold: f32,
}

impl SemanticStrategy {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, threshold: f32) -> Self {
        Self {
            provider,
            threshold,
        }
    }
}

#[async_trait]
impl MissingSkillStrategy for SemanticStrategy {
    fn name(&self) -> &'static str {
        "semantic"
    }

    async fn missing_skills(
        &self,
        job_skills: &[String],
        resume_skills: &[String],
    ) -> Result<SkillSet, EmbeddingError> {
        unsatisfied_skills(
            self.provider.as_ref(),
            job_skills,
            resume_skills,
            self.threshold,
        )
        .await
    }
}

fn lexical_difference(job_skills: &[String], resume_skills: &[String]) -> SkillSet {
    job_skills
        .iter()
        .filter(|skill| !contains_skill(resume_skills, skill))
        .cloned()
        .collect()
}

/// `round(100 * |resume ∩ job| / |job|)` clamped to [20, 100]; 50 with no job skills.
pub fn match_score(resume_skills: &[String], job_skills: &[String]) -> u32 {
    if job_skills.is_empty() {
        return NEUTRAL_MATCH_SCORE;
    }
    let common = job_skills
        .iter()
        .filter(|skill| contains_skill(resume_skills, skill))
        .count();
    let ratio = (100.0 * common as f64 / job_skills.len() as f64).round() as u32;
    ratio.clamp(MIN_MATCH_SCORE, MAX_MATCH_SCORE)
}

// ────────────────────────────────────────────────────────────────────────────
// Analyzer
// ────────────────────────────────────────────────────────────────────────────

pub struct GapAnalyzer {
    catalog: Arc<SkillCatalog>,
    role_predictor: Arc<RolePredictor>,
    embedder: Arc<dyn EmbeddingProvider>,
    lexical: LexicalStrategy,
    semantic: SemanticStrategy,
    default_mode: MatchMode,
}

impl GapAnalyzer {
    pub fn new(
        catalog: Arc<SkillCatalog>,
        role_predictor: Arc<RolePredictor>,
        embedder: Arc<dyn EmbeddingProvider>,
        similarity_threshold: f32,
        default_mode: MatchMode,
    ) -> Self {
        Self {
            catalog,
            role_predictor,
            semantic: SemanticStrategy::new(embedder.clone(), similarity_threshold),
            embedder,
            lexical: LexicalStrategy,
            default_mode,
        }
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    pub fn role_predictor(&self) -> &RolePredictor {
        &self.role_predictor
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    pub fn default_mode(&self) -> MatchMode {
        self.default_mode
    }

    fn strategy(&self, mode: MatchMode) -> &dyn MissingSkillStrategy {
        match mode {
            MatchMode::LexicalOnly => &self.lexical,
            MatchMode::LexicalPlusSemantic => &self.semantic,
        }
    }

    /// Runs one analysis. Never fails; problems are reported as notices.
    pub async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
        mode: MatchMode,
    ) -> AnalysisReport {
        let mut notices = Vec::new();

        if self.catalog.source() == CatalogSource::Fallback {
            notices.push(Degradation::CatalogFallback);
        }

        let mut normalized_resume = normalize(resume_text);
        let resume_text = if normalized_resume.chars().count() < MIN_RESUME_CHARS {
            warn!(
                chars = normalized_resume.chars().count(),
                "insufficient resume text; analyzing fallback narrative"
            );
            notices.push(Degradation::InsufficientResumeText);
            normalized_resume = normalize(FALLBACK_RESUME_NARRATIVE);
            FALLBACK_RESUME_NARRATIVE
        } else {
            resume_text
        };

        let resume_skills = match_skills(&prepare_for_matching(resume_text), &self.catalog);

        let job_skills = if job_description.trim().is_empty() {
            warn!("empty job description; no job skills to compare");
            notices.push(Degradation::MissingJobDescription);
            Vec::new()
        } else {
            match_skills(&prepare_for_matching(job_description), &self.catalog)
        };

        let strategy = self.strategy(mode);
        let mut missing_skills = match strategy.missing_skills(&job_skills, &resume_skills).await {
            Ok(missing) => missing,
            Err(err) => {
                warn!(
                    strategy = strategy.name(),
                    error = %err,
                    "missing-skill strategy failed; falling back to lexical"
                );
                notices.push(Degradation::EmbeddingProviderUnavailable);
                lexical_difference(&job_skills, &resume_skills)
            }
        };
        missing_skills.truncate(MAX_MISSING_SKILLS);

        let match_score = match_score(&resume_skills, &job_skills);

        let predicted_role = self.role_predictor.predict(&normalized_resume).await;
        if self.role_predictor.is_degraded() {
            notices.push(Degradation::RolePredictorDegraded);
        }

        let status = if notices.is_empty() {
            AnalysisStatus::Success
        } else {
            AnalysisStatus::Degraded
        };
        let message = (!notices.is_empty()).then(|| {
            notices
                .iter()
                .map(|n| n.describe())
                .collect::<Vec<_>>()
                .join(" ")
        });

        debug!(
            strategy = strategy.name(),
            resume_skills = resume_skills.len(),
            job_skills = job_skills.len(),
            missing = missing_skills.len(),
            match_score,
            ?status,
            "analysis complete"
        );

        AnalysisReport {
            analysis_id: Uuid::new_v4(),
            status,
            mode,
            result: GapResult {
                predicted_role,
                resume_skills: resume_skills.into_iter().take(MAX_RESUME_SKILLS).collect(),
                missing_skills,
                job_skills: job_skills.into_iter().take(MAX_JOB_SKILLS).collect(),
                match_score,
            },
            notices,
            message,
            generated_at: Utc::now(),
        }
    }
}
