//! Axum route handlers for resume analysis.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{info, warn};

use crate::analysis::extraction::extract_pdf_text;
use crate::analysis::gap::{AnalysisReport, MatchMode};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub mode: Option<MatchMode>,
}

/// POST /api/analyze
///
/// Analyzes already-extracted resume text against a job description.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    let mode = request.mode.unwrap_or(state.analyzer.default_mode());
    let report = state
        .analyzer
        .analyze(&request.resume_text, &request.job_description, mode)
        .await;
    Ok(Json(report))
}

/// POST /api/upload
///
/// Multipart fields: `resume` (PDF file), `job_description`, optional `mode`.
/// Unreadable PDFs are analyzed as empty text, which yields a degraded report.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description = String::new();
    let mut mode = state.analyzer.default_mode();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                resume = Some((file_name, data));
            }
            "job_description" => job_description = field.text().await?,
            "mode" => {
                mode = field
                    .text()
                    .await?
                    .parse::<MatchMode>()
                    .map_err(AppError::Validation)?;
            }
            _ => {}
        }
    }

    let (file_name, data) =
        resume.ok_or_else(|| AppError::Validation("Resume file missing".to_string()))?;
    if !file_name.to_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation("Only PDF files are allowed".to_string()));
    }

    info!(
        file = %file_name,
        bytes = data.len(),
        job_description_chars = job_description.len(),
        "resume upload received"
    );

    let resume_text = match extract_pdf_text(data).await {
        Ok(text) => text,
        Err(err) => {
            warn!(file = %file_name, error = %err, "could not extract resume text");
            String::new()
        }
    };

    let report = state
        .analyzer
        .analyze(&resume_text, &job_description, mode)
        .await;
    Ok(Json(report))
}
