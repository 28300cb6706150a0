//! Axum route handlers for the Jobs API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::{extract_job_details, score_resume_fit, FitEvaluation, JobDetails};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub jd_text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub job_details: JobDetails,
}

#[derive(Debug, Deserialize)]
pub struct FitScoreRequest {
    pub jd_text: String,
    /// Defaults to the configured base resume.
    pub resume_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FitScoreResponse {
    pub evaluation: FitEvaluation,
    pub threshold_score: Option<f64>,
    pub recommendations_text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/extract
///
/// Extracts the six structured job-detail fields from a job description.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    let job_details = extract_job_details(state.generator.as_ref(), &request.jd_text).await?;

    Ok(Json(ExtractResponse { job_details }))
}

/// POST /api/v1/jobs/fit-score
///
/// Scores a resume against a job description with the five-criterion rubric.
pub async fn handle_fit_score(
    State(state): State<AppState>,
    Json(request): Json<FitScoreRequest>,
) -> Result<Json<FitScoreResponse>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }
    let resume_text = state
        .resume_text(request.resume_text.as_deref())
        .ok_or_else(|| {
            AppError::Validation("resume_text is required: no base resume is configured".to_string())
        })?;

    let evaluation =
        score_resume_fit(state.generator.as_ref(), resume_text, &request.jd_text).await?;

    Ok(Json(FitScoreResponse {
        threshold_score: evaluation.threshold_score(),
        recommendations_text: evaluation.recommendations_text(),
        evaluation,
    }))
}
