//! Axum route handlers for the Resumes API.

use std::path::PathBuf;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::tailoring::{run_tailoring_loop, TailoringReport, TailoringRequest};

/// Artifact base name for API-driven runs; each run gets its own directory.
const API_ARTIFACT_NAME: &str = "resume";

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    pub jd_text: String,
    pub recommendations: Option<String>,
    /// Defaults to the configured base resume.
    pub resume_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    pub resume_id: Uuid,
    pub report: TailoringReport,
}

fn run_dir(state: &AppState, resume_id: Uuid) -> PathBuf {
    state.config.output_dir.join(resume_id.to_string())
}

/// POST /api/v1/resumes/tailor
///
/// Runs the tailoring loop for one job description. Always answers 200 with the
/// loop report once inputs are valid; the outcome says whether the target was met.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }
    let base_resume_text = state
        .resume_text(request.resume_text.as_deref())
        .ok_or_else(|| {
            AppError::Validation("resume_text is required: no base resume is configured".to_string())
        })?
        .to_string();

    let resume_id = Uuid::new_v4();
    let work_dir = run_dir(&state, resume_id);
    tokio::fs::create_dir_all(&work_dir)
        .await
        .with_context(|| format!("Failed to create {}", work_dir.display()))?;

    let tailoring_request = TailoringRequest {
        base_resume_text,
        job_description: request.jd_text,
        recommendations: request.recommendations.unwrap_or_default(),
    };

    let report = run_tailoring_loop(
        &state.tailoring,
        &tailoring_request,
        &state.policy,
        &work_dir,
        API_ARTIFACT_NAME,
    )
    .await;

    Ok(Json(TailorResponse { resume_id, report }))
}

/// GET /api/v1/resumes/:id/pdf
///
/// Returns the surviving PDF of a tailoring run.
pub async fn handle_get_pdf(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let path = run_dir(&state, resume_id).join(format!("{API_ARTIFACT_NAME}.pdf"));
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!(
                "No PDF for resume {resume_id}"
            )))
        }
        Err(e) => {
            return Err(AppError::Internal(
                anyhow::Error::new(e).context(format!("Failed to read {}", path.display())),
            ))
        }
    };

    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes))
}
