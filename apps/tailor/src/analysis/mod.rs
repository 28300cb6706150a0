// Job Analysis — single-shot AI calls that run before tailoring.
// Extraction returns strict JSON; fit scoring returns rubric text that is validated
// by prefix and labels, then mined best-effort for scores.

pub mod extraction;
pub mod fit_scoring;
pub mod handlers;
pub mod prompts;

use thiserror::Error;

use crate::llm_client::LlmError;

pub use extraction::{extract_job_details, JobDetails};
pub use fit_scoring::{score_resume_fit, FitEvaluation, FitParseError};

/// Prompt inputs are cut to this many characters.
pub const MAX_INPUT_CHARS: usize = 8000;
/// Shorter job descriptions are rejected before any AI call.
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;
/// Shorter resumes are rejected before any AI call.
pub const MIN_RESUME_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("job-detail response rejected: {0}")]
    Extraction(String),

    #[error("fit evaluation rejected: {0}")]
    Fit(#[from] FitParseError),
}

pub(crate) fn require_min_chars(
    label: &str,
    text: &str,
    min_chars: usize,
) -> Result<(), AnalysisError> {
    let len = text.trim().chars().count();
    if len < min_chars {
        return Err(AnalysisError::InvalidInput(format!(
            "{label} is too short ({len} characters, need at least {min_chars})"
        )));
    }
    Ok(())
}
