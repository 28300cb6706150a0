//! Job-detail extraction: job description → six-key JSON object.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::analysis::prompts::{EXTRACTION_PROMPT_TEMPLATE, EXTRACTION_SYSTEM};
use crate::analysis::{require_min_chars, AnalysisError, MAX_INPUT_CHARS, MIN_JOB_DESCRIPTION_CHARS};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{strip_json_fences, truncate_chars, TextGenerator};

/// The exact key set of an extraction response.
pub const JOB_DETAIL_KEYS: [&str; 6] = [
    "Key Responsibilities",
    "Required Skills",
    "Preferred Skills",
    "Required Experience Level",
    "Key Qualifications",
    "Concise Company Description",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetails {
    /// The model may answer with one string; it is stored as a one-element list.
    #[serde(rename = "Key Responsibilities", deserialize_with = "one_or_many")]
    pub responsibilities: Vec<String>,
    #[serde(rename = "Required Skills")]
    pub required_skills: Vec<String>,
    #[serde(rename = "Preferred Skills")]
    pub preferred_skills: Vec<String>,
    #[serde(rename = "Required Experience Level")]
    pub experience_level: String,
    #[serde(rename = "Key Qualifications")]
    pub qualifications: Vec<String>,
    #[serde(rename = "Concise Company Description")]
    pub company_description: String,
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.trim().is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(items) => items,
    })
}

/// Renders a list as `- item` lines, or `N/A` when empty.
pub fn format_bullets(items: &[String]) -> String {
    let lines: Vec<String> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| format!("- {s}"))
        .collect();
    if lines.is_empty() {
        "N/A".to_string()
    } else {
        lines.join("\n")
    }
}

/// Validates raw model output: fences stripped, a JSON object, exactly the six keys.
pub fn parse_job_details(raw: &str) -> Result<JobDetails, AnalysisError> {
    let value: Value = serde_json::from_str(strip_json_fences(raw))
        .map_err(|e| AnalysisError::Extraction(format!("not valid JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| AnalysisError::Extraction("JSON is not an object".to_string()))?;

    let expected: BTreeSet<&str> = JOB_DETAIL_KEYS.into_iter().collect();
    let actual: BTreeSet<&str> = object.keys().map(String::as_str).collect();
    if actual != expected {
        let missing: Vec<&str> = expected.difference(&actual).copied().collect();
        let extra: Vec<&str> = actual.difference(&expected).copied().collect();
        return Err(AnalysisError::Extraction(format!(
            "key mismatch (missing: {missing:?}, unexpected: {extra:?})"
        )));
    }

    serde_json::from_value(value).map_err(|e| AnalysisError::Extraction(e.to_string()))
}

pub async fn extract_job_details(
    generator: &dyn TextGenerator,
    job_description: &str,
) -> Result<JobDetails, AnalysisError> {
    require_min_chars("job description", job_description, MIN_JOB_DESCRIPTION_CHARS)?;

    let prompt = fill_template(
        EXTRACTION_PROMPT_TEMPLATE,
        &[
            ("job_description", truncate_chars(job_description, MAX_INPUT_CHARS)),
            ("json_instruction", JSON_ONLY_INSTRUCTION),
        ],
    );
    let system = format!("{EXTRACTION_SYSTEM}\n\n{JSON_ONLY_INSTRUCTION}");

    let raw = generator.generate(&prompt, &system).await?;
    match parse_job_details(&raw) {
        Ok(details) => {
            info!(
                required_skills = details.required_skills.len(),
                experience = %details.experience_level,
                "Job details extracted"
            );
            Ok(details)
        }
        Err(e) => {
            warn!(error = %e, "Job-detail extraction response rejected");
            Err(e)
        }
    }
}
