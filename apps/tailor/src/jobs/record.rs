//! One row of the job table and its status vocabulary.
//!
//! Column names follow the job-tracking spreadsheet the table is exchanged with.
//! Every column is optional on input; missing columns read as empty.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::extraction::format_bullets;
use crate::analysis::fit_scoring::Criterion;
use crate::analysis::{FitEvaluation, JobDetails};

// ────────────────────────────────────────────────────────────────────────────
// Status
// ────────────────────────────────────────────────────────────────────────────

/// Value of the `Status` column. Unknown values survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    New,
    ReadyForAi,
    ProcessingAi,
    AiAnalyzed,
    SkippedLowScore,
    Tailoring,
    Tailored,
    NeedsManualEdit,
    ScrapeFailed,
    ExtractionFailed,
    AnalysisFailed,
    TailoringFailed,
    PdfFailed,
    MissingInput,
    Other(String),
}

const STATUS_NAMES: [(JobStatus, &str); 14] = [
    (JobStatus::New, "New"),
    (JobStatus::ReadyForAi, "Ready for AI"),
    (JobStatus::ProcessingAi, "Processing AI Analysis"),
    (JobStatus::AiAnalyzed, "AI Analyzed"),
    (JobStatus::SkippedLowScore, "Skipped - Low AI Score"),
    (JobStatus::Tailoring, "Tailoring Resume"),
    (JobStatus::Tailored, "Tailored Resume Created"),
    (JobStatus::NeedsManualEdit, "Tailored Needs Manual Edit"),
    (JobStatus::ScrapeFailed, "Error - Scrape Job Details"),
    (JobStatus::ExtractionFailed, "Error - AI Extraction"),
    (JobStatus::AnalysisFailed, "Error - AI Analysis"),
    (JobStatus::TailoringFailed, "Error - AI Tailoring"),
    (JobStatus::PdfFailed, "Error - PDF Generation"),
    (JobStatus::MissingInput, "Error - Missing Input Data"),
];

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Other(raw) => raw,
            known => STATUS_NAMES
                .iter()
                .find(|(status, _)| status == known)
                .map(|(_, name)| *name)
                .unwrap_or_default(),
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::New
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return JobStatus::New;
        }
        STATUS_NAMES
            .iter()
            .find(|(_, name)| *name == trimmed)
            .map(|(status, _)| status.clone())
            .unwrap_or(JobStatus::Other(raw))
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Record
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRecord {
    #[serde(rename = "Job ID")]
    pub job_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Workplace Type")]
    pub workplace_type: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Date Added")]
    pub date_added: String,
    #[serde(rename = "Status")]
    pub status: JobStatus,
    #[serde(rename = "Notes")]
    pub notes: String,
    #[serde(rename = "Job Description Plain Text")]
    pub job_description: String,

    #[serde(rename = "Extracted Responsibilities")]
    pub extracted_responsibilities: String,
    #[serde(rename = "Extracted Required Skills")]
    pub extracted_required_skills: String,
    #[serde(rename = "Extracted Preferred Skills")]
    pub extracted_preferred_skills: String,
    #[serde(rename = "Extracted Experience Level")]
    pub extracted_experience_level: String,
    #[serde(rename = "Extracted Key Qualifications")]
    pub extracted_qualifications: String,
    #[serde(rename = "Extracted Company Description")]
    pub extracted_company_description: String,

    #[serde(rename = "AI Match Score", deserialize_with = "lenient_score")]
    pub ai_match_score: Option<f64>,
    #[serde(rename = "AI Score Justification")]
    pub ai_score_justification: String,
    #[serde(rename = "AI Strengths")]
    pub ai_strengths: String,
    #[serde(rename = "AI Areas for Improvement")]
    pub ai_areas_for_improvement: String,
    #[serde(rename = "AI Actionable Recommendations")]
    pub ai_recommendations: String,
    #[serde(rename = "Keyword Match Score", deserialize_with = "lenient_score")]
    pub keyword_match_score: Option<f64>,
    #[serde(rename = "Achievements Score", deserialize_with = "lenient_score")]
    pub achievements_score: Option<f64>,
    #[serde(rename = "Summary Quality Score", deserialize_with = "lenient_score")]
    pub summary_quality_score: Option<f64>,
    #[serde(rename = "Structure Score", deserialize_with = "lenient_score")]
    pub structure_score: Option<f64>,
    #[serde(rename = "Tools Certs Score", deserialize_with = "lenient_score")]
    pub tools_certs_score: Option<f64>,
    #[serde(rename = "Total Match Score", deserialize_with = "lenient_score")]
    pub total_match_score: Option<f64>,

    #[serde(rename = "Generated Tailored Summary")]
    pub tailored_summary: String,
    #[serde(rename = "Generated Tailored Bullets")]
    pub tailored_bullets: String,
    #[serde(rename = "Generated Tailored Skills List")]
    pub tailored_skills: String,
    #[serde(rename = "Tailoring Attempts", deserialize_with = "lenient_count")]
    pub tailoring_attempts: Option<u32>,
    #[serde(rename = "Final Page Count", deserialize_with = "lenient_count")]
    pub final_page_count: Option<u32>,
    #[serde(rename = "Tailored HTML Path")]
    pub tailored_html_path: String,
    #[serde(rename = "Tailored PDF Path")]
    pub tailored_pdf_path: String,
    #[serde(rename = "Date Tailored")]
    pub date_tailored: String,
}

/// Numeric cells that fail to parse ("N/A", "Parsing Error") read as absent.
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

impl JobRecord {
    pub fn apply_job_details(&mut self, details: &JobDetails) {
        self.extracted_responsibilities = format_bullets(&details.responsibilities);
        self.extracted_required_skills = format_bullets(&details.required_skills);
        self.extracted_preferred_skills = format_bullets(&details.preferred_skills);
        self.extracted_experience_level = details.experience_level.clone();
        self.extracted_qualifications = format_bullets(&details.qualifications);
        self.extracted_company_description = details.company_description.clone();
    }

    pub fn apply_fit_evaluation(&mut self, evaluation: &FitEvaluation) {
        self.ai_match_score = evaluation.overall_score;
        self.ai_strengths = format_bullets(&evaluation.strengths);
        self.ai_areas_for_improvement = format_bullets(&evaluation.areas_for_improvement);
        self.ai_recommendations = evaluation.recommendations_text();
        self.keyword_match_score = evaluation.score_for(Criterion::KeywordSkillMatch);
        self.achievements_score = evaluation.score_for(Criterion::QuantifiableAchievements);
        self.summary_quality_score = evaluation.score_for(Criterion::SummaryQuality);
        self.structure_score = evaluation.score_for(Criterion::StructureFormatting);
        self.tools_certs_score = evaluation.score_for(Criterion::ToolsCertifications);
        self.total_match_score = evaluation.threshold_score();

        let score = evaluation
            .overall_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let category = evaluation.rating_category.as_deref().unwrap_or("N/A");
        self.ai_score_justification = format!(
            "Score: {score} ({category})\n\nStrengths:\n{}\n\nAreas for Improvement:\n{}\n\nActionable Recommendations:\n{}",
            self.ai_strengths, self.ai_areas_for_improvement, self.ai_recommendations
        );
    }

    /// Label used in logs.
    pub fn describe(&self) -> String {
        format!("'{}' @ '{}' ({})", self.title, self.company, self.job_id)
    }
}
