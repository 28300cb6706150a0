//! Resume-fit scoring against a fixed five-criterion, quarter-star rubric.
//!
//! Validation is deliberately shallow: the text must start with
//! `Overall Star Rating:` and mention all five criterion labels. Everything else
//! (overall score, sections, per-criterion scores) is extracted best-effort and
//! recorded as absent when it cannot be read.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::prompts::{FIT_PROMPT_TEMPLATE, FIT_SYSTEM};
use crate::analysis::{
    require_min_chars, AnalysisError, MAX_INPUT_CHARS, MIN_JOB_DESCRIPTION_CHARS,
    MIN_RESUME_CHARS,
};
use crate::llm_client::prompts::fill_template;
use crate::llm_client::{truncate_chars, TextGenerator};

pub const RATING_PREFIX: &str = "Overall Star Rating:";

const STRENGTHS_HEADER: &str = "Strengths:";
const IMPROVEMENTS_HEADER: &str = "Areas for Improvement:";
const RECOMMENDATIONS_HEADER: &str = "Actionable Recommendations:";
const BREAKDOWN_HEADER: &str = "Evaluation Breakdown:";

static OVERALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)Overall Star Rating:\s*([0-9]*\.?[0-9]+)\s*out of 5 Stars?\s*\(([^)]*)\)")
        .expect("overall rating pattern is valid")
});

static BREAKDOWN_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([1-5])\.\s+[^:]*:\s*([0-9]*\.?[0-9]+)\s*★?\s*(?:[-–—:]\s*)?(.*)$")
        .expect("breakdown line pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitParseError {
    #[error("response does not start with '{RATING_PREFIX}'")]
    MissingPrefix,

    #[error("response does not mention criterion '{0}'")]
    MissingCriterion(&'static str),
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    KeywordSkillMatch,
    QuantifiableAchievements,
    SummaryQuality,
    StructureFormatting,
    ToolsCertifications,
}

impl Criterion {
    /// In breakdown order; line `n.` of the breakdown is `ALL[n - 1]`.
    pub const ALL: [Criterion; 5] = [
        Criterion::KeywordSkillMatch,
        Criterion::QuantifiableAchievements,
        Criterion::SummaryQuality,
        Criterion::StructureFormatting,
        Criterion::ToolsCertifications,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Criterion::KeywordSkillMatch => "Keyword and Skill Match",
            Criterion::QuantifiableAchievements => "Quantifiable Achievements",
            Criterion::SummaryQuality => "Professional Summary and Content Quality",
            Criterion::StructureFormatting => "Resume Structure and Formatting",
            Criterion::ToolsCertifications => "Relevant Tools and Certifications",
        }
    }

    /// Structure and formatting is reported but does not gate tailoring.
    pub fn counts_toward_threshold(self) -> bool {
        self != Criterion::StructureFormatting
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: Criterion,
    /// One of 0.25, 0.5, 0.75, 1.0; `None` when missing or off the grid.
    pub score: Option<f64>,
    pub justification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitEvaluation {
    pub overall_score: Option<f64>,
    pub rating_category: Option<String>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendations: Vec<String>,
    /// Always five entries, in `Criterion::ALL` order.
    pub breakdown: Vec<CriterionScore>,
    pub raw_text: String,
}

impl FitEvaluation {
    pub fn score_for(&self, criterion: Criterion) -> Option<f64> {
        self.breakdown
            .iter()
            .find(|c| c.criterion == criterion)
            .and_then(|c| c.score)
    }

    /// Sum of the four gating criteria; `None` when none of them has a score.
    pub fn threshold_score(&self) -> Option<f64> {
        let scores: Vec<f64> = Criterion::ALL
            .into_iter()
            .filter(|c| c.counts_toward_threshold())
            .filter_map(|c| self.score_for(c))
            .collect();
        (!scores.is_empty()).then(|| scores.iter().sum())
    }

    /// The five breakdown lines, `N/A` where a score is missing.
    pub fn breakdown_text(&self) -> String {
        let mut lines = vec![BREAKDOWN_HEADER.to_string()];
        for (n, entry) in self.breakdown.iter().enumerate() {
            let score = entry
                .score
                .map(|s| format!("{s}★"))
                .unwrap_or_else(|| "N/A".to_string());
            let line = match &entry.justification {
                Some(j) => format!("{}. {}: {score} - {j}", n + 1, entry.criterion.label()),
                None => format!("{}. {}: {score}", n + 1, entry.criterion.label()),
            };
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Recommendations handed to tailoring: recommendation bullets, then the breakdown.
    pub fn recommendations_text(&self) -> String {
        let bullets: Vec<String> = self.recommendations.iter().map(|r| format!("- {r}")).collect();
        if bullets.is_empty() {
            self.breakdown_text()
        } else {
            format!("{}\n\n{}", bullets.join("\n"), self.breakdown_text())
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

fn quarter_star(score: f64) -> Option<f64> {
    let quarters = score * 4.0;
    (quarters.fract() == 0.0 && (1.0..=4.0).contains(&quarters)).then_some(score)
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Strengths,
    Improvements,
    Recommendations,
    Breakdown,
}

fn section_header(line: &str) -> Option<(Section, &str)> {
    [
        (STRENGTHS_HEADER, Section::Strengths),
        (IMPROVEMENTS_HEADER, Section::Improvements),
        (RECOMMENDATIONS_HEADER, Section::Recommendations),
        (BREAKDOWN_HEADER, Section::Breakdown),
    ]
    .into_iter()
    .find_map(|(header, section)| {
        let head = line.get(..header.len())?;
        head.eq_ignore_ascii_case(header)
            .then(|| (section, line[header.len()..].trim()))
    })
}

fn bullet_text(line: &str) -> &str {
    line.trim_start_matches(['-', '*', '•'])
        .trim()
}

/// Validates and mines a rubric response.
pub fn parse_fit_evaluation(text: &str) -> Result<FitEvaluation, FitParseError> {
    let text = text.trim();
    if !text.starts_with(RATING_PREFIX) {
        return Err(FitParseError::MissingPrefix);
    }
    let lowered = text.to_lowercase();
    if let Some(missing) = Criterion::ALL
        .into_iter()
        .find(|c| !lowered.contains(&c.label().to_lowercase()))
    {
        return Err(FitParseError::MissingCriterion(missing.label()));
    }

    let (overall_score, rating_category) = match OVERALL_RE.captures(text) {
        Some(caps) => (
            caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()),
            caps.get(2)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty()),
        ),
        None => (None, None),
    };

    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    let mut recommendations = Vec::new();
    let mut breakdown: Vec<CriterionScore> = Criterion::ALL
        .into_iter()
        .map(|criterion| CriterionScore {
            criterion,
            score: None,
            justification: None,
        })
        .collect();

    let mut section = Section::Preamble;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let content = match section_header(line) {
            Some((next, rest)) => {
                section = next;
                if rest.is_empty() {
                    continue;
                }
                rest
            }
            None => line,
        };

        match section {
            Section::Preamble => {}
            Section::Strengths => strengths.push(bullet_text(content).to_string()),
            Section::Improvements => improvements.push(bullet_text(content).to_string()),
            Section::Recommendations => recommendations.push(bullet_text(content).to_string()),
            Section::Breakdown => {
                let Some(caps) = BREAKDOWN_LINE_RE.captures(content) else {
                    continue;
                };
                let Some(slot) = caps
                    .get(1)
                    .and_then(|m| m.as_str().parse::<usize>().ok())
                    .and_then(|n| breakdown.get_mut(n - 1))
                else {
                    continue;
                };
                slot.score = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .and_then(quarter_star);
                slot.justification = caps
                    .get(3)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty());
            }
        }
    }

    Ok(FitEvaluation {
        overall_score,
        rating_category,
        strengths: strengths.into_iter().filter(|s| !s.is_empty()).collect(),
        areas_for_improvement: improvements.into_iter().filter(|s| !s.is_empty()).collect(),
        recommendations: recommendations
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect(),
        breakdown,
        raw_text: text.to_string(),
    })
}

pub async fn score_resume_fit(
    generator: &dyn TextGenerator,
    resume_text: &str,
    job_description: &str,
) -> Result<FitEvaluation, AnalysisError> {
    require_min_chars("resume text", resume_text, MIN_RESUME_CHARS)?;
    require_min_chars("job description", job_description, MIN_JOB_DESCRIPTION_CHARS)?;

    let prompt = fill_template(
        FIT_PROMPT_TEMPLATE,
        &[
            ("resume_text", truncate_chars(resume_text, MAX_INPUT_CHARS)),
            ("job_description", truncate_chars(job_description, MAX_INPUT_CHARS)),
        ],
    );

    let raw = generator.generate(&prompt, FIT_SYSTEM).await?;
    let evaluation = parse_fit_evaluation(&raw).map_err(|e| {
        warn!(error = %e, "Fit evaluation response rejected");
        e
    })?;

    info!(
        overall = ?evaluation.overall_score,
        threshold_score = ?evaluation.threshold_score(),
        "Resume fit scored"
    );
    Ok(evaluation)
}
