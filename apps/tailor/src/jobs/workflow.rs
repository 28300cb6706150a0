//! Batch workflow over the job table: fetch → analyze → tailor.
//!
//! Each phase selects its eligible rows by status, processes them one at a time,
//! and records the result in the row. A failure is written to that row's status
//! and notes; the batch always continues. The table is saved every
//! `save_interval` processed rows and at the end of each phase.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::ValueEnum;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::analysis::{extract_job_details, score_resume_fit, MIN_JOB_DESCRIPTION_CHARS};
use crate::jobs::record::{JobRecord, JobStatus};
use crate::jobs::source::PostingSource;
use crate::jobs::table::JobTable;
use crate::llm_client::TextGenerator;
use crate::render::text::strip_html_tags;
use crate::tailoring::{
    run_tailoring_loop, FailureKind, Outcome, TailoringPolicy, TailoringReport,
    TailoringRequest, TailoringServices,
};

const MAX_FILENAME_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Fetch,
    Analyze,
    Tailor,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Fetch, Phase::Analyze, Phase::Tailor];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Rows moved aside without processing (low score).
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub output_dir: PathBuf,
    pub score_threshold: f64,
    /// Pause after each external call (posting fetch or AI call).
    pub api_delay: Duration,
    pub save_interval: usize,
    pub retry_failed: bool,
}

pub struct Workflow {
    pub generator: Arc<dyn TextGenerator>,
    pub tailoring: TailoringServices,
    pub policy: TailoringPolicy,
    pub postings: Arc<dyn PostingSource>,
    pub base_resume: Option<Arc<str>>,
    pub settings: WorkflowSettings,
}

/// Replaces characters that are unsafe in file names, collapses whitespace and
/// underscores to single `_`, and caps the length.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let mapped = if c.is_whitespace() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
            '_'
        } else {
            c
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }
    out.chars().take(MAX_FILENAME_CHARS).collect()
}

/// `<Company>_<Title>_<JobId>`, each part sanitized.
pub fn job_base_name(row: &JobRecord) -> String {
    let part = |value: &str, fallback: &str| {
        let value = value.trim();
        sanitize_filename(if value.is_empty() { fallback } else { value })
    };
    format!(
        "{}_{}_{}",
        part(&row.company, "UnknownCompany"),
        part(&row.title, "UnknownJob"),
        part(&row.job_id, "NoId")
    )
}

fn is_usable_description(text: &str) -> bool {
    text.trim().chars().count() >= MIN_JOB_DESCRIPTION_CHARS
}

impl Workflow {
    /// Runs the phases from `start` to `end` inclusive, in order.
    pub async fn run(
        &self,
        table: &mut JobTable,
        start: Phase,
        end: Phase,
    ) -> Result<Vec<(Phase, PhaseSummary)>> {
        if start > end {
            bail!("start phase {start:?} comes after end phase {end:?}");
        }
        let mut summaries = Vec::new();
        for phase in Phase::ALL.into_iter().filter(|p| (start..=end).contains(p)) {
            let summary = self.run_phase(table, phase).await?;
            summaries.push((phase, summary));
        }
        Ok(summaries)
    }

    pub async fn run_phase(&self, table: &mut JobTable, phase: Phase) -> Result<PhaseSummary> {
        info!(?phase, table = %table.path().display(), "Starting phase");
        let summary = match phase {
            Phase::Fetch => self.fetch_phase(table).await?,
            Phase::Analyze => self.analyze_phase(table).await?,
            Phase::Tailor => self.tailor_phase(table).await?,
        };
        table.save()?;
        info!(
            ?phase,
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "Phase finished"
        );
        Ok(summary)
    }

    async fn pace(&self) {
        if !self.settings.api_delay.is_zero() {
            tokio::time::sleep(self.settings.api_delay).await;
        }
    }

    fn checkpoint(&self, table: &JobTable, processed: usize) -> Result<()> {
        if processed % self.settings.save_interval == 0 {
            table.save()?;
        }
        Ok(())
    }

    fn require_base_resume(&self) -> Result<&str> {
        self.base_resume
            .as_deref()
            .context("A base resume is required for this phase (set RESUME_HTML)")
    }

    // ── Fetch ───────────────────────────────────────────────────────────────

    fn fetch_eligible(&self, status: &JobStatus) -> bool {
        match status {
            JobStatus::New => true,
            JobStatus::ScrapeFailed => self.settings.retry_failed,
            _ => false,
        }
    }

    async fn fetch_phase(&self, table: &mut JobTable) -> Result<PhaseSummary> {
        let mut summary = PhaseSummary::default();
        for i in 0..table.rows.len() {
            if !self.fetch_eligible(&table.rows[i].status) {
                continue;
            }
            summary.processed += 1;
            let row = &mut table.rows[i];

            if is_usable_description(&row.job_description) {
                row.status = JobStatus::ReadyForAi;
                summary.succeeded += 1;
            } else if row.link.trim().is_empty() {
                warn!(job = %row.describe(), "No description and no link");
                row.status = JobStatus::MissingInput;
                row.notes = "No job description text and no posting link".to_string();
                summary.failed += 1;
            } else {
                match self.postings.fetch_description(row.link.trim()).await {
                    Ok(text) if is_usable_description(&text) => {
                        info!(job = %row.describe(), chars = text.len(), "Posting fetched");
                        row.job_description = text;
                        row.status = JobStatus::ReadyForAi;
                        summary.succeeded += 1;
                    }
                    Ok(_) => {
                        warn!(job = %row.describe(), "Posting text too short");
                        row.status = JobStatus::ScrapeFailed;
                        row.notes = "Posting text too short".to_string();
                        summary.failed += 1;
                    }
                    Err(e) => {
                        error!(job = %row.describe(), error = %e, "Posting fetch failed");
                        row.status = JobStatus::ScrapeFailed;
                        row.notes = format!("Fetch failed: {e}");
                        summary.failed += 1;
                    }
                }
                self.pace().await;
            }

            self.checkpoint(table, summary.processed)?;
        }
        Ok(summary)
    }

    // ── Analyze ─────────────────────────────────────────────────────────────

    fn analyze_eligible(&self, status: &JobStatus) -> bool {
        match status {
            JobStatus::ReadyForAi => true,
            JobStatus::ProcessingAi
            | JobStatus::ExtractionFailed
            | JobStatus::AnalysisFailed
            | JobStatus::MissingInput => self.settings.retry_failed,
            _ => false,
        }
    }

    async fn analyze_phase(&self, table: &mut JobTable) -> Result<PhaseSummary> {
        let mut summary = PhaseSummary::default();
        if !table.rows.iter().any(|r| self.analyze_eligible(&r.status)) {
            return Ok(summary);
        }
        let resume = self.require_base_resume()?;

        for i in 0..table.rows.len() {
            if !self.analyze_eligible(&table.rows[i].status) {
                continue;
            }
            summary.processed += 1;
            let row = &mut table.rows[i];
            row.status = JobStatus::ProcessingAi;
            info!(job = %row.describe(), "Analyzing job");

            if self.analyze_row(row, resume).await {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            self.checkpoint(table, summary.processed)?;
        }
        Ok(summary)
    }

    /// Extraction, then fit scoring. Returns whether the row reached `AI Analyzed`.
    async fn analyze_row(&self, row: &mut JobRecord, resume: &str) -> bool {
        if !is_usable_description(&row.job_description) {
            row.status = JobStatus::MissingInput;
            row.notes = "Job description text missing or too short".to_string();
            return false;
        }

        let details = extract_job_details(self.generator.as_ref(), &row.job_description).await;
        self.pace().await;
        match details {
            Ok(details) => row.apply_job_details(&details),
            Err(e) => {
                error!(job = %row.describe(), error = %e, "Job-detail extraction failed");
                row.status = JobStatus::ExtractionFailed;
                row.notes = format!("Extraction failed: {e}");
                return false;
            }
        }

        let evaluation =
            score_resume_fit(self.generator.as_ref(), resume, &row.job_description).await;
        self.pace().await;
        match evaluation {
            Ok(evaluation) => {
                row.apply_fit_evaluation(&evaluation);
                row.status = JobStatus::AiAnalyzed;
                info!(
                    job = %row.describe(),
                    total_match_score = ?row.total_match_score,
                    "Job analyzed"
                );
                true
            }
            Err(e) => {
                error!(job = %row.describe(), error = %e, "Fit scoring failed");
                row.status = JobStatus::AnalysisFailed;
                row.notes = format!("Fit scoring failed: {e}");
                false
            }
        }
    }

    // ── Tailor ──────────────────────────────────────────────────────────────

    fn meets_threshold(&self, row: &JobRecord) -> bool {
        row.total_match_score
            .is_some_and(|score| score >= self.settings.score_threshold)
    }

    fn tailor_eligible(&self, row: &JobRecord) -> bool {
        let status_ok = match row.status {
            JobStatus::AiAnalyzed => true,
            JobStatus::Tailoring
            | JobStatus::TailoringFailed
            | JobStatus::PdfFailed
            | JobStatus::NeedsManualEdit => self.settings.retry_failed,
            _ => false,
        };
        status_ok && self.meets_threshold(row)
    }

    async fn tailor_phase(&self, table: &mut JobTable) -> Result<PhaseSummary> {
        let mut summary = PhaseSummary::default();

        for row in table.rows.iter_mut() {
            if row.status == JobStatus::AiAnalyzed && !self.meets_threshold(row) {
                info!(
                    job = %row.describe(),
                    total_match_score = ?row.total_match_score,
                    threshold = self.settings.score_threshold,
                    "Skipping job below score threshold"
                );
                row.status = JobStatus::SkippedLowScore;
                summary.skipped += 1;
            }
        }

        if !table.rows.iter().any(|r| self.tailor_eligible(r)) {
            return Ok(summary);
        }
        let resume = self.require_base_resume()?;
        tokio::fs::create_dir_all(&self.settings.output_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create output directory {}",
                    self.settings.output_dir.display()
                )
            })?;

        for i in 0..table.rows.len() {
            if !self.tailor_eligible(&table.rows[i]) {
                continue;
            }
            summary.processed += 1;
            let row = &mut table.rows[i];
            row.status = JobStatus::Tailoring;
            info!(job = %row.describe(), "Tailoring resume");

            if self.tailor_row(row, resume).await {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            self.pace().await;
            self.checkpoint(table, summary.processed)?;
        }
        Ok(summary)
    }

    /// Runs the loop for one row. Returns whether the page target was met.
    async fn tailor_row(&self, row: &mut JobRecord, resume: &str) -> bool {
        if !is_usable_description(&row.job_description) {
            row.status = JobStatus::MissingInput;
            row.notes = "Job description text missing or too short".to_string();
            return false;
        }

        let base_name = job_base_name(row);
        let work_dir = self.settings.output_dir.join(&base_name);
        if let Err(e) = tokio::fs::create_dir_all(&work_dir).await {
            error!(dir = %work_dir.display(), error = %e, "Cannot create job directory");
            row.status = JobStatus::PdfFailed;
            row.notes = format!("Cannot create {}: {e}", work_dir.display());
            return false;
        }

        let request = TailoringRequest {
            base_resume_text: resume.to_string(),
            job_description: row.job_description.clone(),
            recommendations: row.ai_recommendations.clone(),
        };
        let report = run_tailoring_loop(
            &self.tailoring,
            &request,
            &self.policy,
            &work_dir,
            &base_name,
        )
        .await;

        record_tailoring(row, &report).await;
        report.outcome == Outcome::TargetMet
    }
}

/// Copies a loop report into the row's status and output columns.
pub async fn record_tailoring(row: &mut JobRecord, report: &TailoringReport) {
    row.status = match report.outcome {
        Outcome::TargetMet => JobStatus::Tailored,
        Outcome::TargetNotMet => JobStatus::NeedsManualEdit,
        Outcome::Failed => match report.last_failure() {
            Some((FailureKind::Render, _)) => JobStatus::PdfFailed,
            _ => JobStatus::TailoringFailed,
        },
    };
    row.tailoring_attempts = Some(report.attempts.len() as u32);
    row.final_page_count = report.final_page_count();
    row.tailored_html_path = display_path(report.html_path.as_deref()).await;
    row.tailored_pdf_path = display_path(report.pdf_path.as_deref()).await;
    row.date_tailored = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    match &report.kept {
        Some(kept) => {
            let content = &kept.content;
            row.tailored_summary = strip_html_tags(&content.summary);
            row.tailored_bullets = content
                .bullets
                .iter()
                .map(|b| strip_html_tags(b))
                .filter(|b| !b.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            row.tailored_skills = content
                .skill_categories
                .0
                .iter()
                .flat_map(|c| {
                    c.skills
                        .iter()
                        .map(|s| strip_html_tags(s))
                        .filter(|s| !s.is_empty())
                        .map(move |s| format!("{}: {s}", c.name))
                })
                .collect::<Vec<_>>()
                .join("\n");
            row.notes = match report.outcome {
                Outcome::TargetMet => String::new(),
                _ => format!(
                    "Page target {}-{} not met; kept attempt {} with {} page(s)",
                    report.target.min_pages, report.target.max_pages, kept.index, kept.page_count
                ),
            };
        }
        None => {
            row.tailored_summary.clear();
            row.tailored_bullets.clear();
            row.tailored_skills.clear();
            row.notes = report
                .last_failure()
                .map(|(kind, reason)| format!("{kind:?}: {reason}"))
                .unwrap_or_default();
        }
    }
}

/// Absolute form of an artifact path, or the path as given when it cannot be resolved.
async fn display_path(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return String::new();
    };
    tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::jobs::source::PostingError;
    use crate::llm_client::LlmError;
    use crate::render::{PageCounter, PdfRenderer, RenderError, ResumeTemplate};

    // ── Mocks ───────────────────────────────────────────────────────────────

    /// Answers by recognizing which prompt it was sent.
    struct RoutingGenerator {
        fit_reply: String,
        calls: Mutex<Vec<&'static str>>,
    }

    const EXTRACTION_REPLY: &str = r#"{
        "Key Responsibilities": "Build services",
        "Required Skills": ["Rust"],
        "Preferred Skills": [],
        "Required Experience Level": "Senior",
        "Key Qualifications": [],
        "Concise Company Description": "Not Specified"
    }"#;

    const TAILORING_REPLY: &str = r#"{
        "tailored_summary": "Rust engineer with <strong>Kafka</strong>",
        "relevant_experience_title": "Software Engineer",
        "tailored_bullets": ["Cut latency <strong>40%</strong>"],
        "skill_categories": {"Languages": ["Rust", "<strong>SQL</strong>"]}
    }"#;

    fn fit_reply(keyword: &str) -> String {
        format!(
            "Overall Star Rating: 3.5 out of 5 Stars (Moderate)\n\n\
             Strengths:\n- Rust\n\n\
             Areas for Improvement:\n- Kafka\n\n\
             Actionable Recommendations:\n- Add Kafka project\n\n\
             Evaluation Breakdown:\n\
             1. Keyword and Skill Match: {keyword}★ - ok\n\
             2. Quantifiable Achievements: 0.75★ - ok\n\
             3. Professional Summary and Content Quality: 0.5★ - ok\n\
             4. Resume Structure and Formatting: 1.0★ - ok\n\
             5. Relevant Tools and Certifications: 0.5★ - ok"
        )
    }

    impl RoutingGenerator {
        fn new(keyword_score: &str) -> Arc<Self> {
            Arc::new(Self {
                fit_reply: fit_reply(keyword_score),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for RoutingGenerator {
        async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            let (kind, reply) = if prompt.contains("Concise Company Description") {
                ("extract", EXTRACTION_REPLY.to_string())
            } else if prompt.contains("Evaluation Criteria") {
                ("fit", self.fit_reply.clone())
            } else {
                ("tailor", TAILORING_REPLY.to_string())
            };
            self.calls.lock().unwrap().push(kind);
            Ok(reply)
        }
    }

    struct StaticPostings(Result<String, u16>);

    #[async_trait]
    impl PostingSource for StaticPostings {
        async fn fetch_description(&self, _url: &str) -> Result<String, PostingError> {
            self.0.clone().map_err(PostingError::Status)
        }
    }

    struct CopyRenderer;

    #[async_trait]
    impl PdfRenderer for CopyRenderer {
        async fn render_pdf(&self, html: &str, output: &Path) -> Result<(), RenderError> {
            tokio::fs::write(output, html).await?;
            Ok(())
        }
    }

    struct FixedPages(u32);

    impl PageCounter for FixedPages {
        fn page_count(&self, _pdf: &Path) -> Result<u32, RenderError> {
            Ok(self.0)
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    const JD: &str = "Senior Rust engineer to build low-latency trading services with Kafka.";

    fn workflow(
        dir: &Path,
        generator: Arc<RoutingGenerator>,
        postings: Result<String, u16>,
        pages: u32,
    ) -> Workflow {
        Workflow {
            generator: generator.clone(),
            tailoring: TailoringServices {
                generator,
                composer: Arc::new(ResumeTemplate::from_source("{{ summary }}").unwrap()),
                renderer: Arc::new(CopyRenderer),
                page_counter: Arc::new(FixedPages(pages)),
            },
            policy: TailoringPolicy::default(),
            postings: Arc::new(StaticPostings(postings)),
            base_resume: Some(Arc::from("Jane Doe. ".repeat(20).as_str())),
            settings: WorkflowSettings {
                output_dir: dir.join("out"),
                score_threshold: 2.5,
                api_delay: Duration::ZERO,
                save_interval: 1,
                retry_failed: true,
            },
        }
    }

    fn table(dir: &Path, csv: &str) -> JobTable {
        let path = dir.join("jobs.csv");
        std::fs::write(&path, csv).unwrap();
        JobTable::load(&path).unwrap()
    }

    // ── Tests ───────────────────────────────────────────────────────────────

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Acme, Inc. / R&D"), "Acme,_Inc._R&D");
        assert_eq!(sanitize_filename("a  <>  b"), "a_b");
        assert_eq!(sanitize_filename("Senior: \"Staff\"?"), "Senior_Staff_");
        assert_eq!(sanitize_filename(&"x".repeat(150)).len(), MAX_FILENAME_CHARS);
    }

    #[test]
    fn test_job_base_name_uses_fallbacks() {
        let row = JobRecord {
            job_id: "42".to_string(),
            title: "Backend Engineer".to_string(),
            ..JobRecord::default()
        };
        assert_eq!(job_base_name(&row), "UnknownCompany_Backend_Engineer_42");
    }

    #[tokio::test]
    async fn test_full_run_takes_a_new_job_to_tailored() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = table(
            dir.path(),
            "Job ID,Title,Company,Status,Link\n7,Rust Engineer,Acme,New,https://jobs.example/7\n",
        );
        let generator = RoutingGenerator::new("0.75");
        let wf = workflow(dir.path(), generator.clone(), Ok(JD.to_string()), 1);

        let summaries = wf.run(&mut table, Phase::Fetch, Phase::Tailor).await.unwrap();
        assert_eq!(summaries.len(), 3);

        let row = &table.rows[0];
        assert_eq!(row.status, JobStatus::Tailored);
        assert_eq!(row.job_description, JD);
        assert_eq!(row.extracted_responsibilities, "- Build services");
        // 0.75 + 0.75 + 0.5 + 0.5, structure excluded.
        assert_eq!(row.total_match_score, Some(2.5));
        assert_eq!(row.tailored_summary, "Rust engineer with Kafka");
        assert_eq!(row.tailored_bullets, "Cut latency 40%");
        assert_eq!(row.tailored_skills, "Languages: Rust\nLanguages: SQL");
        assert_eq!(row.tailoring_attempts, Some(1));
        assert_eq!(row.final_page_count, Some(1));
        assert!(row.tailored_pdf_path.ends_with("Acme_Rust_Engineer_7.pdf"));
        assert!(!row.date_tailored.is_empty());
        assert_eq!(*generator.calls.lock().unwrap(), vec!["extract", "fit", "tailor"]);

        let job_dir = dir.path().join("out").join("Acme_Rust_Engineer_7");
        assert!(job_dir.join("Acme_Rust_Engineer_7.pdf").exists());
        assert!(job_dir.join("tailoring_report.json").exists());

        let reloaded = JobTable::load(&dir.path().join("jobs.csv")).unwrap();
        assert_eq!(reloaded.rows[0].status, JobStatus::Tailored);
    }

    #[tokio::test]
    async fn test_low_score_rows_are_skipped_not_tailored() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = table(
            dir.path(),
            &format!("Job ID,Title,Company,Status,Job Description Plain Text\n1,Dev,Acme,Ready for AI,{JD}\n"),
        );
        let generator = RoutingGenerator::new("0.25");
        let wf = workflow(dir.path(), generator.clone(), Err(500), 1);

        wf.run(&mut table, Phase::Analyze, Phase::Tailor).await.unwrap();

        assert_eq!(table.rows[0].total_match_score, Some(2.0));
        assert_eq!(table.rows[0].status, JobStatus::SkippedLowScore);
        assert!(!generator.calls.lock().unwrap().contains(&"tailor"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_scoped_to_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = table(
            dir.path(),
            &format!(
                "Job ID,Title,Status,Link,Job Description Plain Text\n\
                 1,A,New,https://jobs.example/1,\n\
                 2,B,New,,{JD}\n\
                 3,C,New,,\n"
            ),
        );
        let wf = workflow(dir.path(), RoutingGenerator::new("1.0"), Err(404), 1);

        let summary = wf.run_phase(&mut table, Phase::Fetch).await.unwrap();

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(table.rows[0].status, JobStatus::ScrapeFailed);
        assert!(table.rows[0].notes.contains("404"));
        assert_eq!(table.rows[1].status, JobStatus::ReadyForAi);
        assert_eq!(table.rows[2].status, JobStatus::MissingInput);
    }

    #[tokio::test]
    async fn test_over_length_result_needs_manual_edit() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = table(
            dir.path(),
            &format!(
                "Job ID,Title,Company,Status,Total Match Score,Job Description Plain Text\n\
                 9,Dev,Acme,AI Analyzed,3.0,{JD}\n"
            ),
        );
        let generator = RoutingGenerator::new("1.0");
        let wf = workflow(dir.path(), generator.clone(), Err(500), 2);

        wf.run_phase(&mut table, Phase::Tailor).await.unwrap();

        let row = &table.rows[0];
        assert_eq!(row.status, JobStatus::NeedsManualEdit);
        assert_eq!(row.tailoring_attempts, Some(3));
        assert_eq!(row.final_page_count, Some(2));
        assert!(row.notes.contains("not met"));
        assert_eq!(generator.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_retry_flag_controls_error_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "Job ID,Title,Status,Job Description Plain Text\n1,Dev,Error - AI Analysis,{JD}\n"
        );

        let mut no_retry = table(dir.path(), &csv);
        let mut wf = workflow(dir.path(), RoutingGenerator::new("1.0"), Err(500), 1);
        wf.settings.retry_failed = false;
        let summary = wf.run_phase(&mut no_retry, Phase::Analyze).await.unwrap();
        assert_eq!(summary.processed, 0);
        assert_eq!(no_retry.rows[0].status, JobStatus::AnalysisFailed);

        let mut retry = table(dir.path(), &csv);
        wf.settings.retry_failed = true;
        wf.run_phase(&mut retry, Phase::Analyze).await.unwrap();
        assert_eq!(retry.rows[0].status, JobStatus::AiAnalyzed);
    }

    #[tokio::test]
    async fn test_inverted_phase_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = table(dir.path(), "Job ID,Status\n1,New\n");
        let wf = workflow(dir.path(), RoutingGenerator::new("1.0"), Err(500), 1);
        assert!(wf.run(&mut table, Phase::Tailor, Phase::Fetch).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_render_maps_to_pdf_error() {
        use crate::tailoring::{AttemptStatus, PageTarget, TailoringStrategy};
        use crate::tailoring::tailor_loop::AttemptRecord;

        let report = TailoringReport {
            outcome: Outcome::Failed,
            target: PageTarget::default(),
            attempts: vec![AttemptRecord {
                index: 1,
                strategy: TailoringStrategy::Initial,
                status: AttemptStatus::Failed {
                    kind: FailureKind::Render,
                    reason: "weasyprint missing".to_string(),
                },
            }],
            kept: None,
            html_path: None,
            pdf_path: None,
        };
        let mut row = JobRecord::default();
        record_tailoring(&mut row, &report).await;
        assert_eq!(row.status, JobStatus::PdfFailed);
        assert_eq!(row.tailoring_attempts, Some(1));
        assert!(row.notes.contains("weasyprint missing"));
        assert!(row.tailored_pdf_path.is_empty());
    }

    #[tokio::test]
    async fn test_recorded_paths_are_resolved() {
        use crate::tailoring::PageTarget;

        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("job")).unwrap();
        std::fs::write(dir.path().join("resume.pdf"), b"%PDF").unwrap();
        let indirect = dir.path().join("job").join("..").join("resume.pdf");

        let report = TailoringReport {
            outcome: Outcome::Failed,
            target: PageTarget::default(),
            attempts: Vec::new(),
            kept: None,
            html_path: Some(dir.path().join("job").join("missing.html")),
            pdf_path: Some(indirect),
        };
        let mut row = JobRecord::default();
        record_tailoring(&mut row, &report).await;

        let expected = std::fs::canonicalize(dir.path().join("resume.pdf")).unwrap();
        assert_eq!(row.tailored_pdf_path, expected.display().to_string());
        assert!(row.tailored_html_path.ends_with("missing.html"));
    }
}
