//! Iterative Tailoring Loop: generate → parse → render → measure, escalating the
//! prompt strategy until the PDF lands inside the page target or attempts run out.
//!
//! # Contract
//! - Every failure is scoped to its attempt. `run_tailoring_loop` never returns an error;
//!   the outcome and per-attempt records live in the `TailoringReport`.
//! - The final artifact paths only ever hold the kept attempt's complete HTML/PDF pair.
//!   An attempt replaces the kept artifacts when it is at least as close to the target.
//! - A degraded result is reported as `TargetNotMet`, never as success.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::llm_client::TextGenerator;
use crate::render::{
    count_pages, ArtifactPaths, PageCounter, PdfRenderer, RenderError, ResumeComposer,
    StagedAttempt,
};
use crate::tailoring::attempt::{parse_attempt, TailoringAttempt, TailoringRequest};
use crate::tailoring::strategy::{build_prompt, system_prompt, PageFeedback, TailoringStrategy};

/// File name of the per-job loop report, written next to the artifacts.
pub const REPORT_FILE_NAME: &str = "tailoring_report.json";

// ────────────────────────────────────────────────────────────────────────────
// Policy
// ────────────────────────────────────────────────────────────────────────────

/// Accepted page-count range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTarget {
    pub min_pages: u32,
    pub max_pages: u32,
}

impl Default for PageTarget {
    fn default() -> Self {
        Self {
            min_pages: 1,
            max_pages: 1,
        }
    }
}

impl PageTarget {
    pub fn new(min_pages: u32, max_pages: u32) -> Result<Self, String> {
        if min_pages == 0 {
            return Err("minimum page count must be at least 1".to_string());
        }
        if min_pages > max_pages {
            return Err(format!(
                "minimum page count {min_pages} exceeds maximum {max_pages}"
            ));
        }
        Ok(Self {
            min_pages,
            max_pages,
        })
    }

    pub fn contains(&self, pages: u32) -> bool {
        (self.min_pages..=self.max_pages).contains(&pages)
    }

    /// Pages outside the range; 0 when inside.
    pub fn distance(&self, pages: u32) -> u32 {
        if pages < self.min_pages {
            self.min_pages - pages
        } else {
            pages.saturating_sub(self.max_pages)
        }
    }
}

/// "1 page", "3 pages".
pub fn page_phrase(pages: u32) -> String {
    match pages {
        1 => "1 page".to_string(),
        n => format!("{n} pages"),
    }
}

impl fmt::Display for PageTarget {
    /// "1 page" for a single-length target, "1-2 pages" for a range.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min_pages == self.max_pages {
            f.write_str(&page_phrase(self.max_pages))
        } else {
            write!(f, "{}-{} pages", self.min_pages, self.max_pages)
        }
    }
}

#[derive(Debug, Clone)]
pub struct TailoringPolicy {
    pub max_attempts: u32,
    pub target: PageTarget,
    /// Pause between attempts. Pacing only; nothing is retried with identical input.
    pub attempt_delay: Duration,
}

impl Default for TailoringPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            target: PageTarget::default(),
            attempt_delay: Duration::ZERO,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ExternalCall,
    ResponseShape,
    Render,
    MissingInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptStatus {
    Rendered { page_count: u32, within_target: bool },
    Failed { kind: FailureKind, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub index: u32,
    pub strategy: TailoringStrategy,
    #[serde(flatten)]
    pub status: AttemptStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    TargetMet,
    /// Attempts exhausted; the closest rendered attempt was kept.
    TargetNotMet,
    /// No attempt rendered at all.
    Failed,
}

/// The attempt whose artifacts sit at the final paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeptAttempt {
    pub index: u32,
    pub page_count: u32,
    pub content: TailoringAttempt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailoringReport {
    pub outcome: Outcome,
    pub target: PageTarget,
    pub attempts: Vec<AttemptRecord>,
    pub kept: Option<KeptAttempt>,
    pub html_path: Option<PathBuf>,
    pub pdf_path: Option<PathBuf>,
}

impl TailoringReport {
    pub fn final_page_count(&self) -> Option<u32> {
        self.kept.as_ref().map(|k| k.page_count)
    }

    /// Human-readable reason of the last failed attempt, for status columns.
    pub fn last_failure(&self) -> Option<(FailureKind, &str)> {
        self.attempts.iter().rev().find_map(|a| match &a.status {
            AttemptStatus::Failed { kind, reason } => Some((*kind, reason.as_str())),
            AttemptStatus::Rendered { .. } => None,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Loop
// ────────────────────────────────────────────────────────────────────────────

/// The loop's collaborators. Cheap to clone.
#[derive(Clone)]
pub struct TailoringServices {
    pub generator: Arc<dyn TextGenerator>,
    pub composer: Arc<dyn ResumeComposer>,
    pub renderer: Arc<dyn PdfRenderer>,
    pub page_counter: Arc<dyn PageCounter>,
}

#[derive(Default)]
struct LoopMemory {
    /// Raw text of the most recent AI response, parsed or not.
    last_response: Option<String>,
    /// Most recent response that parsed.
    latest_attempt: Option<TailoringAttempt>,
    /// Page count of the most recent attempt that rendered.
    last_page_count: Option<u32>,
    kept: Option<KeptAttempt>,
}

/// Runs the loop for one job, writing `<base_name>.html`, `<base_name>.pdf` and
/// `tailoring_report.json` into `work_dir` (which must exist).
pub async fn run_tailoring_loop(
    services: &TailoringServices,
    request: &TailoringRequest,
    policy: &TailoringPolicy,
    work_dir: &Path,
    base_name: &str,
) -> TailoringReport {
    let paths = ArtifactPaths::in_dir(work_dir, base_name);
    remove_stale(&paths).await;

    let system = system_prompt();
    let mut memory = LoopMemory::default();
    let mut attempts = Vec::new();
    let mut target_met = false;

    for index in 1..=policy.max_attempts.max(1) {
        if index > 1 && !policy.attempt_delay.is_zero() {
            tokio::time::sleep(policy.attempt_delay).await;
        }

        let strategy = TailoringStrategy::for_attempt(index);
        info!(attempt = index, %strategy, "Starting tailoring attempt");

        let status = run_attempt(
            services, request, policy, &system, strategy, index, &paths, work_dir, &mut memory,
        )
        .await;

        match &status {
            AttemptStatus::Rendered {
                page_count,
                within_target,
            } => info!(
                attempt = index,
                page_count,
                within_target,
                "Tailoring attempt rendered"
            ),
            AttemptStatus::Failed { kind, reason } => {
                warn!(attempt = index, ?kind, %reason, "Tailoring attempt failed")
            }
        }

        let done = matches!(
            status,
            AttemptStatus::Rendered {
                within_target: true,
                ..
            }
        );
        attempts.push(AttemptRecord {
            index,
            strategy,
            status,
        });
        if done {
            target_met = true;
            break;
        }
    }

    let outcome = match (&memory.kept, target_met) {
        (_, true) => Outcome::TargetMet,
        (Some(_), false) => Outcome::TargetNotMet,
        (None, false) => Outcome::Failed,
    };
    let has_artifacts = memory.kept.is_some();
    let report = TailoringReport {
        outcome,
        target: policy.target,
        attempts,
        kept: memory.kept,
        html_path: has_artifacts.then(|| paths.html.clone()),
        pdf_path: has_artifacts.then(|| paths.pdf.clone()),
    };

    info!(
        ?outcome,
        attempts = report.attempts.len(),
        final_pages = ?report.final_page_count(),
        "Tailoring loop finished"
    );

    if let Err(e) = write_report(&report, work_dir).await {
        warn!(error = %e, "Failed to write tailoring report");
    }
    report
}

#[allow(clippy::too_many_arguments)]
async fn run_attempt(
    services: &TailoringServices,
    request: &TailoringRequest,
    policy: &TailoringPolicy,
    system: &str,
    strategy: TailoringStrategy,
    index: u32,
    paths: &ArtifactPaths,
    work_dir: &Path,
    memory: &mut LoopMemory,
) -> AttemptStatus {
    let feedback = PageFeedback {
        target: policy.target,
        last_page_count: memory.last_page_count,
    };
    let Some(prompt) = build_prompt(
        strategy,
        request,
        memory.last_response.as_deref(),
        memory.latest_attempt.as_ref(),
        feedback,
    ) else {
        return AttemptStatus::Failed {
            kind: FailureKind::MissingInput,
            reason: "no parsed attempt to condense".to_string(),
        };
    };

    let raw = match services.generator.generate(&prompt, system).await {
        Ok(raw) => raw,
        Err(e) => {
            return AttemptStatus::Failed {
                kind: FailureKind::ExternalCall,
                reason: e.to_string(),
            }
        }
    };
    memory.last_response = Some(raw.clone());

    let attempt = match parse_attempt(&raw) {
        Ok(attempt) => attempt,
        Err(e) => {
            return AttemptStatus::Failed {
                kind: FailureKind::ResponseShape,
                reason: e.to_string(),
            }
        }
    };
    debug!(attempt = index, words = attempt.word_count(), "Parsed tailoring response");
    memory.latest_attempt = Some(attempt.clone());

    let (staged, page_count) = match measure(services, &attempt, work_dir).await {
        Ok(measured) => measured,
        Err(e) => {
            return AttemptStatus::Failed {
                kind: FailureKind::Render,
                reason: e.to_string(),
            }
        }
    };
    memory.last_page_count = Some(page_count);

    let distance = policy.target.distance(page_count);
    let closer = memory
        .kept
        .as_ref()
        .map_or(true, |k| distance <= policy.target.distance(k.page_count));
    if closer {
        if let Err(e) = staged.commit(paths) {
            return AttemptStatus::Failed {
                kind: FailureKind::Render,
                reason: format!("could not move artifacts into place: {e}"),
            };
        }
        memory.kept = Some(KeptAttempt {
            index,
            page_count,
            content: attempt,
        });
    }

    AttemptStatus::Rendered {
        page_count,
        within_target: policy.target.contains(page_count),
    }
}

/// Renders an attempt into staging files and reads the page count.
async fn measure(
    services: &TailoringServices,
    attempt: &TailoringAttempt,
    work_dir: &Path,
) -> Result<(StagedAttempt, u32), RenderError> {
    let html = services.composer.compose(attempt)?;
    let staged = StagedAttempt::stage(work_dir, &html).await?;
    services.renderer.render_pdf(&html, staged.pdf_path()).await?;
    let pages = count_pages(
        Arc::clone(&services.page_counter),
        staged.pdf_path().to_path_buf(),
    )
    .await?;
    Ok((staged, pages))
}

/// A rerun starts without artifacts from an earlier run.
async fn remove_stale(paths: &ArtifactPaths) {
    for path in [&paths.html, &paths.pdf] {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Removed stale artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Could not remove stale artifact"),
        }
    }
}

pub async fn write_report(report: &TailoringReport, work_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = work_dir.join(REPORT_FILE_NAME);
    let json = serde_json::to_vec_pretty(report)?;
    tokio::fs::write(&path, json).await?;
    Ok(path)
}
