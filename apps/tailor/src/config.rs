use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use crate::jobs::WorkflowSettings;
use crate::llm_client::DEFAULT_MODEL;
use crate::tailoring::{PageTarget, TailoringPolicy};

/// Application configuration loaded from environment variables (and `.env`).
/// Fails at startup if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub llm_model: String,
    /// Base resume: `.pdf`, `.html` or plain text. An HTML resume is also the
    /// document tailored content is injected into.
    pub resume_path: PathBuf,
    /// Tera template used when the base resume is not injectable HTML.
    pub template_path: PathBuf,
    pub jobs_csv: PathBuf,
    pub output_dir: PathBuf,
    pub pdf_renderer: String,
    pub pdf_renderer_args: Vec<String>,
    pub target: PageTarget,
    pub max_tailoring_attempts: u32,
    /// Minimum threshold score for a job to be tailored.
    pub score_threshold: f64,
    /// Pause between AI calls, both between jobs and between tailoring attempts.
    pub api_delay: Duration,
    /// Save the job table after this many processed jobs.
    pub save_interval: usize,
    /// Re-process rows sitting in an error status.
    pub retry_failed: bool,
    pub posting_selector: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let target = PageTarget::new(
            parse_or(&lookup, "TARGET_MIN_PAGES", 1)?,
            parse_or(&lookup, "TARGET_MAX_PAGES", 1)?,
        )
        .map_err(|e| anyhow!(e))
        .context("Invalid TARGET_MIN_PAGES / TARGET_MAX_PAGES")?;

        let max_tailoring_attempts: u32 = parse_or(&lookup, "MAX_TAILORING_ATTEMPTS", 3)?;
        if max_tailoring_attempts == 0 {
            bail!("MAX_TAILORING_ATTEMPTS must be at least 1");
        }
        let save_interval: usize = parse_or(&lookup, "SAVE_INTERVAL", 3)?;
        if save_interval == 0 {
            bail!("SAVE_INTERVAL must be at least 1");
        }

        Ok(Config {
            anthropic_api_key: require(&lookup, "ANTHROPIC_API_KEY")?,
            llm_model: string_or(&lookup, "LLM_MODEL", DEFAULT_MODEL),
            resume_path: string_or(&lookup, "RESUME_HTML", "resume.html").into(),
            template_path: string_or(&lookup, "RESUME_TEMPLATE", "templates/resume.html.tera")
                .into(),
            jobs_csv: string_or(&lookup, "JOBS_CSV", "jobs.csv").into(),
            output_dir: string_or(&lookup, "OUTPUT_DIR", "output").into(),
            pdf_renderer: string_or(&lookup, "PDF_RENDERER", "weasyprint"),
            pdf_renderer_args: string_or(&lookup, "PDF_RENDERER_ARGS", "")
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            target,
            max_tailoring_attempts,
            score_threshold: parse_or(&lookup, "SCORE_THRESHOLD", 2.5)?,
            api_delay: Duration::from_secs(parse_or(&lookup, "API_DELAY_SECS", 5)?),
            save_interval,
            retry_failed: parse_bool_or(&lookup, "RETRY_FAILED", true)?,
            posting_selector: string_or(&lookup, "POSTING_SELECTOR", "div#job-details"),
            port: parse_or(&lookup, "PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: string_or(&lookup, "RUST_LOG", "info"),
        })
    }

    pub fn resume_is_html(&self) -> bool {
        self.resume_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
    }

    pub fn tailoring_policy(&self) -> TailoringPolicy {
        TailoringPolicy {
            max_attempts: self.max_tailoring_attempts,
            target: self.target,
            attempt_delay: self.api_delay,
        }
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            output_dir: self.output_dir.clone(),
            score_threshold: self.score_threshold,
            api_delay: self.api_delay,
            save_interval: self.save_interval,
            retry_failed: self.retry_failed,
        }
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{key}='{raw}' is invalid: {e}")),
        None => Ok(default),
    }
}

fn parse_bool_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool> {
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => bail!("{key}='{other}' is not a boolean"),
    }
}
