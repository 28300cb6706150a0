//! Command-line interface (clap derive).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::jobs::Phase;

/// Tailor - job analysis and resume tailoring
///
/// Walks a CSV job table through posting fetch, AI analysis and page-targeted
/// resume tailoring, or serves the same operations over HTTP.
#[derive(Parser, Debug)]
#[command(name = "tailor", author, version, about = "AI-assisted job analysis and resume tailoring")]
pub struct Cli {
    /// Job table to process (overrides JOBS_CSV)
    #[arg(long, global = true)]
    pub jobs_csv: Option<PathBuf>,

    /// Directory tailored resumes are written under (overrides OUTPUT_DIR)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch job-description text for new rows
    Fetch,

    /// Extract job details and score resume fit for fetched rows
    Analyze,

    /// Tailor the resume for analyzed rows at or above the score threshold
    Tailor,

    /// Run a range of phases in order
    Run(RunArgs),

    /// Tailor the resume for a single job description file
    TailorOne(TailorOneArgs),

    /// Serve the HTTP API
    Serve,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(long, value_enum, default_value = "fetch")]
    pub start_phase: Phase,

    #[arg(long, value_enum, default_value = "tailor")]
    pub end_phase: Phase,
}

#[derive(Args, Debug)]
pub struct TailorOneArgs {
    /// Plain-text job description
    pub jd_file: PathBuf,

    /// Plain-text recommendations from a fit evaluation
    #[arg(long)]
    pub recommendations: Option<PathBuf>,

    /// Base name of the generated `.html` / `.pdf`
    #[arg(long, default_value = "tailored_resume")]
    pub name: String,
}
