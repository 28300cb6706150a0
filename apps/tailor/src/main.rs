mod analysis;
mod cli;
mod config;
mod errors;
mod jobs;
mod llm_client;
mod render;
mod routes;
mod state;
mod tailoring;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands, TailorOneArgs};
use crate::config::Config;
use crate::jobs::{HttpPostingSource, JobTable, Phase, Workflow};
use crate::llm_client::{LlmClient, TextGenerator};
use crate::render::{
    text::load_base_resume, BaseResumeInjector, CommandRenderer, LopdfPageCounter, ResumeComposer,
    ResumeTemplate,
};
use crate::routes::build_router;
use crate::state::AppState;
use crate::tailoring::{run_tailoring_loop, Outcome, TailoringRequest, TailoringServices};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first; fails on missing required env vars
    let mut config = Config::from_env()?;
    if let Some(path) = cli.jobs_csv.clone() {
        config.jobs_csv = path;
    }
    if let Some(dir) = cli.output_dir.clone() {
        config.output_dir = dir;
    }

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tailor v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_model.clone())?;
    info!("LLM client initialized (model: {})", llm.model());
    let generator: Arc<dyn TextGenerator> = Arc::new(llm);

    // Initialize rendering
    let composer = build_composer(&config)?;
    let renderer = CommandRenderer::new(config.pdf_renderer.clone(), config.pdf_renderer_args.clone());
    info!("PDF renderer: {}", renderer.program());
    let tailoring = TailoringServices {
        generator: generator.clone(),
        composer,
        renderer: Arc::new(renderer),
        page_counter: Arc::new(LopdfPageCounter),
    };

    // Base resume is optional until a phase needs it
    let base_resume: Option<Arc<str>> = match load_base_resume(&config.resume_path) {
        Ok(text) => {
            info!(path = %config.resume_path.display(), chars = text.len(), "Base resume loaded");
            Some(Arc::from(text))
        }
        Err(e) => {
            warn!("Base resume unavailable: {e:#}");
            None
        }
    };

    let phases = match &cli.command {
        Commands::Fetch => Some((Phase::Fetch, Phase::Fetch)),
        Commands::Analyze => Some((Phase::Analyze, Phase::Analyze)),
        Commands::Tailor => Some((Phase::Tailor, Phase::Tailor)),
        Commands::Run(args) => Some((args.start_phase, args.end_phase)),
        Commands::TailorOne(_) | Commands::Serve => None,
    };

    if let Some((start, end)) = phases {
        let workflow = Workflow {
            generator,
            tailoring,
            policy: config.tailoring_policy(),
            postings: Arc::new(HttpPostingSource::new(&config.posting_selector)?),
            base_resume,
            settings: config.workflow_settings(),
        };
        let mut table = JobTable::load(&config.jobs_csv)?;
        for (phase, summary) in workflow.run(&mut table, start, end).await? {
            info!(?phase, ?summary, "Phase summary");
        }
        return Ok(());
    }

    match cli.command {
        Commands::TailorOne(args) => tailor_one(&config, &tailoring, base_resume, args).await,
        Commands::Serve => {
            let state = AppState {
                policy: config.tailoring_policy(),
                config: config.clone(),
                generator,
                tailoring,
                base_resume,
            };
            serve(state, config.port).await
        }
        _ => Ok(()),
    }
}

/// Tailored content goes into the base resume itself when it is HTML with
/// recognizable sections; otherwise into the configured Tera template.
fn build_composer(config: &Config) -> Result<Arc<dyn ResumeComposer>> {
    if config.resume_is_html() {
        match BaseResumeInjector::from_file(&config.resume_path) {
            Ok(injector) => {
                info!(path = %config.resume_path.display(), "Rendering into base resume HTML");
                return Ok(Arc::new(injector));
            }
            Err(e) => warn!(
                path = %config.resume_path.display(),
                "Base resume cannot take injected content, using template: {e}"
            ),
        }
    }

    let template = ResumeTemplate::from_file(&config.template_path)
        .with_context(|| format!("Failed to load template {}", config.template_path.display()))?;
    info!(path = %config.template_path.display(), "Rendering into resume template");
    Ok(Arc::new(template))
}

async fn tailor_one(
    config: &Config,
    services: &TailoringServices,
    base_resume: Option<Arc<str>>,
    args: TailorOneArgs,
) -> Result<()> {
    let Some(resume) = base_resume else {
        bail!("A base resume is required (set RESUME_HTML)");
    };
    let job_description = tokio::fs::read_to_string(&args.jd_file)
        .await
        .with_context(|| format!("Failed to read {}", args.jd_file.display()))?;
    let recommendations = match &args.recommendations {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => String::new(),
    };

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let request = TailoringRequest {
        base_resume_text: resume.to_string(),
        job_description,
        recommendations,
    };
    let report = run_tailoring_loop(
        services,
        &request,
        &config.tailoring_policy(),
        &config.output_dir,
        &args.name,
    )
    .await;

    info!(
        outcome = ?report.outcome,
        attempts = report.attempts.len(),
        pages = ?report.final_page_count(),
        pdf = ?report.pdf_path,
        "Tailoring finished"
    );
    if report.outcome == Outcome::Failed {
        let reason = report
            .last_failure()
            .map(|(_, reason)| reason.to_string())
            .unwrap_or_default();
        bail!("No attempt produced a PDF: {reason}");
    }
    Ok(())
}

async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
