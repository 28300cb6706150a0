// Render Layer — turns a TailoringAttempt into HTML and PDF artifacts and measures them.
// ARCHITECTURAL RULE: the tailoring loop talks to rendering only through
// `ResumeComposer`, `PdfRenderer` and `PageCounter`.
// Page counting parses the whole PDF and must run inside tokio::task::spawn_blocking.

pub mod artifact;
pub mod inject;
pub mod pdf;
pub mod template;
pub mod text;

use std::path::PathBuf;

use thiserror::Error;

// Re-export the public API consumed by the tailoring loop and handlers.
pub use artifact::{ArtifactPaths, StagedAttempt};
pub use pdf::{count_pages, CommandRenderer, LopdfPageCounter, PageCounter, PdfRenderer};
pub use inject::BaseResumeInjector;
pub use template::{ResumeComposer, ResumeTemplate};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("could not inject into base resume: {0}")]
    Injection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to start renderer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer '{program}' exited with {code:?}: {stderr}")]
    RendererFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("renderer produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("could not read page count: {0}")]
    PageCount(String),

    #[error("page count task failed: {0}")]
    Join(String),
}
