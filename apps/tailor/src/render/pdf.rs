//! HTML→PDF conversion and PDF page counting.
//!
//! `CommandRenderer` runs an external converter as `<program> [args..] <input.html> <output.pdf>`.
//! `LopdfPageCounter` reads the page tree of the produced file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::render::RenderError;

/// Converts an HTML document into a PDF file at `output`.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render_pdf(&self, html: &str, output: &Path) -> Result<(), RenderError>;
}

/// Reads the number of pages of a PDF file. Synchronous: call via `count_pages`.
pub trait PageCounter: Send + Sync {
    fn page_count(&self, pdf: &Path) -> Result<u32, RenderError>;
}

// ────────────────────────────────────────────────────────────────────────────
// CommandRenderer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl PdfRenderer for CommandRenderer {
    async fn render_pdf(&self, html: &str, output: &Path) -> Result<(), RenderError> {
        // Input lives next to the output so relative stylesheet links resolve the same way.
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let input = tempfile::Builder::new()
            .prefix(".render-")
            .suffix(".html")
            .tempfile_in(dir)?;
        tokio::fs::write(input.path(), html).await?;

        let result = Command::new(&self.program)
            .args(&self.args)
            .arg(input.path())
            .arg(output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(RenderError::RendererFailed {
                program: self.program.clone(),
                code: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.len() > 0 => {
                debug!(program = %self.program, bytes = meta.len(), "PDF rendered");
                Ok(())
            }
            _ => Err(RenderError::MissingOutput(output.to_path_buf())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LopdfPageCounter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfPageCounter;

impl PageCounter for LopdfPageCounter {
    fn page_count(&self, pdf: &Path) -> Result<u32, RenderError> {
        let document = lopdf::Document::load(pdf)
            .map_err(|e| RenderError::PageCount(format!("{}: {e}", pdf.display())))?;
        match document.get_pages().len() {
            0 => Err(RenderError::PageCount(format!(
                "{} has no pages",
                pdf.display()
            ))),
            n => Ok(n as u32),
        }
    }
}

/// Runs a page count on the blocking pool.
pub async fn count_pages(counter: Arc<dyn PageCounter>, pdf: PathBuf) -> Result<u32, RenderError> {
    tokio::task::spawn_blocking(move || counter.page_count(&pdf))
        .await
        .map_err(|e| RenderError::Join(e.to_string()))?
}
