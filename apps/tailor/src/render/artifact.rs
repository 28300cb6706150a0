//! Per-attempt artifact staging.
//!
//! Each attempt writes its HTML and PDF to hidden temporary files inside the
//! job's working directory. `commit` renames them over the final paths; dropping
//! a `StagedAttempt` deletes them. The final paths therefore only ever hold a
//! complete HTML/PDF pair from a single attempt.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::warn;

use crate::render::RenderError;

/// Final locations of a job's surviving artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub html: PathBuf,
    pub pdf: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path, base_name: &str) -> Self {
        Self {
            html: dir.join(format!("{base_name}.html")),
            pdf: dir.join(format!("{base_name}.pdf")),
        }
    }
}

pub struct StagedAttempt {
    html: TempPath,
    pdf: TempPath,
}

impl StagedAttempt {
    /// Writes `html` to a staging file in `dir` and reserves a staging path for the PDF.
    pub async fn stage(dir: &Path, html: &str) -> Result<Self, RenderError> {
        let html_path = tempfile::Builder::new()
            .prefix(".attempt-")
            .suffix(".html")
            .tempfile_in(dir)?
            .into_temp_path();
        tokio::fs::write(&html_path, html).await?;

        let pdf_path = tempfile::Builder::new()
            .prefix(".attempt-")
            .suffix(".pdf")
            .tempfile_in(dir)?
            .into_temp_path();

        Ok(Self {
            html: html_path,
            pdf: pdf_path,
        })
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf
    }

    /// Moves both staged files over `paths`, each by an atomic rename.
    ///
    /// The PDF lands first. If the HTML move then fails, the previous PDF is put
    /// back (or the new one removed when there was none), so `paths` keeps the
    /// pair it held before the call.
    pub fn commit(self, paths: &ArtifactPaths) -> Result<(), RenderError> {
        let previous_pdf = set_aside(&paths.pdf)?;
        if let Err(e) = self.pdf.persist(&paths.pdf) {
            restore(previous_pdf, &paths.pdf);
            return Err(RenderError::Io(e.error));
        }
        if let Err(e) = self.html.persist(&paths.html) {
            restore(previous_pdf, &paths.pdf);
            return Err(RenderError::Io(e.error));
        }
        Ok(())
    }
}

/// Renames an existing file at `path` to a hidden backup next to it.
fn set_aside(path: &Path) -> Result<Option<TempPath>, RenderError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let backup = tempfile::Builder::new()
        .prefix(".previous-")
        .suffix(".pdf")
        .tempfile_in(dir)?
        .into_temp_path();

    match std::fs::rename(path, &backup) {
        Ok(()) => Ok(Some(backup)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RenderError::Io(e)),
    }
}

fn restore(previous: Option<TempPath>, path: &Path) {
    let result = match previous {
        Some(backup) => backup.persist(path).map_err(|e| e.error),
        None => match std::fs::remove_file(path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        },
    };
    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "Could not restore previous artifact");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_artifact_paths_share_base_name() {
        let paths = ArtifactPaths::in_dir(Path::new("/out/job"), "Acme_Engineer");
        assert_eq!(paths.html, PathBuf::from("/out/job/Acme_Engineer.html"));
        assert_eq!(paths.pdf, PathBuf::from("/out/job/Acme_Engineer.pdf"));
    }

    #[tokio::test]
    async fn test_commit_moves_both_files_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path(), "resume");

        let staged = StagedAttempt::stage(dir.path(), "<p>v1</p>").await.unwrap();
        std::fs::write(staged.pdf_path(), b"%PDF-v1").unwrap();
        staged.commit(&paths).unwrap();

        assert_eq!(std::fs::read_to_string(&paths.html).unwrap(), "<p>v1</p>");
        assert_eq!(std::fs::read(&paths.pdf).unwrap(), b"%PDF-v1");
        assert_eq!(file_names(dir.path()), vec!["resume.html", "resume.pdf"]);
    }

    #[tokio::test]
    async fn test_commit_replaces_previous_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path(), "resume");

        for version in ["v1", "v2"] {
            let staged = StagedAttempt::stage(dir.path(), version).await.unwrap();
            std::fs::write(staged.pdf_path(), version).unwrap();
            staged.commit(&paths).unwrap();
        }

        assert_eq!(std::fs::read_to_string(&paths.html).unwrap(), "v2");
        assert_eq!(std::fs::read_to_string(&paths.pdf).unwrap(), "v2");
    }

    /// A directory at the HTML path makes the HTML rename fail after the PDF moved.
    fn block_html(paths: &ArtifactPaths) {
        if paths.html.exists() {
            std::fs::remove_file(&paths.html).unwrap();
        }
        std::fs::create_dir(&paths.html).unwrap();
        std::fs::write(paths.html.join("keep"), "x").unwrap();
    }

    #[tokio::test]
    async fn test_failed_html_move_restores_previous_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path(), "resume");

        let staged = StagedAttempt::stage(dir.path(), "v1").await.unwrap();
        std::fs::write(staged.pdf_path(), "v1").unwrap();
        staged.commit(&paths).unwrap();
        block_html(&paths);

        let staged = StagedAttempt::stage(dir.path(), "v2").await.unwrap();
        std::fs::write(staged.pdf_path(), "v2").unwrap();
        assert!(matches!(staged.commit(&paths), Err(RenderError::Io(_))));

        assert_eq!(std::fs::read_to_string(&paths.pdf).unwrap(), "v1");
        assert_eq!(file_names(dir.path()), vec!["resume.html", "resume.pdf"]);
    }

    #[tokio::test]
    async fn test_failed_html_move_without_previous_pdf_leaves_no_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path(), "resume");
        block_html(&paths);

        let staged = StagedAttempt::stage(dir.path(), "v1").await.unwrap();
        std::fs::write(staged.pdf_path(), "v1").unwrap();
        assert!(staged.commit(&paths).is_err());

        assert!(!paths.pdf.exists());
        assert_eq!(file_names(dir.path()), vec!["resume.html"]);
    }

    #[tokio::test]
    async fn test_dropping_a_staged_attempt_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        {
            let staged = StagedAttempt::stage(dir.path(), "<p>x</p>").await.unwrap();
            std::fs::write(staged.pdf_path(), b"partial").unwrap();
        }
        assert!(file_names(dir.path()).is_empty());
    }
}
