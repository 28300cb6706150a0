//! CSV-backed job table. Loaded whole, saved whole.
//!
//! Saves go through a temporary file in the table's directory and a rename, so a
//! reader never sees a half-written table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::jobs::record::JobRecord;

#[derive(Debug)]
pub struct JobTable {
    path: PathBuf,
    pub rows: Vec<JobRecord>,
}

impl JobTable {
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open job table {}", path.display()))?;

        let mut rows = Vec::new();
        for (i, result) in reader.deserialize::<JobRecord>().enumerate() {
            let mut row = result
                .with_context(|| format!("Invalid row {} in {}", i + 2, path.display()))?;
            if row.job_id.trim().is_empty() {
                row.job_id = format!("Index{i}");
            }
            rows.push(row);
        }

        info!(path = %path.display(), rows = rows.len(), "Job table loaded");
        Ok(Self {
            path: path.to_path_buf(),
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::Builder::new()
            .prefix(".jobs-")
            .suffix(".csv")
            .tempfile_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;

        let mut writer = csv::Writer::from_writer(tmp.as_file());
        for row in &self.rows {
            writer.serialize(row).context("Failed to serialize job row")?;
        }
        writer.flush().context("Failed to flush job table")?;
        drop(writer);

        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), rows = self.rows.len(), "Job table saved");
        Ok(())
    }
}
