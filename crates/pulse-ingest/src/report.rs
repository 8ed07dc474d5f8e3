// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use pulse_model::Family;
use serde::Serialize;

use crate::logging::IngestEvent;
use crate::{IngestError, IngestErrorCode, LoadMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

impl SkippedFile {
    #[must_use]
    pub fn new(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyIngestReport {
    pub family: Family,
    pub table: &'static str,
    pub source_root: PathBuf,
    pub mode: LoadMode,
    pub files_seen: u64,
    pub files_loaded: u64,
    pub skipped_files: Vec<SkippedFile>,
    pub rows_inserted: u64,
    pub dropped_entries: u64,
    /// Sum of the count column over the inserted rows.
    pub count_sum: i64,
    pub events: Vec<IngestEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyFailure {
    pub family: Family,
    pub code: IngestErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestRunReport {
    pub db_path: PathBuf,
    pub mode: LoadMode,
    pub families: Vec<FamilyIngestReport>,
    pub failures: Vec<FamilyFailure>,
}

impl IngestRunReport {
    #[must_use]
    pub fn total_rows(&self) -> u64 {
        self.families.iter().map(|f| f.rows_inserted).sum()
    }

    #[must_use]
    pub fn total_skipped_files(&self) -> usize {
        self.families.iter().map(|f| f.skipped_files.len()).sum()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.total_skipped_files() == 0
    }
}

pub fn write_report_json(path: &Path, report: &IngestRunReport) -> Result<(), IngestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_vec_pretty(report).map_err(|e| {
        IngestError::new(IngestErrorCode::Io, format!("report encode failed: {e}"))
    })?;
    fs::write(path, body)?;
    Ok(())
}
