// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod decode;
mod extract;
mod job;
mod logging;
mod report;
mod sqlite;
mod walk;

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use pulse_model::Family;
use serde::Serialize;

pub const CRATE_NAME: &str = "pulse-ingest";

pub use decode::{decode_quarter_files, read_document, DecodedFamily};
pub use extract::{extract_rows, ExtractError, Extracted, UNKNOWN_ENTITY};
pub use job::IngestJob;
pub use logging::{IngestEvent, IngestLog, IngestStage};
pub use report::{write_report_json, FamilyFailure, FamilyIngestReport, IngestRunReport, SkippedFile};
pub use sqlite::{open_store, table_totals, TableTotals, SQLITE_SCHEMA_VERSION};
pub use walk::{walk_quarter_files, QuarterFile, WalkOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum IngestErrorCode {
    MissingRoot,
    Io,
    Store,
    Validation,
}

impl IngestErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingRoot => "missing_root",
            Self::Io => "io",
            Self::Store => "store",
            Self::Validation => "validation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestError {
    pub code: IngestErrorCode,
    pub message: String,
}

impl IngestError {
    #[must_use]
    pub fn new(code: IngestErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for IngestError {}

impl From<rusqlite::Error> for IngestError {
    fn from(value: rusqlite::Error) -> Self {
        Self::new(IngestErrorCode::Store, value.to_string())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(value: std::io::Error) -> Self {
        Self::new(IngestErrorCode::Io, value.to_string())
    }
}

/// How a family's rows meet rows already in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// Re-running re-inserts the same rows.
    #[default]
    Append,
    /// Clears the table in the load transaction first.
    Replace,
}

impl LoadMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Replace => "replace",
        }
    }
}

impl FromStr for LoadMode {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            other => Err(IngestError::new(
                IngestErrorCode::Validation,
                format!("unknown load mode `{other}` (expected append or replace)"),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub data_root: PathBuf,
    pub db_path: PathBuf,
    pub mode: LoadMode,
}

impl IngestOptions {
    #[must_use]
    pub fn new(data_root: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            db_path: db_path.into(),
            mode: LoadMode::Append,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Loads every quarter file of one family into its table.
///
/// A missing source directory fails the family. Unreadable or malformed
/// files are skipped and listed in the report. All rows are inserted in a
/// single transaction on a connection that lives only for this call.
pub fn ingest_family(
    opts: &IngestOptions,
    family: Family,
) -> Result<FamilyIngestReport, IngestError> {
    let job = IngestJob::new(opts, family);
    let mut log = IngestLog::default();
    log.emit(
        IngestStage::Prepare,
        "ingest.family.start",
        logging::fields([
            ("family", family.to_string()),
            ("source_root", job.source_root.display().to_string()),
            ("mode", job.mode.as_str().to_string()),
        ]),
    );
    tracing::info!(%family, root = %job.source_root.display(), "ingesting family");

    let walked = walk_quarter_files(&job.source_root)?;
    log.emit(
        IngestStage::Walk,
        "ingest.walk.complete",
        logging::fields([
            ("files", walked.files.len().to_string()),
            ("rejected", walked.skipped.len().to_string()),
        ]),
    );
    for skipped in &walked.skipped {
        tracing::warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipping quarter file");
    }

    let decoded = decode_quarter_files(job.rule(), &walked.files);
    log.emit(
        IngestStage::Extract,
        "ingest.extract.complete",
        logging::fields([
            ("rows", decoded.records.len().to_string()),
            ("files_loaded", decoded.files_loaded.to_string()),
            ("dropped_entries", decoded.dropped_entries.to_string()),
        ]),
    );

    let count_sum = decoded
        .records
        .iter()
        .try_fold(0_i64, |sum, r| sum.checked_add(r.metrics.count()))
        .ok_or_else(|| {
            IngestError::new(
                IngestErrorCode::Validation,
                format!("{family}: sum of counts overflows a 64-bit integer"),
            )
        })?;

    let files_seen = (walked.files.len() + walked.skipped.len()) as u64;
    let mut skipped_files = walked.skipped;
    skipped_files.extend(decoded.skipped);

    log.emit(
        IngestStage::Persist,
        "ingest.persist.begin",
        logging::fields([("db_path", job.db_path.display().to_string())]),
    );
    let schema = job.schema();
    let mut conn = open_store(&job.db_path)?;
    sqlite::ensure_schema(&conn, schema)?;
    let audit = sqlite::RunAudit {
        family: schema.name,
        files_loaded: decoded.files_loaded,
        files_skipped: skipped_files.len() as u64,
        mode: job.mode,
    };
    let rows_inserted = sqlite::persist_family(&mut conn, schema, &decoded.records, &audit)?;
    drop(conn);
    log.emit(
        IngestStage::Finalize,
        "ingest.family.complete",
        logging::fields([
            ("rows_inserted", rows_inserted.to_string()),
            ("count_sum", count_sum.to_string()),
            ("skipped_files", skipped_files.len().to_string()),
        ]),
    );
    tracing::info!(
        %family,
        rows = rows_inserted,
        files = decoded.files_loaded,
        skipped = skipped_files.len(),
        "family loaded"
    );

    Ok(FamilyIngestReport {
        family,
        table: schema.name,
        source_root: job.source_root,
        mode: job.mode,
        files_seen,
        files_loaded: decoded.files_loaded,
        skipped_files,
        rows_inserted,
        dropped_entries: decoded.dropped_entries,
        count_sum,
        events: log.into_events(),
    })
}

/// Runs each family in turn. A family that fails is recorded and the run
/// moves on; only a store that cannot be opened at all aborts the run.
pub fn ingest_families(
    opts: &IngestOptions,
    families: &[Family],
) -> Result<IngestRunReport, IngestError> {
    drop(open_store(&opts.db_path)?);
    let mut report = IngestRunReport {
        db_path: opts.db_path.clone(),
        mode: opts.mode,
        families: Vec::with_capacity(families.len()),
        failures: Vec::new(),
    };
    for &family in families {
        match ingest_family(opts, family) {
            Ok(family_report) => report.families.push(family_report),
            Err(err) => {
                tracing::error!(%family, code = err.code.as_str(), error = %err.message, "family ingest failed");
                report.failures.push(FamilyFailure {
                    family,
                    code: err.code,
                    message: err.message,
                });
            }
        }
    }
    Ok(report)
}

