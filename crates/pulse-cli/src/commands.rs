// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pulse_core::{ExitCode, MachineError};
use pulse_ingest::{
    ingest_families, table_totals, write_report_json, IngestError, IngestErrorCode,
    IngestOptions, IngestRunReport, LoadMode,
};
use pulse_model::Family;
use pulse_query::{
    available_states, available_years, open_read_only, run_view, QueryError, QueryErrorCode,
    Selection, View,
};
use rusqlite::Connection;
use serde_json::json;

use crate::dashboard::Session;
use crate::render::render_view;

#[derive(Debug)]
pub struct CliError {
    pub exit: ExitCode,
    pub error: MachineError,
}

impl CliError {
    pub fn new(exit: ExitCode, code: &str, message: impl AsRef<str>) -> Self {
        Self {
            exit,
            error: MachineError::new(code, message.as_ref()),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<IngestError> for CliError {
    fn from(value: IngestError) -> Self {
        let exit = match value.code {
            IngestErrorCode::MissingRoot | IngestErrorCode::Validation => ExitCode::Validation,
            _ => ExitCode::DependencyFailure,
        };
        Self::new(exit, value.code.as_str(), &value.message)
    }
}

impl From<QueryError> for CliError {
    fn from(value: QueryError) -> Self {
        let (exit, code) = match value.code {
            QueryErrorCode::Validation => (ExitCode::Validation, "validation"),
            QueryErrorCode::Store => (ExitCode::DependencyFailure, "store"),
            _ => (ExitCode::DependencyFailure, "sql"),
        };
        Self::new(exit, code, &value.message)
    }
}

impl From<io::Error> for CliError {
    fn from(value: io::Error) -> Self {
        Self::new(ExitCode::Internal, "io", value.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::new(ExitCode::Internal, "encode", value.to_string())
    }
}

impl From<rusqlite::Error> for CliError {
    fn from(value: rusqlite::Error) -> Self {
        Self::new(ExitCode::DependencyFailure, "sql", value.to_string())
    }
}

pub struct IngestArgs {
    pub families: Vec<Family>,
    pub data_root: PathBuf,
    pub db_path: PathBuf,
    pub mode: LoadMode,
    pub report: Option<PathBuf>,
}

pub fn run_ingest(args: IngestArgs, json_out: bool) -> Result<(), CliError> {
    let families = if args.families.is_empty() {
        Family::ALL.to_vec()
    } else {
        args.families
    };
    let opts = IngestOptions::new(&args.data_root, &args.db_path).with_mode(args.mode);
    let report = ingest_families(&opts, &families)?;
    if let Some(path) = &args.report {
        write_report_json(path, &report)?;
    }
    if json_out {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        print_ingest_summary(&mut io::stdout().lock(), &report)?;
    }
    if let Some(first) = report.failures.first() {
        return Err(CliError::new(
            ExitCode::Validation,
            first.code.as_str(),
            format!(
                "{} of {} families failed; first: {}: {}",
                report.failures.len(),
                families.len(),
                first.family,
                first.message
            ),
        ));
    }
    Ok(())
}

fn print_ingest_summary<W: Write>(out: &mut W, report: &IngestRunReport) -> io::Result<()> {
    for family in &report.families {
        writeln!(
            out,
            "{:<24} rows {:>8}  files {:>4}/{:<4} skipped {:>3}  dropped entries {:>3}",
            family.table,
            family.rows_inserted,
            family.files_loaded,
            family.files_seen,
            family.skipped_files.len(),
            family.dropped_entries
        )?;
        for skipped in &family.skipped_files {
            writeln!(out, "  skipped {}: {}", skipped.path.display(), skipped.reason)?;
        }
    }
    for failure in &report.failures {
        writeln!(out, "{:<24} FAILED {}", failure.family.as_str(), failure.message)?;
    }
    writeln!(
        out,
        "loaded {} rows into {} ({})",
        report.total_rows(),
        report.db_path.display(),
        report.mode.as_str()
    )
}

fn open_store(db: &Path) -> Result<Connection, CliError> {
    if !db.exists() {
        return Err(CliError::new(
            ExitCode::DependencyFailure,
            "store",
            format!("store {} does not exist; run `pulse ingest` first", db.display()),
        ));
    }
    Ok(open_read_only(db)?)
}

pub fn inspect_db(db: &Path, json_out: bool) -> Result<(), CliError> {
    let conn = open_store(db)?;
    let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let mut tables = Vec::new();
    for family in Family::ALL {
        if let Some(totals) = table_totals(&conn, family.schema())? {
            if totals.count_sum.is_none() {
                tracing::warn!(table = family.as_str(), "count column sum overflows i64");
            }
            tables.push(json!({
                "table": family.as_str(),
                "rows": totals.rows,
                "count_column": family.schema().count_column,
                "count_sum": totals.count_sum,
            }));
        }
    }
    let years: Vec<String> = available_years(&conn)?.iter().map(ToString::to_string).collect();
    let states = available_states(&conn)?.len();
    if json_out {
        let payload = json!({
            "db": db.display().to_string(),
            "schema_version": version,
            "tables": tables,
            "years": years,
            "states": states,
        });
        println!("{}", serde_json::to_string(&payload)?);
        return Ok(());
    }
    let mut out = io::stdout().lock();
    writeln!(out, "store {} (schema v{version})", db.display())?;
    for t in &tables {
        let count_sum = match t["count_sum"].as_i64() {
            Some(sum) => sum.to_string(),
            None => "overflow".to_string(),
        };
        writeln!(
            out,
            "  {:<24} rows {:>8}  {} {}",
            t["table"].as_str().unwrap_or_default(),
            t["rows"],
            t["count_column"].as_str().unwrap_or_default(),
            count_sum
        )?;
    }
    writeln!(out, "years: {}", years.join(", "))?;
    writeln!(out, "states: {states}")?;
    Ok(())
}

pub struct SelectionArgs {
    pub year: Option<String>,
    pub quarter: Option<String>,
    pub from_year: Option<String>,
    pub to_year: Option<String>,
    pub state: Option<String>,
}

fn resolve_selection(conn: &Connection, args: &SelectionArgs) -> Result<Selection, CliError> {
    let mut sel = Selection::from_available(&available_years(conn)?)?;
    if let Some(year) = &args.year {
        sel = sel.with_year(year)?;
    }
    if let Some(quarter) = &args.quarter {
        sel = sel.with_quarter(quarter)?;
    }
    if args.from_year.is_some() || args.to_year.is_some() {
        let from = args
            .from_year
            .clone()
            .unwrap_or_else(|| sel.from_year.to_string());
        let to = args.to_year.clone().unwrap_or_else(|| sel.to_year.to_string());
        sel = sel.with_range(&from, &to)?;
    }
    if let Some(state) = &args.state {
        sel = sel.with_state(state)?;
    }
    Ok(sel)
}

pub fn run_view_command(
    db: &Path,
    view: &str,
    args: &SelectionArgs,
    json_out: bool,
) -> Result<(), CliError> {
    let view: View = view
        .parse()
        .map_err(|e: QueryError| CliError::new(ExitCode::Usage, "usage", e.message))?;
    let conn = open_store(db)?;
    let selection = resolve_selection(&conn, args)?;
    tracing::debug!(%view, db = %db.display(), "rendering view");
    let result = run_view(&conn, view, &selection);
    if json_out {
        println!("{}", serde_json::to_string(&result)?);
    } else {
        render_view(&mut io::stdout().lock(), &result)?;
    }
    Ok(())
}

pub fn run_dashboard(db: &Path, args: &SelectionArgs) -> Result<(), CliError> {
    let conn = open_store(db)?;
    let selection = resolve_selection(&conn, args)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    Session::new(&conn, selection).run(stdin.lock(), &mut stdout)?;
    Ok(())
}
