// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod commands;
mod dashboard;
mod render;

use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pulse_core::{init_tracing, ExitCode, LogFormat, PulseConfig};
use pulse_ingest::LoadMode;
use pulse_model::Family;

use crate::commands::{CliError, IngestArgs, SelectionArgs};

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Load quarterly payment statistics into SQLite and explore them")]
#[command(version)]
struct Cli {
    /// Machine-readable output on stdout.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the snapshot tree and load family tables.
    Ingest {
        /// Family to load; repeat for several. Defaults to all nine.
        #[arg(long = "family")]
        families: Vec<Family>,
        #[arg(long)]
        data_root: Option<PathBuf>,
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ModeCli::Append)]
        mode: ModeCli,
        /// Also write the run report as JSON to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Summarise tables, years and states in the store.
    InspectDb {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Render one dashboard view.
    View {
        view: String,
        #[arg(long)]
        db: Option<PathBuf>,
        #[command(flatten)]
        selection: SelectionFlags,
    },
    /// Interactive dashboard on stdin/stdout.
    Dashboard {
        #[arg(long)]
        db: Option<PathBuf>,
        #[command(flatten)]
        selection: SelectionFlags,
    },
}

#[derive(Args)]
struct SelectionFlags {
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    quarter: Option<String>,
    #[arg(long)]
    from_year: Option<String>,
    #[arg(long)]
    to_year: Option<String>,
    #[arg(long)]
    state: Option<String>,
}

impl From<SelectionFlags> for SelectionArgs {
    fn from(flags: SelectionFlags) -> Self {
        Self {
            year: flags.year,
            quarter: flags.quarter,
            from_year: flags.from_year,
            to_year: flags.to_year,
            state: flags.state,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeCli {
    Append,
    Replace,
}

impl From<ModeCli> for LoadMode {
    fn from(mode: ModeCli) -> Self {
        match mode {
            ModeCli::Append => LoadMode::Append,
            ModeCli::Replace => LoadMode::Replace,
        }
    }
}

fn main() -> ProcessExitCode {
    let cli = Cli::parse();
    let config = PulseConfig::from_env();
    let format = if config.log_json {
        LogFormat::Json
    } else {
        LogFormat::Human
    };
    init_tracing(format, "info");
    let json_out = cli.json;
    match run(cli, config) {
        Ok(()) => ProcessExitCode::from(ExitCode::Success.code()),
        Err(err) => {
            if json_out {
                match err.error.to_json() {
                    Ok(payload) => eprintln!("{payload}"),
                    Err(_) => eprintln!("{err}"),
                }
            } else {
                eprintln!("error: {err}");
            }
            ProcessExitCode::from(err.exit.code())
        }
    }
}

fn run(cli: Cli, config: PulseConfig) -> Result<(), CliError> {
    match cli.command {
        Commands::Ingest {
            families,
            data_root,
            db,
            mode,
            report,
        } => commands::run_ingest(
            IngestArgs {
                families,
                data_root: data_root.unwrap_or(config.data_root),
                db_path: db.unwrap_or(config.db_path),
                mode: mode.into(),
                report,
            },
            cli.json,
        ),
        Commands::InspectDb { db } => {
            commands::inspect_db(&db.unwrap_or(config.db_path), cli.json)
        }
        Commands::View {
            view,
            db,
            selection,
        } => commands::run_view_command(
            &db.unwrap_or(config.db_path),
            &view,
            &selection.into(),
            cli.json,
        ),
        Commands::Dashboard { db, selection } => {
            commands::run_dashboard(&db.unwrap_or(config.db_path), &selection.into())
        }
    }
}
