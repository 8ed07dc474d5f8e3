// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod config;
mod errors;
mod logging;

pub use config::{resolve_data_root, resolve_db_path, PulseConfig};
pub use errors::{ExitCode, MachineError};
pub use logging::{init_tracing, LogFormat};

pub const CRATE_NAME: &str = "pulse-core";

pub const ENV_PULSE_DB_PATH: &str = "PULSE_DB_PATH";
pub const ENV_PULSE_DATA_ROOT: &str = "PULSE_DATA_ROOT";
pub const ENV_PULSE_LOG_JSON: &str = "PULSE_LOG_JSON";
/// Legacy database name variable; resolved to `<name>.sqlite` when no explicit path is set.
pub const ENV_DB_NAME: &str = "DB_NAME";

pub const DEFAULT_DB_FILE: &str = "pulse.sqlite";
pub const DEFAULT_DATA_ROOT: &str = "data";
