// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod catalog;
mod executor;
mod format;
pub mod panel;
mod query_error;
mod selection;
mod sql;
mod view;

pub use catalog::{available_states, available_years, loaded_tables, open_read_only};
pub use executor::{
    engagement_rate, run_panel, run_view, Cell, PanelOutcome, PanelReport, PanelResult,
    ViewResult,
};
pub use format::{format_count, format_rupees};
pub use panel::{ChartKind, PanelSpec};
pub use query_error::{QueryError, QueryErrorCode};
pub use selection::{Selection, DEFAULT_STATE, DEFAULT_YEARS};
pub use sql::{build_panel_sql, build_panel_sql_scoped, PeriodScope};
pub use view::View;

pub const CRATE_NAME: &str = "pulse-query";
