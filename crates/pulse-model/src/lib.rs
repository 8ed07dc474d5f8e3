// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod family;
mod period;
mod record;
mod rule;
pub mod schema;

pub use family::Family;
pub use period::{
    title_case_label, PeriodKey, Quarter, StateName, ValidationError, Year, QUARTER_FILE_SUFFIX,
    STATE_MAX_LEN,
};
pub use record::{FlatRecord, MetricValue, Metrics, MetricsKind};
pub use rule::{ExtractionRule, RankedShape};
pub use schema::{Column, ColumnType, TableSchema, KEY_COLUMNS};

pub const CRATE_NAME: &str = "pulse-model";
