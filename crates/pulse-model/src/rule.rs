// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

/// Shape of one entry in a ranked-entity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankedShape {
    /// `{<name_key>, metric: {count, amount}}`
    NestedCountAmount,
    /// `{<name_key>, registeredUsers, appOpens}`
    FlatEngagement,
}

/// Where a family's rows live inside a quarter document (always under the
/// top-level `data` object) and how one document flattens into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ExtractionRule {
    /// `[{name, paymentInstruments: [{count, amount}]}]`
    NamedMetrics { list: &'static str },
    /// `[{brand, count, percentage}]`, null list yields no rows.
    DeviceRows { list: &'static str },
    /// `[{name, metric: [{count, amount}]}]`
    DistrictMetrics { list: &'static str },
    /// `{district: {registeredUsers?, appOpens?}}`
    DistrictMapping { map: &'static str },
    /// Ranked entities with defaulted name and metrics.
    RankedEntities {
        list: &'static str,
        name_key: &'static str,
        shape: RankedShape,
    },
    /// Parallel `columns[]` / `data[][]` reading `lat`, `lng`, `metric`, `label`.
    ColumnZip {
        columns: &'static str,
        rows: &'static str,
    },
}

impl ExtractionRule {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NamedMetrics { .. } => "named_metrics",
            Self::DeviceRows { .. } => "device_rows",
            Self::DistrictMetrics { .. } => "district_metrics",
            Self::DistrictMapping { .. } => "district_mapping",
            Self::RankedEntities { .. } => "ranked_entities",
            Self::ColumnZip { .. } => "column_zip",
        }
    }
}
