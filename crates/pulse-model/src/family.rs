// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::period::ValidationError;
use crate::rule::{ExtractionRule, RankedShape};
use crate::schema::{self, TableSchema};

/// The nine dataset families: {aggregated, map, top} x {transaction, user, insurance}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    AggregatedTransaction,
    AggregatedUser,
    AggregatedInsurance,
    MapTransaction,
    MapUser,
    MapInsurance,
    TopTransaction,
    TopUser,
    TopInsurance,
}

impl Family {
    pub const ALL: [Family; 9] = [
        Family::AggregatedTransaction,
        Family::AggregatedUser,
        Family::AggregatedInsurance,
        Family::MapTransaction,
        Family::MapUser,
        Family::MapInsurance,
        Family::TopTransaction,
        Family::TopUser,
        Family::TopInsurance,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.schema().name
    }

    /// Directory holding `state/year/quarter.json`, relative to the data root.
    #[must_use]
    pub const fn source_dir(self) -> &'static str {
        match self {
            Self::AggregatedTransaction => "aggregated/transaction/country/india/state",
            Self::AggregatedUser => "aggregated/user/country/india/state",
            Self::AggregatedInsurance => "aggregated/insurance/country/india/state",
            Self::MapTransaction => "map/transaction/hover/country/india/state",
            Self::MapUser => "map/user/hover/country/india/state",
            Self::MapInsurance => "map/insurance/country/india/state",
            Self::TopTransaction => "top/transaction/country/india/state",
            Self::TopUser => "top/user/country/india/state",
            Self::TopInsurance => "top/insurance/country/india/state",
        }
    }

    #[must_use]
    pub fn schema(self) -> &'static TableSchema {
        match self {
            Self::AggregatedTransaction => &schema::AGGREGATED_TRANSACTION,
            Self::AggregatedUser => &schema::AGGREGATED_USER,
            Self::AggregatedInsurance => &schema::AGGREGATED_INSURANCE,
            Self::MapTransaction => &schema::MAP_TRANSACTION,
            Self::MapUser => &schema::MAP_USER,
            Self::MapInsurance => &schema::MAP_INSURANCE,
            Self::TopTransaction => &schema::TOP_TRANSACTION,
            Self::TopUser => &schema::TOP_USER,
            Self::TopInsurance => &schema::TOP_INSURANCE,
        }
    }

    #[must_use]
    pub const fn rule(self) -> ExtractionRule {
        match self {
            Self::AggregatedTransaction | Self::AggregatedInsurance => {
                ExtractionRule::NamedMetrics {
                    list: "transactionData",
                }
            }
            Self::AggregatedUser => ExtractionRule::DeviceRows {
                list: "usersByDevice",
            },
            Self::MapTransaction => ExtractionRule::DistrictMetrics {
                list: "hoverDataList",
            },
            Self::MapUser => ExtractionRule::DistrictMapping { map: "hoverData" },
            Self::MapInsurance => ExtractionRule::ColumnZip {
                columns: "columns",
                rows: "data",
            },
            Self::TopTransaction => ExtractionRule::RankedEntities {
                list: "districts",
                name_key: "entityName",
                shape: RankedShape::NestedCountAmount,
            },
            Self::TopUser => ExtractionRule::RankedEntities {
                list: "districts",
                name_key: "name",
                shape: RankedShape::FlatEngagement,
            },
            Self::TopInsurance => ExtractionRule::RankedEntities {
                list: "pincodes",
                name_key: "entityName",
                shape: RankedShape::NestedCountAmount,
            },
        }
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Family {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| {
                ValidationError(format!(
                    "unknown family `{s}`; expected one of: {}",
                    Self::ALL.map(Family::as_str).join(", ")
                ))
            })
    }
}
