// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::panel::{
    PanelSpec, DEVICE_BRANDS, DISTRICT_TRANSACTIONS, GEO_BEST_ENGAGEMENT, GEO_TOP_USERS, GEO_USERS,
    HOME_STATS, INSURANCE_BY_STATE, INSURANCE_TYPES, STATE_RANKING, STATE_USERS,
    TOP_USER_DISTRICTS, TRANSACTIONS_BY_STATE, TRANSACTION_TYPES, USER_GROWTH,
};
use crate::{QueryError, QueryErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    Home,
    TransactionDynamics,
    DeviceUser,
    Insurance,
    MarketExpansion,
    UserEngagement,
    GeoAnalysis,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Home,
        View::TransactionDynamics,
        View::DeviceUser,
        View::Insurance,
        View::MarketExpansion,
        View::UserEngagement,
        View::GeoAnalysis,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::TransactionDynamics => "transaction-dynamics",
            Self::DeviceUser => "device-user",
            Self::Insurance => "insurance",
            Self::MarketExpansion => "market-expansion",
            Self::UserEngagement => "user-engagement",
            Self::GeoAnalysis => "geo-analysis",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::TransactionDynamics => "Transaction Dynamics",
            Self::DeviceUser => "Device & User Analysis",
            Self::Insurance => "Insurance Analytics",
            Self::MarketExpansion => "Market Expansion",
            Self::UserEngagement => "User Engagement",
            Self::GeoAnalysis => "Geo Analysis",
        }
    }

    #[must_use]
    pub fn panels(self) -> &'static [PanelSpec] {
        const HOME: &[PanelSpec] = &[HOME_STATS];
        const TRANSACTIONS: &[PanelSpec] = &[TRANSACTIONS_BY_STATE, TRANSACTION_TYPES];
        const DEVICES: &[PanelSpec] = &[DEVICE_BRANDS, STATE_USERS];
        const INSURANCE: &[PanelSpec] = &[INSURANCE_BY_STATE, INSURANCE_TYPES];
        const MARKET: &[PanelSpec] = &[DISTRICT_TRANSACTIONS, TOP_USER_DISTRICTS];
        const ENGAGEMENT: &[PanelSpec] = &[USER_GROWTH, STATE_RANKING];
        const GEO: &[PanelSpec] = &[GEO_USERS, GEO_TOP_USERS, GEO_BEST_ENGAGEMENT];
        match self {
            Self::Home => HOME,
            Self::TransactionDynamics => TRANSACTIONS,
            Self::DeviceUser => DEVICES,
            Self::Insurance => INSURANCE,
            Self::MarketExpansion => MARKET,
            Self::UserEngagement => ENGAGEMENT,
            Self::GeoAnalysis => GEO,
        }
    }
}

impl Display for View {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Lowercases and folds runs of non-alphanumerics into one hyphen, so
/// `Device & User Analysis` and `device_user` compare alike.
fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

impl FromStr for View {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|v| v.slug() == wanted || normalize(v.title()) == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|v| v.slug()).collect();
                QueryError::new(
                    QueryErrorCode::Validation,
                    format!("unknown view `{s}` (expected one of: {})", names.join(", ")),
                )
            })
    }
}
