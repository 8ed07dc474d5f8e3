// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Stats,
    Bar,
    Pie,
    Line,
    Scatter,
}

/// Row predicates. Every user-supplied value is bound, never spliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// `Year = ? AND Quarter = ?`
    Period,
    /// `State = ?`
    State,
    /// `Year BETWEEN ? AND ?`
    YearRange,
    /// `<column> > 0`
    Positive(&'static str),
    /// `<column> IS NOT NULL`
    NotNull(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Measure {
    pub expr: &'static str,
    pub alias: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTerm {
    pub column: &'static str,
    pub descending: bool,
}

/// How each result row is named on charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// No label column.
    None,
    /// First column, hyphens to spaces, title case.
    TitleCase,
    /// `Year` and `Quarter` columns as `2022-Q3`.
    Period,
}

/// `alias = numerator / denominator`, 0 when the denominator is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedRatio {
    pub alias: &'static str,
    pub numerator: &'static str,
    pub denominator: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub table: &'static str,
    pub group_by: &'static [&'static str],
    pub measures: &'static [Measure],
    pub filters: &'static [Filter],
    pub order: &'static [OrderTerm],
    pub limit: Option<u32>,
    pub chart: ChartKind,
    pub labels: LabelStyle,
    /// Column charted against the labels.
    pub value_column: &'static str,
    /// Formatted as rupees in tables.
    pub money_columns: &'static [&'static str],
    pub derived: Option<DerivedRatio>,
    /// Re-run without the period filter when the selected period is empty.
    pub fallback_all_periods: bool,
}

const fn desc(column: &'static str) -> OrderTerm {
    OrderTerm {
        column,
        descending: true,
    }
}

const fn asc(column: &'static str) -> OrderTerm {
    OrderTerm {
        column,
        descending: false,
    }
}

const fn measure(expr: &'static str, alias: &'static str) -> Measure {
    Measure { expr, alias }
}

const ENGAGEMENT_RATE: DerivedRatio = DerivedRatio {
    alias: "Engagement_Rate",
    numerator: "Total_Opens",
    denominator: "Total_Users",
};

pub const HOME_STATS: PanelSpec = PanelSpec {
    id: "quick-stats",
    title: "Quick Stats",
    table: "aggregated_transaction",
    group_by: &[],
    measures: &[
        measure("COUNT(DISTINCT State)", "Total_States"),
        measure("SUM(Transacion_count)", "Total_Transactions"),
        measure("SUM(Transacion_amount)", "Total_Amount"),
    ],
    filters: &[],
    order: &[],
    limit: None,
    chart: ChartKind::Stats,
    labels: LabelStyle::None,
    value_column: "Total_Amount",
    money_columns: &["Total_Amount"],
    derived: None,
    fallback_all_periods: false,
};

pub const TRANSACTIONS_BY_STATE: PanelSpec = PanelSpec {
    id: "amount-by-state",
    title: "Top States by Transaction Amount",
    table: "aggregated_transaction",
    group_by: &["State"],
    measures: &[
        measure("SUM(Transacion_count)", "Total_Count"),
        measure("SUM(Transacion_amount)", "Total_Amount"),
    ],
    filters: &[Filter::Period],
    order: &[desc("Total_Amount")],
    limit: Some(10),
    chart: ChartKind::Bar,
    labels: LabelStyle::TitleCase,
    value_column: "Total_Amount",
    money_columns: &["Total_Amount"],
    derived: None,
    fallback_all_periods: false,
};

pub const TRANSACTION_TYPES: PanelSpec = PanelSpec {
    id: "type-distribution",
    title: "Transaction Type Distribution",
    table: "aggregated_transaction",
    group_by: &["Transacion_type"],
    measures: &[
        measure("SUM(Transacion_count)", "Count"),
        measure("SUM(Transacion_amount)", "Amount"),
    ],
    filters: &[Filter::Period],
    order: &[desc("Amount")],
    limit: None,
    chart: ChartKind::Pie,
    labels: LabelStyle::TitleCase,
    value_column: "Amount",
    money_columns: &["Amount"],
    derived: None,
    fallback_all_periods: false,
};

pub const DEVICE_BRANDS: PanelSpec = PanelSpec {
    id: "top-brands",
    title: "Top Device Brands",
    table: "aggregated_user",
    group_by: &["Device_Brand"],
    measures: &[
        measure("SUM(User_Count)", "Total_Users"),
        measure("AVG(User_Percentage)", "Avg_Percentage"),
    ],
    filters: &[
        Filter::Period,
        Filter::NotNull("Device_Brand"),
        Filter::Positive("User_Count"),
    ],
    order: &[desc("Total_Users")],
    limit: Some(10),
    chart: ChartKind::Bar,
    labels: LabelStyle::TitleCase,
    value_column: "Total_Users",
    money_columns: &[],
    derived: None,
    fallback_all_periods: true,
};

pub const STATE_USERS: PanelSpec = PanelSpec {
    id: "state-engagement",
    title: "Registered Users by State",
    table: "map_user",
    group_by: &["State"],
    measures: &[
        measure("SUM(RegisteredUsers)", "Total_Users"),
        measure("SUM(AppOpens)", "Total_Opens"),
    ],
    filters: &[Filter::Period, Filter::Positive("RegisteredUsers")],
    order: &[desc("Total_Users")],
    limit: Some(15),
    chart: ChartKind::Bar,
    labels: LabelStyle::TitleCase,
    value_column: "Total_Users",
    money_columns: &[],
    derived: Some(ENGAGEMENT_RATE),
    fallback_all_periods: false,
};

pub const INSURANCE_BY_STATE: PanelSpec = PanelSpec {
    id: "insurance-by-state",
    title: "Insurance Amount by State",
    table: "aggregated_insurance",
    group_by: &["State"],
    measures: &[
        measure("SUM(Insurance_count)", "Total_Count"),
        measure("SUM(Insurance_amount)", "Total_Amount"),
    ],
    filters: &[
        Filter::Period,
        Filter::Positive("Insurance_count"),
        Filter::Positive("Insurance_amount"),
    ],
    order: &[desc("Total_Amount")],
    limit: Some(15),
    chart: ChartKind::Bar,
    labels: LabelStyle::TitleCase,
    value_column: "Total_Amount",
    money_columns: &["Total_Amount"],
    derived: None,
    fallback_all_periods: false,
};

pub const INSURANCE_TYPES: PanelSpec = PanelSpec {
    id: "insurance-by-type",
    title: "Insurance Type Distribution",
    table: "aggregated_insurance",
    group_by: &["Insurance_type"],
    measures: &[
        measure("SUM(Insurance_count)", "Count"),
        measure("SUM(Insurance_amount)", "Amount"),
    ],
    filters: &[
        Filter::Period,
        Filter::Positive("Insurance_count"),
        Filter::Positive("Insurance_amount"),
    ],
    order: &[desc("Amount")],
    limit: None,
    chart: ChartKind::Pie,
    labels: LabelStyle::TitleCase,
    value_column: "Amount",
    money_columns: &["Amount"],
    derived: None,
    fallback_all_periods: false,
};

pub const DISTRICT_TRANSACTIONS: PanelSpec = PanelSpec {
    id: "district-transactions",
    title: "District-wise Transactions",
    table: "map_transaction",
    group_by: &["District"],
    measures: &[
        measure("SUM(Transaction_count)", "Total_Count"),
        measure("SUM(Transaction_amount)", "Total_Amount"),
    ],
    filters: &[
        Filter::State,
        Filter::Period,
        Filter::Positive("Transaction_count"),
        Filter::Positive("Transaction_amount"),
    ],
    order: &[desc("Total_Amount")],
    limit: Some(15),
    chart: ChartKind::Bar,
    labels: LabelStyle::TitleCase,
    value_column: "Total_Amount",
    money_columns: &["Total_Amount"],
    derived: None,
    fallback_all_periods: false,
};

pub const TOP_USER_DISTRICTS: PanelSpec = PanelSpec {
    id: "top-user-districts",
    title: "Top Districts by Registered Users",
    table: "top_user",
    group_by: &["District"],
    measures: &[measure("SUM(Registered_users)", "Total_Users")],
    filters: &[
        Filter::State,
        Filter::Period,
        Filter::Positive("Registered_users"),
    ],
    order: &[desc("Total_Users")],
    limit: Some(10),
    chart: ChartKind::Bar,
    labels: LabelStyle::TitleCase,
    value_column: "Total_Users",
    money_columns: &[],
    derived: None,
    fallback_all_periods: false,
};

pub const USER_GROWTH: PanelSpec = PanelSpec {
    id: "growth-trend",
    title: "User Growth and Engagement Trend",
    table: "map_user",
    group_by: &["Year", "Quarter"],
    measures: &[
        measure("SUM(RegisteredUsers)", "Total_Users"),
        measure("SUM(AppOpens)", "Total_Opens"),
    ],
    filters: &[Filter::YearRange, Filter::Positive("RegisteredUsers")],
    order: &[asc("Year"), asc("Quarter")],
    limit: None,
    chart: ChartKind::Line,
    labels: LabelStyle::Period,
    value_column: "Total_Users",
    money_columns: &[],
    derived: Some(ENGAGEMENT_RATE),
    fallback_all_periods: false,
};

pub const STATE_RANKING: PanelSpec = PanelSpec {
    id: "state-ranking",
    title: "State Engagement Ranking",
    ..STATE_USERS
};

pub const GEO_USERS: PanelSpec = PanelSpec {
    id: "user-distribution",
    title: "Geographic User Distribution",
    limit: None,
    chart: ChartKind::Scatter,
    ..STATE_USERS
};

pub const GEO_TOP_USERS: PanelSpec = PanelSpec {
    id: "highest-user-states",
    title: "Highest User States",
    limit: Some(10),
    ..STATE_USERS
};

/// Ordered in SQL by the ratio `ENGAGEMENT_RATE` derives; the
/// `RegisteredUsers > 0` filter keeps the denominator positive.
pub const GEO_BEST_ENGAGEMENT: PanelSpec = PanelSpec {
    id: "best-engagement-states",
    title: "Best Engagement States",
    order: &[desc("CAST(SUM(AppOpens) AS REAL) / SUM(RegisteredUsers)")],
    limit: Some(10),
    value_column: "Engagement_Rate",
    ..STATE_USERS
};

impl PanelSpec {
    /// Result column names in select order, derived column last.
    #[must_use]
    pub fn output_columns(&self) -> Vec<&'static str> {
        let mut cols: Vec<&'static str> = self.group_by.to_vec();
        cols.extend(self.measures.iter().map(|m| m.alias));
        if let Some(derived) = self.derived {
            cols.push(derived.alias);
        }
        cols
    }

    #[must_use]
    pub fn uses_state(&self) -> bool {
        self.filters.contains(&Filter::State)
    }
}
