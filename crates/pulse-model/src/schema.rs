// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::record::MetricsKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Integer,
    Real,
}

impl ColumnType {
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

impl Column {
    #[must_use]
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty }
    }
}

pub const STATE_COLUMN: &str = "State";
pub const YEAR_COLUMN: &str = "Year";
pub const QUARTER_COLUMN: &str = "Quarter";

pub const KEY_COLUMNS: [Column; 3] = [
    Column::new(STATE_COLUMN, ColumnType::Text),
    Column::new(YEAR_COLUMN, ColumnType::Text),
    Column::new(QUARTER_COLUMN, ColumnType::Integer),
];

/// One table per family: the three key columns, a label column and the
/// metric columns in the order `Metrics::values` yields them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: &'static str,
    pub label: Column,
    pub metrics: &'static [Column],
    pub metrics_kind: MetricsKind,
    /// Integer column summed when verifying a load against its source.
    pub count_column: &'static str,
}

impl TableSchema {
    #[must_use]
    pub fn columns(&self) -> Vec<Column> {
        let mut cols = KEY_COLUMNS.to_vec();
        cols.push(self.label);
        cols.extend_from_slice(self.metrics);
        cols
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.name).collect()
    }

    #[must_use]
    pub fn create_table_sql(&self) -> String {
        let body = self
            .columns()
            .iter()
            .map(|c| {
                let not_null = if KEY_COLUMNS.iter().any(|k| k.name == c.name) || *c == self.label
                {
                    " NOT NULL"
                } else {
                    ""
                };
                format!("  {} {}{}", c.name, c.ty.sql(), not_null)
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n)", self.name, body)
    }

    #[must_use]
    pub fn create_index_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{name}_period ON {name}({YEAR_COLUMN}, {QUARTER_COLUMN}, {STATE_COLUMN})",
            name = self.name
        )
    }

    #[must_use]
    pub fn insert_sql(&self) -> String {
        let names = self.column_names();
        let placeholders = (1..=names.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            names.join(", "),
            placeholders
        )
    }
}

pub static AGGREGATED_TRANSACTION: TableSchema = TableSchema {
    name: "aggregated_transaction",
    label: Column::new("Transacion_type", ColumnType::Text),
    metrics: &[
        Column::new("Transacion_count", ColumnType::Integer),
        Column::new("Transacion_amount", ColumnType::Real),
    ],
    metrics_kind: MetricsKind::CountAmount,
    count_column: "Transacion_count",
};

pub static AGGREGATED_USER: TableSchema = TableSchema {
    name: "aggregated_user",
    label: Column::new("Device_Brand", ColumnType::Text),
    metrics: &[
        Column::new("User_Count", ColumnType::Integer),
        Column::new("User_Percentage", ColumnType::Real),
    ],
    metrics_kind: MetricsKind::DeviceShare,
    count_column: "User_Count",
};

pub static AGGREGATED_INSURANCE: TableSchema = TableSchema {
    name: "aggregated_insurance",
    label: Column::new("Insurance_type", ColumnType::Text),
    metrics: &[
        Column::new("Insurance_count", ColumnType::Integer),
        Column::new("Insurance_amount", ColumnType::Real),
    ],
    metrics_kind: MetricsKind::CountAmount,
    count_column: "Insurance_count",
};

pub static MAP_TRANSACTION: TableSchema = TableSchema {
    name: "map_transaction",
    label: Column::new("District", ColumnType::Text),
    metrics: &[
        Column::new("Transaction_count", ColumnType::Integer),
        Column::new("Transaction_amount", ColumnType::Real),
    ],
    metrics_kind: MetricsKind::CountAmount,
    count_column: "Transaction_count",
};

pub static MAP_USER: TableSchema = TableSchema {
    name: "map_user",
    label: Column::new("District", ColumnType::Text),
    metrics: &[
        Column::new("RegisteredUsers", ColumnType::Integer),
        Column::new("AppOpens", ColumnType::Integer),
    ],
    metrics_kind: MetricsKind::Engagement,
    count_column: "RegisteredUsers",
};

pub static MAP_INSURANCE: TableSchema = TableSchema {
    name: "map_insurance",
    label: Column::new("District", ColumnType::Text),
    metrics: &[
        Column::new("Latitude", ColumnType::Real),
        Column::new("Longitude", ColumnType::Real),
        Column::new("Insurance_Count", ColumnType::Integer),
    ],
    metrics_kind: MetricsKind::GeoCount,
    count_column: "Insurance_Count",
};

pub static TOP_TRANSACTION: TableSchema = TableSchema {
    name: "top_transaction",
    label: Column::new("District", ColumnType::Text),
    metrics: &[
        Column::new("Transaction_count", ColumnType::Integer),
        Column::new("Transaction_amount", ColumnType::Real),
    ],
    metrics_kind: MetricsKind::CountAmount,
    count_column: "Transaction_count",
};

pub static TOP_USER: TableSchema = TableSchema {
    name: "top_user",
    label: Column::new("District", ColumnType::Text),
    metrics: &[
        Column::new("Registered_users", ColumnType::Integer),
        Column::new("App_opens", ColumnType::Integer),
    ],
    metrics_kind: MetricsKind::Engagement,
    count_column: "Registered_users",
};

pub static TOP_INSURANCE: TableSchema = TableSchema {
    name: "top_insurance",
    label: Column::new("Pincode", ColumnType::Text),
    metrics: &[
        Column::new("Count", ColumnType::Integer),
        Column::new("Amount", ColumnType::Real),
    ],
    metrics_kind: MetricsKind::CountAmount,
    count_column: "Count",
};
