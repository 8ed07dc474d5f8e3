// SPDX-License-Identifier: Apache-2.0

use rusqlite::types::Value;

use crate::panel::{Filter, PanelSpec};
use crate::selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodScope {
    /// Honour the `Period` filter.
    Selected,
    /// Drop the `Period` filter.
    AllPeriods,
}

pub fn build_panel_sql(panel: &PanelSpec, selection: &Selection) -> (String, Vec<Value>) {
    build_panel_sql_scoped(panel, selection, PeriodScope::Selected)
}

/// Renders the panel's aggregate query. Identifiers come from the static
/// panel catalogue; selection values are always bound.
pub fn build_panel_sql_scoped(
    panel: &PanelSpec,
    selection: &Selection,
    scope: PeriodScope,
) -> (String, Vec<Value>) {
    let mut select: Vec<String> = panel.group_by.iter().map(|c| (*c).to_string()).collect();
    select.extend(
        panel
            .measures
            .iter()
            .map(|m| format!("{} AS {}", m.expr, m.alias)),
    );
    let mut sql = format!("SELECT {} FROM {}", select.join(", "), panel.table);

    let mut where_parts: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    for filter in panel.filters {
        match *filter {
            Filter::Period => {
                if scope == PeriodScope::Selected {
                    where_parts.push("Year = ?".to_string());
                    params.push(Value::Text(selection.year.as_str().to_string()));
                    where_parts.push("Quarter = ?".to_string());
                    params.push(Value::Integer(i64::from(selection.quarter.get())));
                }
            }
            Filter::State => {
                where_parts.push("State = ?".to_string());
                params.push(Value::Text(selection.state.as_str().to_string()));
            }
            Filter::YearRange => {
                where_parts.push("Year BETWEEN ? AND ?".to_string());
                params.push(Value::Text(selection.from_year.as_str().to_string()));
                params.push(Value::Text(selection.to_year.as_str().to_string()));
            }
            Filter::Positive(column) => where_parts.push(format!("{column} > 0")),
            Filter::NotNull(column) => where_parts.push(format!("{column} IS NOT NULL")),
        }
    }
    if !where_parts.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&where_parts.join(" AND "));
    }
    if !panel.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&panel.group_by.join(", "));
    }
    if !panel.order.is_empty() {
        let terms: Vec<String> = panel
            .order
            .iter()
            .map(|o| format!("{} {}", o.column, if o.descending { "DESC" } else { "ASC" }))
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&terms.join(", "));
    }
    if let Some(limit) = panel.limit {
        sql.push_str(" LIMIT ?");
        params.push(Value::Integer(i64::from(limit)));
    }
    (sql, params)
}
