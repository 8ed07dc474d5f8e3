// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};

use pulse_model::title_case_label;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;

use crate::panel::{DerivedRatio, LabelStyle, PanelSpec};
use crate::selection::Selection;
use crate::sql::{build_panel_sql_scoped, PeriodScope};
use crate::view::View;
use crate::{QueryError, QueryErrorCode};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// Numeric value for charting; null and non-numeric text read as 0.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Integer(i) => *i as f64,
            Self::Real(r) => *r,
            Self::Text(t) => t.trim().parse().unwrap_or(0.0),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn from_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(r) => Self::Real(r),
            ValueRef::Text(t) | ValueRef::Blob(t) => Self::Text(String::from_utf8_lossy(t).into_owned()),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("N/A"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r:.2}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Display label per row, empty for label-less panels.
    pub labels: Vec<String>,
    /// Set when the selected period was empty and all periods were used.
    pub all_periods: bool,
}

impl PanelResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// `(label, value)` pairs for one numeric column.
    pub fn series(&self, value_column: &str) -> Result<Vec<(String, f64)>, QueryError> {
        let idx = self.column_index(value_column).ok_or_else(|| {
            QueryError::new(
                QueryErrorCode::Validation,
                format!("panel has no column `{value_column}`"),
            )
        })?;
        Ok(self
            .labels
            .iter()
            .zip(&self.rows)
            .map(|(label, row)| (label.clone(), row.get(idx).map_or(0.0, Cell::as_f64)))
            .collect())
    }

    fn append_ratio(&mut self, ratio: DerivedRatio) -> Result<(), QueryError> {
        let missing = |name: &str| {
            QueryError::new(
                QueryErrorCode::Validation,
                format!("derived column needs `{name}`"),
            )
        };
        let num = self
            .column_index(ratio.numerator)
            .ok_or_else(|| missing(ratio.numerator))?;
        let den = self
            .column_index(ratio.denominator)
            .ok_or_else(|| missing(ratio.denominator))?;
        for row in &mut self.rows {
            let rate = engagement_rate(row[num].as_f64(), row[den].as_f64());
            row.push(Cell::Real(rate));
        }
        self.columns.push(ratio.alias.to_string());
        Ok(())
    }

    fn fill_labels(&mut self, style: LabelStyle) {
        self.labels = match style {
            LabelStyle::None => Vec::new(),
            LabelStyle::TitleCase => self
                .rows
                .iter()
                .map(|row| title_case_label(&row.first().map(ToString::to_string).unwrap_or_default()))
                .collect(),
            LabelStyle::Period => {
                let year = self.column_index("Year");
                let quarter = self.column_index("Quarter");
                self.rows
                    .iter()
                    .map(|row| {
                        let cell = |idx: Option<usize>| {
                            idx.and_then(|i| row.get(i)).map(ToString::to_string).unwrap_or_default()
                        };
                        format!("{}-Q{}", cell(year), cell(quarter))
                    })
                    .collect()
            }
        };
    }
}

/// Opens per user; 0 when there are no users.
#[must_use]
pub fn engagement_rate(app_opens: f64, registered_users: f64) -> f64 {
    if registered_users > 0.0 {
        app_opens / registered_users
    } else {
        0.0
    }
}

fn query_rows(
    conn: &Connection,
    panel: &PanelSpec,
    selection: &Selection,
    scope: PeriodScope,
) -> Result<PanelResult, QueryError> {
    let (sql, params) = build_panel_sql_scoped(panel, selection, scope);
    tracing::debug!(panel = panel.id, %sql, "running panel query");
    let mut stmt = conn.prepare_cached(&sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| (*c).to_string()).collect();
    let width = columns.len();
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            (0..width)
                .map(|i| row.get_ref(i).map(Cell::from_ref))
                .collect::<Result<Vec<_>, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PanelResult {
        columns,
        rows,
        labels: Vec::new(),
        all_periods: scope == PeriodScope::AllPeriods,
    })
}

pub fn run_panel(
    conn: &Connection,
    panel: &PanelSpec,
    selection: &Selection,
) -> Result<PanelResult, QueryError> {
    let mut result = query_rows(conn, panel, selection, PeriodScope::Selected)?;
    if result.is_empty() && panel.fallback_all_periods {
        tracing::info!(panel = panel.id, "selected period empty, using all periods");
        result = query_rows(conn, panel, selection, PeriodScope::AllPeriods)?;
    }
    if let Some(ratio) = panel.derived {
        result.append_ratio(ratio)?;
    }
    result.fill_labels(panel.labels);
    Ok(result)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum PanelOutcome {
    Rows(PanelResult),
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelReport {
    pub panel: PanelSpec,
    pub outcome: PanelOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResult {
    pub view: View,
    pub title: &'static str,
    pub selection: Selection,
    pub panels: Vec<PanelReport>,
}

impl ViewResult {
    #[must_use]
    pub fn failed_panels(&self) -> usize {
        self.panels
            .iter()
            .filter(|p| matches!(p.outcome, PanelOutcome::Failed(_)))
            .count()
    }
}

/// Runs every panel of a view. A failing panel becomes `Failed` and the
/// rest still run.
#[must_use]
pub fn run_view(conn: &Connection, view: View, selection: &Selection) -> ViewResult {
    let panels = view
        .panels()
        .iter()
        .map(|panel| {
            let outcome = match run_panel(conn, panel, selection) {
                Ok(result) if result.is_empty() => PanelOutcome::Empty,
                Ok(result) => PanelOutcome::Rows(result),
                Err(err) => {
                    tracing::warn!(panel = panel.id, error = %err, "panel query failed");
                    PanelOutcome::Failed(err.message)
                }
            };
            PanelReport {
                panel: *panel,
                outcome,
            }
        })
        .collect();
    ViewResult {
        view,
        title: view.title(),
        selection: selection.clone(),
        panels,
    }
}
