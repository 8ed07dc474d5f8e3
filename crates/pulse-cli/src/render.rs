// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};

use pulse_query::panel::LabelStyle;
use pulse_query::{
    format_count, format_rupees, Cell, ChartKind, PanelOutcome, PanelResult, PanelSpec,
    ViewResult,
};

const BAR_WIDTH: usize = 40;

pub fn render_view<W: Write>(out: &mut W, view: &ViewResult) -> io::Result<()> {
    let sel = &view.selection;
    writeln!(out, "== {} ==", view.title)?;
    writeln!(
        out,
        "period {} Q{} | range {}..{} | state {}",
        sel.year,
        sel.quarter.get(),
        sel.from_year,
        sel.to_year,
        sel.state.display_name()
    )?;
    for report in &view.panels {
        writeln!(out)?;
        writeln!(out, "-- {} --", report.panel.title)?;
        match &report.outcome {
            PanelOutcome::Empty => writeln!(out, "No data available for the selected period")?,
            PanelOutcome::Failed(message) => {
                writeln!(out, "warning: could not load {}: {message}", report.panel.title)?;
            }
            PanelOutcome::Rows(result) => {
                if result.all_periods {
                    writeln!(out, "(no rows for the selected period, showing all periods)")?;
                }
                render_panel(out, &report.panel, result)?;
            }
        }
    }
    Ok(())
}

fn render_panel<W: Write>(out: &mut W, panel: &PanelSpec, result: &PanelResult) -> io::Result<()> {
    match panel.chart {
        ChartKind::Stats => return render_stats(out, panel, result),
        ChartKind::Bar | ChartKind::Line => render_bars(out, panel, result)?,
        ChartKind::Pie => render_shares(out, panel, result)?,
        ChartKind::Scatter => render_scatter(out, result)?,
    }
    writeln!(out)?;
    render_table(out, panel, result)
}

fn format_cell(panel: &PanelSpec, column: &str, cell: &Cell) -> String {
    match cell {
        Cell::Null => "N/A".to_string(),
        Cell::Text(t) => t.clone(),
        _ if panel.money_columns.contains(&column) => format_rupees(cell.as_f64()),
        Cell::Integer(i) => format_count(*i as f64),
        Cell::Real(r) => format!("{r:.2}"),
    }
}

fn render_stats<W: Write>(out: &mut W, panel: &PanelSpec, result: &PanelResult) -> io::Result<()> {
    let Some(row) = result.rows.first() else {
        return Ok(());
    };
    for (column, cell) in result.columns.iter().zip(row) {
        writeln!(out, "{:<20} {}", column.replace('_', " "), format_cell(panel, column, cell))?;
    }
    Ok(())
}

fn bar(value: f64, max: f64) -> String {
    let len = if max > 0.0 {
        ((value / max) * BAR_WIDTH as f64).round() as usize
    } else {
        0
    };
    "#".repeat(len.min(BAR_WIDTH))
}

fn label_width(result: &PanelResult) -> usize {
    result.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0)
}

fn render_bars<W: Write>(out: &mut W, panel: &PanelSpec, result: &PanelResult) -> io::Result<()> {
    let series = result
        .series(panel.value_column)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    let max = series.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let width = label_width(result);
    for (label, value) in &series {
        let shown = format_cell(panel, panel.value_column, &Cell::Real(*value));
        writeln!(out, "{label:<width$} | {:<bw$} {shown}", bar(*value, max), bw = BAR_WIDTH)?;
    }
    Ok(())
}

fn render_shares<W: Write>(out: &mut W, panel: &PanelSpec, result: &PanelResult) -> io::Result<()> {
    let series = result
        .series(panel.value_column)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    let total: f64 = series.iter().map(|(_, v)| *v).sum();
    let width = label_width(result);
    for (label, value) in &series {
        let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
        writeln!(
            out,
            "{label:<width$} | {:<bw$} {share:5.1}%",
            bar(share, 100.0),
            bw = BAR_WIDTH
        )?;
    }
    Ok(())
}

fn render_scatter<W: Write>(out: &mut W, result: &PanelResult) -> io::Result<()> {
    let users = result.column_index("Total_Users");
    let rate = result.column_index("Engagement_Rate");
    let (Some(users), Some(rate)) = (users, rate) else {
        return Ok(());
    };
    let width = label_width(result);
    for (label, row) in result.labels.iter().zip(&result.rows) {
        writeln!(
            out,
            "{label:<width$} | users {:>15} | opens/user {:>7.2}",
            format_count(row[users].as_f64()),
            row[rate].as_f64()
        )?;
    }
    Ok(())
}

/// Serial-numbered table; the first column shows the display label.
pub fn render_table<W: Write>(out: &mut W, panel: &PanelSpec, result: &PanelResult) -> io::Result<()> {
    let mut header = vec!["#".to_string()];
    header.extend(result.columns.iter().map(|c| c.replace('_', " ")));
    let body: Vec<Vec<String>> = result
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = vec![(idx + 1).to_string()];
            for (col, (name, cell)) in result.columns.iter().zip(row).enumerate() {
                let text = match result.labels.get(idx) {
                    Some(label) if col == 0 && panel.labels == LabelStyle::TitleCase => label.clone(),
                    _ => format_cell(panel, name, cell),
                };
                cells.push(text);
            }
            cells
        })
        .collect();
    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            body.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    writeln!(out, "{}", line(&header))?;
    for row in &body {
        writeln!(out, "{}", line(row))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_query::{PanelReport, Selection, View};

    fn result(labels: &[&str], values: &[f64]) -> PanelResult {
        PanelResult {
            columns: vec!["State".into(), "Total_Count".into(), "Total_Amount".into()],
            rows: labels
                .iter()
                .zip(values)
                .map(|(l, v)| vec![Cell::Text(l.to_string()), Cell::Integer(1200), Cell::Real(*v)])
                .collect(),
            labels: labels.iter().map(|l| pulse_model::title_case_label(l)).collect(),
            all_periods: false,
        }
    }

    fn view_with(outcome: PanelOutcome) -> ViewResult {
        let panel = View::TransactionDynamics.panels()[0];
        ViewResult {
            view: View::TransactionDynamics,
            title: View::TransactionDynamics.title(),
            selection: Selection::from_available(&[]).expect("sel"),
            panels: vec![PanelReport { panel, outcome }],
        }
    }

    fn rendered(view: &ViewResult) -> String {
        let mut buf = Vec::new();
        render_view(&mut buf, view).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn empty_panel_renders_empty_state() {
        let text = rendered(&view_with(PanelOutcome::Empty));
        assert!(text.contains("No data available for the selected period"));
        assert!(text.contains("state Tamil Nadu"));
    }

    #[test]
    fn failed_panel_renders_warning() {
        let text = rendered(&view_with(PanelOutcome::Failed("no such table: x".into())));
        assert!(text.contains("warning: could not load Top States by Transaction Amount"));
    }

    #[test]
    fn rows_render_bars_and_serial_table() {
        let outcome = PanelOutcome::Rows(result(&["tamil-nadu", "goa"], &[2.0e7, 5.0e5]));
        let text = rendered(&view_with(outcome));
        assert!(text.contains("Tamil Nadu | ########################################"));
        assert!(text.contains("₹2.00Cr"));
        assert!(text.contains("1  Tamil Nadu  1,200"));
        assert!(text.contains("2  Goa"));
        assert!(text.contains("₹5.00L"));
    }
}
