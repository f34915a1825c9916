//! Terminal and JSON rendering of a dashboard run

use procpath_core::{Analysis, ChartBar, DashboardError, Notice, Session, TableView, ViewScope};
use serde::Serialize;
use std::fmt::Write as _;

/// Report title
pub const HEADLINE: &str = "Process Path Threat Analysis";

/// What the numbers mean
pub const DESCRIPTION: &str = "Each row is a parent → child process chain. \
The threat score rates how unusual the chain's transitions are; higher is more suspicious.";

/// Widest a table cell or chart label is printed
pub const MAX_CELL_WIDTH: usize = 40;

/// Longest chart bar, in characters
pub const BAR_WIDTH: usize = 30;

/// Everything shown for one upload
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    /// Title
    pub headline: &'static str,
    /// Explanation of the score
    pub description: &'static str,
    /// Raw input, before analysis
    pub preview: TableView,
    /// Ranked results, if they could be built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranked: Option<TableView>,
    /// Top threat scores, if they could be built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Vec<ChartBar>>,
    /// Selectable paths, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    /// Status messages
    pub notices: Vec<Notice>,
}

impl DashboardReport {
    /// Report for a session, whether or not its analysis ran
    #[must_use]
    pub fn new(session: &Session, analysis: Result<&Analysis, &DashboardError>) -> Self {
        let mut report = Self {
            headline: HEADLINE,
            description: DESCRIPTION,
            preview: session.raw_preview(),
            ranked: None,
            chart: None,
            paths: None,
            notices: Vec::new(),
        };

        match analysis {
            Ok(analysis) => {
                report.ranked = analysis.ranked().ok().map(|ranked| ranked.table_view());
                report.chart = analysis.chart().ok().map(<[ChartBar]>::to_vec);
                report.paths = analysis
                    .selector()
                    .ok()
                    .map(|selector| selector.options().to_vec());
                report.notices = analysis.notices();
            }
            Err(err) => report.notices.push(Notice::from_error(err)),
        }
        report
    }

    /// Report for a run with no input at all
    #[must_use]
    pub fn awaiting_input() -> Self {
        Self {
            headline: HEADLINE,
            description: DESCRIPTION,
            preview: TableView::default(),
            ranked: None,
            chart: None,
            paths: None,
            notices: vec![Notice::info(
                ViewScope::Input,
                "no input file given; pass a CSV of process chains to begin",
            )],
        }
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    /// If serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text report
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.headline);
        let _ = writeln!(out, "{}", "=".repeat(self.headline.chars().count()));
        let _ = writeln!(out, "{}", self.description);

        if !self.preview.columns.is_empty() {
            section(&mut out, &view_title("Raw input", &self.preview));
            out.push_str(&format_table(&self.preview));
        }

        if let Some(ranked) = &self.ranked {
            section(&mut out, &view_title("Ranked by threat score", ranked));
            out.push_str(&format_table(ranked));
        }

        if let Some(chart) = &self.chart {
            section(&mut out, &format!("Top {} threat scores", chart.len()));
            out.push_str(&format_chart(chart));
        }

        if let Some(paths) = &self.paths {
            section(&mut out, "Selectable paths");
            for (i, path) in paths.iter().enumerate() {
                let _ = writeln!(out, "{:>4}. {path}", i + 1);
            }
        }

        if !self.notices.is_empty() {
            section(&mut out, "Notices");
            for notice in &self.notices {
                let _ = writeln!(out, "{notice}");
                if let Some(detail) = &notice.detail {
                    let _ = writeln!(out, "      {detail}");
                }
            }
        }
        out
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
}

fn view_title(name: &str, view: &TableView) -> String {
    if view.truncated() > 0 {
        format!("{name} (first {} of {} rows)", view.rows.len(), view.total_rows)
    } else {
        format!("{name} ({} rows)", view.total_rows)
    }
}

/// Shorten `text` to at most `max` characters, marking the cut
#[must_use]
pub fn truncate_cell(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Aligned text table
#[must_use]
pub fn format_table(view: &TableView) -> String {
    let cells: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| row.iter().map(|c| truncate_cell(c, MAX_CELL_WIDTH)).collect())
        .collect();
    let header: Vec<String> = view
        .columns
        .iter()
        .map(|c| truncate_cell(c, MAX_CELL_WIDTH))
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

/// Horizontal bar chart, bars scaled to the largest finite score
#[must_use]
pub fn format_chart(bars: &[ChartBar]) -> String {
    let max = bars
        .iter()
        .map(|bar| bar.threat_score)
        .filter(|score| score.is_finite() && *score > 0.0)
        .fold(0.0_f64, f64::max);
    let label_width = bars
        .iter()
        .map(|bar| truncate_cell(&bar.path, MAX_CELL_WIDTH).chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for bar in bars {
        let len = bar_length(bar.threat_score, max);
        let label = truncate_cell(&bar.path, MAX_CELL_WIDTH);
        let _ = writeln!(
            out,
            "{label:<label_width$}  {:<BAR_WIDTH$}  {}",
            "█".repeat(len),
            bar.threat_score
        );
    }
    out
}

fn bar_length(score: f64, max: f64) -> usize {
    if score == f64::INFINITY {
        BAR_WIDTH
    } else if score <= 0.0 || max <= 0.0 || !score.is_finite() {
        0
    } else {
        // score <= max here, so the product stays within BAR_WIDTH
        ((score / max) * BAR_WIDTH as f64).round() as usize
    }
}
