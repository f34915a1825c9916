//! Result ranking
//!
//! One stable descending sort by `threat_score`; the table and the chart are
//! two prefixes of that same order.

use crate::error::{DashboardError, ViewScope};
use crate::results::{
    table_view, AnalysisResultRow, ResultSchema, ResultSet, PATH_COLUMN, THREAT_SCORE_COLUMN,
};
use crate::table::TableView;
use serde::Serialize;
use std::cmp::Ordering;

/// Rows shown in the ranked table
pub const TABLE_LIMIT: usize = 50;

/// Bars shown in the threat score chart
pub const CHART_LIMIT: usize = 15;

/// Orders results by threat score and bounds the views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRanker {
    table_limit: usize,
    chart_limit: usize,
}

impl Default for ResultRanker {
    fn default() -> Self {
        Self::new(TABLE_LIMIT, CHART_LIMIT)
    }
}

impl ResultRanker {
    /// Create a ranker with explicit view bounds
    #[must_use]
    pub fn new(table_limit: usize, chart_limit: usize) -> Self {
        Self {
            table_limit,
            chart_limit,
        }
    }

    /// Sort `results` by descending score, ties in input order
    ///
    /// # Errors
    /// [`DashboardError::MissingField`] when there is no `threat_score`
    /// column.
    pub fn rank(&self, results: &ResultSet) -> Result<RankedResults, DashboardError> {
        results.require(THREAT_SCORE_COLUMN, ViewScope::RankedTable)?;

        let mut rows = results.rows().to_vec();
        // Vec::sort_by is stable; NaN never gets past the pipeline boundary
        rows.sort_by(|a, b| {
            let a = a.threat_score.unwrap_or(f64::NEG_INFINITY);
            let b = b.threat_score.unwrap_or(f64::NEG_INFINITY);
            b.partial_cmp(&a).unwrap_or(Ordering::Equal)
        });

        tracing::debug!(rows = rows.len(), "results ranked");

        Ok(RankedResults {
            schema: results.schema().clone(),
            rows,
            table_limit: self.table_limit,
            chart_limit: self.chart_limit,
        })
    }
}

/// One bar of the threat score chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    /// Chain the bar is keyed by
    pub path: String,
    /// Bar height
    pub threat_score: f64,
}

/// Results in ranked order
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResults {
    schema: ResultSchema,
    rows: Vec<AnalysisResultRow>,
    table_limit: usize,
    chart_limit: usize,
}

impl RankedResults {
    /// Every row, highest score first
    #[inline]
    #[must_use]
    pub fn ordered(&self) -> &[AnalysisResultRow] {
        &self.rows
    }

    /// Rows that make up the table view
    #[must_use]
    pub fn table_rows(&self) -> &[AnalysisResultRow] {
        &self.rows[..self.rows.len().min(self.table_limit)]
    }

    /// Ranked table, bounded to the table limit
    #[must_use]
    pub fn table_view(&self) -> TableView {
        table_view(&self.schema, self.table_rows().iter(), self.rows.len())
    }

    /// Top bars keyed by path, bounded to the chart limit
    ///
    /// # Errors
    /// [`DashboardError::MissingField`] when there is no `path` column.
    pub fn chart_view(&self) -> Result<Vec<ChartBar>, DashboardError> {
        if !self.schema.has_path {
            return Err(DashboardError::MissingField {
                field: PATH_COLUMN,
                view: ViewScope::Chart,
            });
        }

        Ok(self
            .rows
            .iter()
            .take(self.chart_limit)
            .filter_map(|row| {
                Some(ChartBar {
                    path: row.path.clone()?,
                    threat_score: row.threat_score?,
                })
            })
            .collect())
    }

    /// Path of the row at zero-based rank `rank`
    ///
    /// # Errors
    /// [`DashboardError::NotFound`] past the end or without a path column.
    pub fn path_at(&self, rank: usize) -> Result<&str, DashboardError> {
        self.rows
            .get(rank)
            .and_then(|row| row.path.as_deref())
            .ok_or_else(|| DashboardError::not_found(format!("path at rank {}", rank + 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RecordTable;

    fn results(csv: &str) -> ResultSet {
        ResultSet::from_table(&RecordTable::read_csv(csv.as_bytes()).unwrap()).unwrap()
    }

    fn paths(rows: &[AnalysisResultRow]) -> Vec<&str> {
        rows.iter().filter_map(|r| r.path.as_deref()).collect()
    }

    #[test]
    fn sorts_descending() {
        let ranked = ResultRanker::default()
            .rank(&results("path,threat_score\nlow,0.1\nhigh,0.9\nmid,0.5\n"))
            .unwrap();
        assert_eq!(paths(ranked.ordered()), vec!["high", "mid", "low"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = ResultRanker::default()
            .rank(&results(
                "path,threat_score\nfirst,1\nsecond,1\ntop,2\nthird,1\n",
            ))
            .unwrap();
        assert_eq!(
            paths(ranked.ordered()),
            vec!["top", "first", "second", "third"]
        );
    }

    #[test]
    fn negative_and_infinite_scores() {
        let ranked = ResultRanker::default()
            .rank(&results(
                "path,threat_score\na,-3\nb,inf\nc,-inf\nd,0\n",
            ))
            .unwrap();
        assert_eq!(paths(ranked.ordered()), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn missing_score_column() {
        let result = ResultRanker::default().rank(&results("path\nA\n"));
        assert!(matches!(
            result,
            Err(DashboardError::MissingField {
                field: "threat_score",
                view: ViewScope::RankedTable
            })
        ));
    }

    #[test]
    fn chart_needs_path_but_table_does_not() {
        let ranked = ResultRanker::default()
            .rank(&results("threat_score,user\n1,root\n2,alice\n"))
            .unwrap();
        let table = ranked.table_view();
        assert_eq!(table.rows[0], vec!["2", "alice"]);
        assert!(matches!(
            ranked.chart_view(),
            Err(DashboardError::MissingField {
                field: "path",
                view: ViewScope::Chart
            })
        ));
    }

    #[test]
    fn views_are_bounded() {
        let mut csv = String::from("path,threat_score\n");
        for i in 0..80 {
            csv.push_str(&format!("p{i},{i}\n"));
        }
        let ranked = ResultRanker::default().rank(&results(&csv)).unwrap();
        assert_eq!(ranked.table_view().rows.len(), TABLE_LIMIT);
        assert_eq!(ranked.table_view().total_rows, 80);
        let chart = ranked.chart_view().unwrap();
        assert_eq!(chart.len(), CHART_LIMIT);
        assert_eq!(chart[0].path, "p79");
        assert_eq!(chart[14].path, "p65");
    }

    #[test]
    fn path_at_rank() {
        let ranked = ResultRanker::default()
            .rank(&results("path,threat_score\nA,1\nB,2\n"))
            .unwrap();
        assert_eq!(ranked.path_at(0).unwrap(), "B");
        assert!(matches!(
            ranked.path_at(5),
            Err(DashboardError::NotFound { .. })
        ));
    }
}
