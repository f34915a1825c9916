//! Typed analysis results
//!
//! The scoring pipeline hands back a loosely shaped table. [`ResultSet`]
//! types it once: `path` and `threat_score` become real fields, everything
//! else rides along untouched.

use crate::error::{DashboardError, ViewScope};
use crate::table::{RecordTable, TableView};
use indexmap::IndexMap;
use serde::Serialize;

/// Column holding the delimited process chain
pub const PATH_COLUMN: &str = "path";

/// Column holding the pipeline's score
pub const THREAT_SCORE_COLUMN: &str = "threat_score";

/// Why a pipeline result table is unusable
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResultShapeError {
    /// Score cell is not a number
    #[error("row {row}: threat_score {value:?} is not a number")]
    UnparsableScore {
        /// Zero-based row
        row: usize,
        /// Cell text
        value: String,
    },

    /// Score cell parsed to NaN
    #[error("row {row}: threat_score is NaN")]
    NanScore {
        /// Zero-based row
        row: usize,
    },

    /// Path cell is blank
    #[error("row {row}: path is empty")]
    EmptyPath {
        /// Zero-based row
        row: usize,
    },
}

/// One scored process chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResultRow {
    /// Delimited chain; `None` only when the results have no path column
    pub path: Option<String>,
    /// Score, higher is more suspicious; `None` only when the results have
    /// no score column
    pub threat_score: Option<f64>,
    /// Pass-through columns, in result order
    pub fields: IndexMap<String, String>,
}

/// Which typed columns the results carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSchema {
    /// All columns in pipeline output order
    pub columns: Vec<String>,
    /// A `path` column is present
    pub has_path: bool,
    /// A `threat_score` column is present
    pub has_threat_score: bool,
}

/// Analysis results for one upload, in pipeline output order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    schema: ResultSchema,
    rows: Vec<AnalysisResultRow>,
}

impl ResultSet {
    /// Type a pipeline output table
    ///
    /// Absent columns are allowed here; present ones must hold usable
    /// values in every row.
    ///
    /// # Errors
    /// [`ResultShapeError`] for the first unusable cell.
    pub fn from_table(table: &RecordTable) -> Result<Self, ResultShapeError> {
        let path_idx = table.column_index(PATH_COLUMN);
        let score_idx = table.column_index(THREAT_SCORE_COLUMN);

        let mut rows = Vec::with_capacity(table.len());
        for (row, cells) in table.rows().iter().enumerate() {
            let path = match path_idx {
                Some(idx) => {
                    let value = &cells[idx];
                    if value.trim().is_empty() {
                        return Err(ResultShapeError::EmptyPath { row });
                    }
                    Some(value.clone())
                }
                None => None,
            };

            let threat_score = match score_idx {
                Some(idx) => Some(parse_score(row, &cells[idx])?),
                None => None,
            };

            let fields = table
                .columns()
                .iter()
                .zip(cells)
                .enumerate()
                .filter(|(i, _)| Some(*i) != path_idx && Some(*i) != score_idx)
                .map(|(_, (name, value))| (name.clone(), value.clone()))
                .collect();

            rows.push(AnalysisResultRow {
                path,
                threat_score,
                fields,
            });
        }

        Ok(Self {
            schema: ResultSchema {
                columns: table.columns().to_vec(),
                has_path: path_idx.is_some(),
                has_threat_score: score_idx.is_some(),
            },
            rows,
        })
    }

    /// Column information
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &ResultSchema {
        &self.schema
    }

    /// Rows in pipeline output order
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[AnalysisResultRow] {
        &self.rows
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the pipeline returned no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fail with [`DashboardError::MissingField`] unless `field` is present
    ///
    /// # Errors
    /// When the column is absent.
    pub fn require(&self, field: &'static str, view: ViewScope) -> Result<(), DashboardError> {
        let present = match field {
            PATH_COLUMN => self.schema.has_path,
            THREAT_SCORE_COLUMN => self.schema.has_threat_score,
            other => self.schema.columns.iter().any(|c| c == other),
        };
        if present {
            Ok(())
        } else {
            Err(DashboardError::MissingField { field, view })
        }
    }

    /// First `n` rows, unranked, as a view
    #[must_use]
    pub fn head(&self, n: usize) -> TableView {
        table_view(&self.schema, self.rows.iter().take(n), self.rows.len())
    }
}

fn parse_score(row: usize, cell: &str) -> Result<f64, ResultShapeError> {
    let value: f64 = cell
        .trim()
        .parse()
        .map_err(|_| ResultShapeError::UnparsableScore {
            row,
            value: cell.to_string(),
        })?;
    if value.is_nan() {
        return Err(ResultShapeError::NanScore { row });
    }
    Ok(value)
}

/// Lay rows back out in schema column order
pub(crate) fn table_view<'a>(
    schema: &ResultSchema,
    rows: impl Iterator<Item = &'a AnalysisResultRow>,
    total_rows: usize,
) -> TableView {
    let rows = rows
        .map(|row| {
            schema
                .columns
                .iter()
                .map(|column| match column.as_str() {
                    PATH_COLUMN => row.path.clone().unwrap_or_default(),
                    THREAT_SCORE_COLUMN => row
                        .threat_score
                        .map(|score| score.to_string())
                        .unwrap_or_default(),
                    other => row.fields.get(other).cloned().unwrap_or_default(),
                })
                .collect()
        })
        .collect();

    TableView {
        columns: schema.columns.clone(),
        rows,
        total_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> RecordTable {
        RecordTable::read_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn types_path_and_score() {
        let results = ResultSet::from_table(&table(
            "path,threat_score,count\nA → B,0.75,3\nC,-1.5,1\n",
        ))
        .unwrap();
        assert!(results.schema().has_path);
        assert!(results.schema().has_threat_score);
        assert_eq!(results.rows()[0].path.as_deref(), Some("A → B"));
        assert_eq!(results.rows()[1].threat_score, Some(-1.5));
        assert_eq!(results.rows()[0].fields.get("count").map(String::as_str), Some("3"));
        assert!(!results.rows()[0].fields.contains_key("path"));
    }

    #[test]
    fn absent_columns_are_not_an_error() {
        let results = ResultSet::from_table(&table("threat_score\n1\n")).unwrap();
        assert!(!results.schema().has_path);
        assert_eq!(results.rows()[0].path, None);
        assert!(matches!(
            results.require(PATH_COLUMN, ViewScope::Chart),
            Err(DashboardError::MissingField {
                field: "path",
                view: ViewScope::Chart
            })
        ));
        assert!(results.require(THREAT_SCORE_COLUMN, ViewScope::RankedTable).is_ok());
    }

    #[test]
    fn unparsable_score_is_rejected() {
        let err = ResultSet::from_table(&table("path,threat_score\nA,high\n")).unwrap_err();
        assert_eq!(
            err,
            ResultShapeError::UnparsableScore {
                row: 0,
                value: "high".into()
            }
        );
    }

    #[test]
    fn nan_score_is_rejected() {
        let err = ResultSet::from_table(&table("path,threat_score\nA,1\nB,NaN\n")).unwrap_err();
        assert_eq!(err, ResultShapeError::NanScore { row: 1 });
    }

    #[test]
    fn infinite_score_is_allowed() {
        let results = ResultSet::from_table(&table("path,threat_score\nA,inf\n")).unwrap();
        assert_eq!(results.rows()[0].threat_score, Some(f64::INFINITY));
    }

    #[test]
    fn empty_path_is_rejected() {
        let err = ResultSet::from_table(&table("path,threat_score\n  ,1\n")).unwrap_err();
        assert_eq!(err, ResultShapeError::EmptyPath { row: 0 });
    }

    #[test]
    fn path_cell_is_kept_verbatim() {
        let results =
            ResultSet::from_table(&table("path,threat_score\n  A → B ,1\n")).unwrap();
        assert_eq!(results.rows()[0].path.as_deref(), Some("  A → B "));

        let selector = crate::selector::ChainSelector::from_results(&results).unwrap();
        assert_eq!(selector.resolve("  A → B ").unwrap(), "  A → B ");
        assert!(matches!(
            selector.resolve("A → B"),
            Err(DashboardError::NotFound { .. })
        ));
    }

    #[test]
    fn duplicate_paths_are_kept() {
        let results =
            ResultSet::from_table(&table("path,threat_score\nA → B,1\nA → B,2\n")).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn head_restores_column_order() {
        let results =
            ResultSet::from_table(&table("user,path,threat_score\nroot,A → B,0.5\n")).unwrap();
        let view = results.head(10);
        assert_eq!(view.columns, vec!["user", "path", "threat_score"]);
        assert_eq!(view.rows[0], vec!["root", "A → B", "0.5"]);
    }
}
