//! Record tables
//!
//! Header-plus-rows tables read from CSV. Cells stay as strings; typing
//! happens once, at the pipeline boundary.

use crate::error::DashboardError;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Errors reading or building a table
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// CSV syntax or encoding error
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Input had no header row
    #[error("missing header row")]
    NoHeader,

    /// A row's width differs from the header's
    #[error("row {row} has {found} fields, header has {expected}")]
    Ragged {
        /// Zero-based data row
        row: usize,
        /// Header width
        expected: usize,
        /// Row width
        found: usize,
    },

    /// File could not be opened
    #[error("io error reading {path}: {source}")]
    Io {
        /// Input file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl From<TableError> for DashboardError {
    fn from(err: TableError) -> Self {
        DashboardError::IngestionFailure {
            detail: crate::error::error_chain(&err),
        }
    }
}

/// A table of string cells with a header row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RecordTable {
    /// Build a table, checking every row against the header width
    ///
    /// # Errors
    /// [`TableError::Ragged`] for a row of the wrong width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns.len())
        {
            return Err(TableError::Ragged {
                row,
                expected: columns.len(),
                found: cells.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Read CSV with a header row
    ///
    /// # Errors
    /// [`TableError`] on malformed CSV, a missing header or ragged rows.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() {
            return Err(TableError::NoHeader);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(columns, rows)
    }

    /// Read a CSV file
    ///
    /// # Errors
    /// [`TableError::Io`] if the file cannot be opened, otherwise as
    /// [`RecordTable::read_csv`].
    pub fn read_csv_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read_csv(std::io::BufReader::new(file))
    }

    /// Write as CSV with a header row
    ///
    /// # Errors
    /// [`TableError::Csv`] on write failure.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Column names in file order
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no data rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// First `n` rows as a view
    #[must_use]
    pub fn head(&self, n: usize) -> TableView {
        TableView {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
            total_rows: self.rows.len(),
        }
    }
}

/// A bounded, read-only snapshot of a table for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableView {
    /// Column names
    pub columns: Vec<String>,
    /// Displayed rows
    pub rows: Vec<Vec<String>>,
    /// Rows in the underlying table
    pub total_rows: usize,
}

impl TableView {
    /// Rows left out of the view
    #[inline]
    #[must_use]
    pub fn truncated(&self) -> usize {
        self.total_rows.saturating_sub(self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_rows() {
        let csv = "pid,image\n1,init\n2,sshd\n";
        let table = RecordTable::read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["pid", "image"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_index("image"), Some(1));
        assert_eq!(table.column_index("Image"), None);
    }

    #[test]
    fn header_only_is_an_empty_table() {
        let table = RecordTable::read_csv("a,b\n".as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn empty_input_has_no_header() {
        let result = RecordTable::read_csv("".as_bytes());
        assert!(matches!(result, Err(TableError::NoHeader)));
    }

    #[test]
    fn ragged_csv_is_rejected() {
        let result = RecordTable::read_csv("a,b\n1,2\n3\n".as_bytes());
        assert!(matches!(result, Err(TableError::Csv(_))));
    }

    #[test]
    fn new_checks_width() {
        let result = RecordTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        );
        assert!(matches!(
            result,
            Err(TableError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn head_is_bounded() {
        let rows: Vec<Vec<String>> = (0..120).map(|i| vec![i.to_string()]).collect();
        let table = RecordTable::new(vec!["n".into()], rows).unwrap();
        let view = table.head(50);
        assert_eq!(view.rows.len(), 50);
        assert_eq!(view.rows[49], vec!["49"]);
        assert_eq!(view.total_rows, 120);
        assert_eq!(view.truncated(), 70);
    }

    #[test]
    fn write_then_read_preserves_quoting() {
        let table = RecordTable::new(
            vec!["path".into(), "note".into()],
            vec![vec!["a → b".into(), "has, comma".into()]],
        )
        .unwrap();
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let back = RecordTable::read_csv(buf.as_slice()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn ingestion_failure_from_table_error() {
        let err: DashboardError = TableError::NoHeader.into();
        assert!(matches!(err, DashboardError::IngestionFailure { .. }));
        assert!(err.to_string().contains("missing header row"));
    }
}
