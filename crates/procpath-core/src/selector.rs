//! Chain selection
//!
//! Offers the literal `path` values as choices. Duplicates are offered as
//! many times as they occur; resolving a selection string is a lookup by
//! value, so it lands on the first matching entry, never on a row index.

use crate::error::{DashboardError, ViewScope};
use crate::results::{ResultSet, PATH_COLUMN};
use serde::Serialize;

/// Selectable process paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSelector {
    options: Vec<String>,
}

impl ChainSelector {
    /// Collect options from results, in result order
    ///
    /// # Errors
    /// [`DashboardError::NotFound`] when the results have no `path` column.
    pub fn from_results(results: &ResultSet) -> Result<Self, DashboardError> {
        if results.require(PATH_COLUMN, ViewScope::Selector).is_err() {
            return Err(DashboardError::not_found(format!(
                "column '{PATH_COLUMN}' in analysis results"
            )));
        }
        let options = results
            .rows()
            .iter()
            .filter_map(|row| row.path.clone())
            .collect();
        Ok(Self { options })
    }

    /// Options in display order
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Number of options
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// True when there is nothing to select
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Resolve a selection string to the path it names
    ///
    /// # Errors
    /// [`DashboardError::NotFound`] if no option equals `selection`.
    pub fn resolve(&self, selection: &str) -> Result<&str, DashboardError> {
        self.options
            .iter()
            .find(|option| option.as_str() == selection)
            .map(String::as_str)
            .ok_or_else(|| DashboardError::not_found(format!("path {selection:?}")))
    }

    /// Resolve a zero-based option position
    ///
    /// # Errors
    /// [`DashboardError::NotFound`] past the last option.
    pub fn resolve_index(&self, index: usize) -> Result<&str, DashboardError> {
        self.options
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| DashboardError::not_found(format!("option {index}")))
    }
}
