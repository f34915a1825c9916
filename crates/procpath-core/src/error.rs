//! Error types for the dashboard core
//!
//! Every failure names the narrowest view it affects so callers can keep
//! the rest of the display alive:
//! - Ingestion and pipeline failures stop everything downstream
//! - Missing fields, bad paths and render failures only blank one view

use procpath_chain::ChainError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The part of the display a failure is confined to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewScope {
    /// Uploaded table and its preview
    Input,
    /// The scoring pipeline run
    Analysis,
    /// Ranked results table
    RankedTable,
    /// Top-N threat score chart
    Chart,
    /// Path selection control
    Selector,
    /// Rendered chain graph
    Graph,
    /// Configuration
    Config,
}

impl fmt::Display for ViewScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Analysis => "analysis",
            Self::RankedTable => "ranked table",
            Self::Chart => "chart",
            Self::Selector => "selector",
            Self::Graph => "graph",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

/// Main dashboard error type
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Uploaded file is not a readable table
    #[error("failed to read input table: {detail}")]
    IngestionFailure {
        /// Full error chain
        detail: String,
    },

    /// External scoring pipeline raised or returned something unusable
    #[error("scoring pipeline '{pipeline}' failed: {reason}")]
    PipelineFailure {
        /// Pipeline name
        pipeline: String,
        /// One-line summary
        reason: String,
        /// Full diagnostic, including causes
        detail: String,
    },

    /// A column a view needs is absent from the results
    #[error("cannot build {view}: results have no '{field}' column")]
    MissingField {
        /// Column name
        field: &'static str,
        /// View that needed it
        view: ViewScope,
    },

    /// Selected path could not be turned into a graph
    #[error("cannot graph selected path: {0}")]
    InvalidPath(#[source] ChainError),

    /// Layout or drawing failed
    #[error("could not render graph: {0}")]
    RenderFailure(#[source] ChainError),

    /// A lookup came back empty
    #[error("{what} not found")]
    NotFound {
        /// What was looked up
        what: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DashboardError {
    /// Build a pipeline failure from any error, keeping its cause chain
    pub fn pipeline_failure(pipeline: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::PipelineFailure {
            pipeline: pipeline.into(),
            reason: format!("{err:#}"),
            detail: format!("{err:?}"),
        }
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Narrowest view affected by this failure
    #[must_use]
    pub fn scope(&self) -> ViewScope {
        match self {
            Self::IngestionFailure { .. } => ViewScope::Input,
            Self::PipelineFailure { .. } => ViewScope::Analysis,
            Self::MissingField { view, .. } => *view,
            Self::InvalidPath(_) | Self::RenderFailure(_) => ViewScope::Graph,
            Self::NotFound { .. } => ViewScope::Selector,
            Self::Config(_) => ViewScope::Config,
        }
    }

    /// Check if the failure halts everything downstream
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::IngestionFailure { .. } | Self::PipelineFailure { .. } | Self::Config(_)
        )
    }

    /// Multi-line diagnostic for the operator, where one exists beyond the
    /// message itself
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::PipelineFailure { detail, .. } => Some(detail.clone()),
            Self::InvalidPath(source) | Self::RenderFailure(source) => {
                Some(error_chain(source))
            }
            Self::Config(source) => Some(error_chain(source)),
            _ => None,
        }
    }
}

impl From<ChainError> for DashboardError {
    fn from(err: ChainError) -> Self {
        if err.is_invalid_path() {
            Self::InvalidPath(err)
        } else {
            Self::RenderFailure(err)
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the schema
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A value is out of range
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted field name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Create an out-of-range error
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Join an error and its sources into one line
#[must_use]
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
