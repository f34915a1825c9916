//! One upload's worth of dashboard state
//!
//! A [`Session`] owns the uploaded table and the configuration; nothing is
//! shared between sessions. Analysis yields an [`Analysis`] whose views
//! succeed or fail independently: a missing `path` column blanks the chart
//! and the selector but leaves the ranked table standing.

use crate::config::DashboardConfig;
use crate::error::{DashboardError, ViewScope};
use crate::notice::Notice;
use crate::pipeline::{AnalysisPipelineAdapter, ScoringPipeline};
use crate::ranker::{ChartBar, RankedResults};
use crate::results::{ResultSet, PATH_COLUMN, THREAT_SCORE_COLUMN};
use crate::selector::ChainSelector;
use crate::table::{RecordTable, TableView};
use procpath_chain::{ChainGraph, RenderedGraph};
use std::io::Read;
use std::path::Path;

/// How the user picked a chain to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// By literal path value
    Path(String),
    /// By zero-based position in the selector
    Option(usize),
    /// By zero-based position in the ranking
    Rank(usize),
}

/// Session-scoped dashboard context
#[derive(Debug, Clone)]
pub struct Session {
    config: DashboardConfig,
    input: RecordTable,
}

impl Session {
    /// Read an uploaded CSV
    ///
    /// # Errors
    /// [`DashboardError::IngestionFailure`] if the input is not a table.
    pub fn ingest<R: Read>(reader: R, config: DashboardConfig) -> Result<Self, DashboardError> {
        let input = RecordTable::read_csv(reader).map_err(|err| {
            let err = DashboardError::from(err);
            tracing::warn!(error = %err, "ingestion failed");
            err
        })?;
        Ok(Self::from_table(input, config))
    }

    /// Read an uploaded CSV file
    ///
    /// # Errors
    /// As [`Session::ingest`], including when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, config: DashboardConfig) -> Result<Self, DashboardError> {
        let path = path.as_ref();
        let input = RecordTable::read_csv_path(path).map_err(|err| {
            let err = DashboardError::from(err);
            tracing::warn!(path = %path.display(), error = %err, "ingestion failed");
            err
        })?;
        Ok(Self::from_table(input, config))
    }

    /// Start a session from a table already in memory
    #[must_use]
    pub fn from_table(input: RecordTable, config: DashboardConfig) -> Self {
        tracing::info!(
            rows = input.len(),
            columns = input.columns().len(),
            "input ingested"
        );
        Self { config, input }
    }

    /// Configuration in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Uploaded table
    #[inline]
    #[must_use]
    pub fn input(&self) -> &RecordTable {
        &self.input
    }

    /// First rows of the uploaded table, before any analysis
    #[must_use]
    pub fn raw_preview(&self) -> TableView {
        self.input.head(self.config.views.preview_rows)
    }

    /// Run the scoring pipeline and build every view
    ///
    /// # Errors
    /// [`DashboardError::PipelineFailure`] only; per-view failures are
    /// carried inside the returned [`Analysis`].
    pub fn analyze(&self, pipeline: &dyn ScoringPipeline) -> Result<Analysis, DashboardError> {
        let results = AnalysisPipelineAdapter::new(pipeline).run(&self.input)?;

        let ranked = self.config.ranker().rank(&results);
        let chart = match &ranked {
            Ok(ranked) => ranked.chart_view(),
            Err(_) => Err(DashboardError::MissingField {
                field: THREAT_SCORE_COLUMN,
                view: ViewScope::Chart,
            }),
        };
        let selector = ChainSelector::from_results(&results);

        for err in [ranked.as_ref().err(), chart.as_ref().err(), selector.as_ref().err()]
            .into_iter()
            .flatten()
        {
            tracing::warn!(view = %err.scope(), error = %err, "view unavailable");
        }

        Ok(Analysis {
            results,
            ranked,
            chart,
            selector,
        })
    }

    /// Draw the chain picked from `analysis`
    ///
    /// # Errors
    /// [`DashboardError::NotFound`] if the selection names nothing,
    /// [`DashboardError::InvalidPath`] or [`DashboardError::RenderFailure`]
    /// from drawing.
    pub fn render_selection(
        &self,
        analysis: &Analysis,
        selection: &Selection,
    ) -> Result<RenderedGraph, DashboardError> {
        let path = match selection {
            Selection::Path(value) => ChainSelector::from_results(analysis.results())?
                .resolve(value)?
                .to_string(),
            Selection::Option(index) => ChainSelector::from_results(analysis.results())?
                .resolve_index(*index)?
                .to_string(),
            Selection::Rank(rank) => match analysis.ranked() {
                Ok(ranked) => ranked.path_at(*rank)?.to_string(),
                Err(_) => {
                    return Err(DashboardError::MissingField {
                        field: THREAT_SCORE_COLUMN,
                        view: ViewScope::Selector,
                    })
                }
            },
        };
        tracing::debug!(?selection, path = %path, "selection resolved");
        self.render_path(&path)
    }

    /// Draw a literal path string
    ///
    /// # Errors
    /// [`DashboardError::InvalidPath`] or [`DashboardError::RenderFailure`].
    pub fn render_path(&self, path: &str) -> Result<RenderedGraph, DashboardError> {
        render_chain(&self.config, path)
    }
}

/// Tokenize, build and draw one chain under `config`
///
/// # Errors
/// [`DashboardError::InvalidPath`] for a malformed path,
/// [`DashboardError::RenderFailure`] if layout or drawing fails.
pub fn render_chain(config: &DashboardConfig, path: &str) -> Result<RenderedGraph, DashboardError> {
    let tokenizer = config.tokenizer();
    let rendered = ChainGraph::from_path(path, &tokenizer, config.chain.self_loops)
        .and_then(|graph| {
            tracing::debug!(
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "chain graph built"
            );
            config.renderer().render(&graph)
        })
        .map_err(|err| {
            let err = DashboardError::from(err);
            tracing::warn!(path, error = %err, "graph unavailable");
            err
        })?;

    tracing::info!(path, bytes = rendered.png_bytes().len(), "graph rendered");
    Ok(rendered)
}

/// Outcome of one analysis run, view by view
#[derive(Debug)]
pub struct Analysis {
    results: ResultSet,
    ranked: Result<RankedResults, DashboardError>,
    chart: Result<Vec<ChartBar>, DashboardError>,
    selector: Result<ChainSelector, DashboardError>,
}

impl Analysis {
    /// Typed results in pipeline order
    #[inline]
    #[must_use]
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Ranked results, or why the ranked table is blank
    ///
    /// # Errors
    /// [`DashboardError::MissingField`] without a `threat_score` column.
    pub fn ranked(&self) -> Result<&RankedResults, &DashboardError> {
        self.ranked.as_ref()
    }

    /// Chart bars, or why the chart is blank
    ///
    /// # Errors
    /// [`DashboardError::MissingField`] without `path` or `threat_score`.
    pub fn chart(&self) -> Result<&[ChartBar], &DashboardError> {
        self.chart.as_deref()
    }

    /// Path selector, or why there is nothing to select
    ///
    /// # Errors
    /// [`DashboardError::NotFound`] without a `path` column.
    pub fn selector(&self) -> Result<&ChainSelector, &DashboardError> {
        self.selector.as_ref()
    }

    /// Status messages for the display, in view order
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = vec![Notice::success(ViewScope::Analysis, "analysis completed")];

        if self.results.is_empty() {
            notices.push(Notice::info(
                ViewScope::Analysis,
                "the pipeline returned no rows",
            ));
        }
        if let Err(err) = &self.ranked {
            notices.push(Notice::from_error(err));
        }
        if let Err(err) = &self.chart {
            let mut notice = Notice::from_error(err);
            notice.detail = Some(format!(
                "the chart needs both '{PATH_COLUMN}' and '{THREAT_SCORE_COLUMN}' columns"
            ));
            notices.push(notice);
        }
        if let Err(err) = &self.selector {
            notices.push(Notice::from_error(err));
            if !self.results.schema().has_path {
                notices.push(Notice::info(
                    ViewScope::Graph,
                    format!("Column '{PATH_COLUMN}' not found; graph visualisation skipped"),
                ));
            }
        }
        notices
    }
}
