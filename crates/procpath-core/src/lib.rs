//! Procpath Core - process chain triage
//!
//! Everything between an uploaded table and a picture of one chain:
//! - Reads the upload as a [`RecordTable`]
//! - Hands it to a [`ScoringPipeline`] and types what comes back
//! - Ranks by threat score into a bounded table and chart
//! - Offers the scored paths for selection and draws the chosen one
//!
//! Failures are scoped. A missing column or a malformed path blanks one view
//! and the rest of the [`Analysis`] stays usable.
//!
//! # Example
//!
//! ```rust
//! use procpath_core::prelude::*;
//!
//! let csv = "path,threat_score\nexplorer.exe → cmd.exe,0.4\ncmd.exe → powershell.exe,0.9\n";
//! let session = Session::ingest(csv.as_bytes(), DashboardConfig::default())?;
//! let analysis = session.analyze(&ScoredInputPipeline)?;
//!
//! let top = analysis.ranked().map_err(|e| e.to_string())?;
//! assert_eq!(top.path_at(0)?, "cmd.exe → powershell.exe");
//!
//! let graph = session.render_selection(&analysis, &Selection::Rank(0))?;
//! assert_eq!(graph.layout().len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod notice;
pub mod pipeline;
pub mod ranker;
pub mod results;
pub mod selector;
pub mod session;
pub mod table;

pub use config::{ChainSettings, DashboardConfig, PipelineSettings, ViewLimits, PREVIEW_LIMIT};
pub use error::{error_chain, ConfigError, DashboardError, ViewScope};
pub use notice::{Notice, NoticeLevel};
pub use pipeline::{
    AnalysisPipelineAdapter, CommandPipeline, ScoredInputPipeline, ScoringPipeline,
};
pub use ranker::{ChartBar, RankedResults, ResultRanker, CHART_LIMIT, TABLE_LIMIT};
pub use results::{
    AnalysisResultRow, ResultSchema, ResultSet, ResultShapeError, PATH_COLUMN,
    THREAT_SCORE_COLUMN,
};
pub use selector::ChainSelector;
pub use session::{render_chain, Analysis, Selection, Session};
pub use table::{RecordTable, TableError, TableView};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running an analysis session
    pub use crate::{
        Analysis, DashboardConfig, DashboardError, Notice, NoticeLevel, RecordTable,
        ScoredInputPipeline, ScoringPipeline, Selection, Session,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
