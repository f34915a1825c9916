//! Dashboard configuration
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Values are checked once, on load.

use crate::error::ConfigError;
use crate::ranker::{ResultRanker, CHART_LIMIT, TABLE_LIMIT};
use procpath_chain::{
    GraphRenderer, PathTokenizer, RenderStyle, SelfLoopPolicy, MAX_CANVAS_SIDE, MAX_LABEL_SCALE,
    MAX_LAYOUT_ITERATIONS, MAX_NODE_RADIUS, PATH_DELIMITER,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rows shown in the raw input preview
pub const PREVIEW_LIMIT: usize = 50;

/// Complete dashboard configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// View bounds
    pub views: ViewLimits,
    /// Path parsing
    pub chain: ChainSettings,
    /// Graph drawing
    pub render: RenderStyle,
    /// External scorer
    pub pipeline: PipelineSettings,
}

/// Row bounds for each view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewLimits {
    /// Raw input preview rows
    pub preview_rows: usize,
    /// Ranked table rows
    pub table_rows: usize,
    /// Chart bars
    pub chart_rows: usize,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            preview_rows: PREVIEW_LIMIT,
            table_rows: TABLE_LIMIT,
            chart_rows: CHART_LIMIT,
        }
    }
}

/// How path strings become graphs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    /// Hop delimiter
    pub delimiter: String,
    /// Treatment of `A → A`
    pub self_loops: SelfLoopPolicy,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            delimiter: PATH_DELIMITER.to_string(),
            self_loops: SelfLoopPolicy::Allow,
        }
    }
}

/// External scorer settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Scorer argv; unset means the input is already scored
    pub command: Option<Vec<String>>,
}

impl DashboardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for bad TOML, [`ConfigError::Invalid`] for out
    /// of range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, Path::new("<inline>"))
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`DashboardConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, path)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let views = &self.views;
        for (field, value) in [
            ("views.preview_rows", views.preview_rows),
            ("views.table_rows", views.table_rows),
            ("views.chart_rows", views.chart_rows),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be at least 1"));
            }
        }
        if self.chain.delimiter.trim().is_empty() {
            return Err(ConfigError::invalid(
                "chain.delimiter",
                "must contain a visible character",
            ));
        }
        let render = &self.render;
        if render.width == 0
            || render.height == 0
            || render.width > MAX_CANVAS_SIDE
            || render.height > MAX_CANVAS_SIDE
        {
            return Err(ConfigError::invalid(
                "render",
                format!(
                    "canvas {}x{} must be 1..={MAX_CANVAS_SIDE} pixels per side",
                    render.width, render.height
                ),
            ));
        }
        for (field, value, max) in [
            ("render.node_radius", render.node_radius, MAX_NODE_RADIUS),
            ("render.label_scale", render.label_scale, MAX_LABEL_SCALE),
        ] {
            if value == 0 || value > max {
                return Err(ConfigError::invalid(field, format!("must be 1..={max}")));
            }
        }
        if render.iterations > MAX_LAYOUT_ITERATIONS {
            return Err(ConfigError::invalid(
                "render.iterations",
                format!("must be at most {MAX_LAYOUT_ITERATIONS}"),
            ));
        }
        if let Some(command) = &self.pipeline.command {
            if command.first().map_or(true, |program| program.trim().is_empty()) {
                return Err(ConfigError::invalid(
                    "pipeline.command",
                    "must name a program",
                ));
            }
        }
        Ok(())
    }

    /// With a different layout seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.render.seed = seed;
        self
    }

    /// With an external scorer command
    #[inline]
    #[must_use]
    pub fn with_pipeline_command(mut self, argv: Vec<String>) -> Self {
        self.pipeline.command = Some(argv);
        self
    }

    /// With a self-loop policy
    #[inline]
    #[must_use]
    pub fn with_self_loops(mut self, policy: SelfLoopPolicy) -> Self {
        self.chain.self_loops = policy;
        self
    }

    /// With different view bounds
    #[inline]
    #[must_use]
    pub fn with_view_limits(mut self, views: ViewLimits) -> Self {
        self.views = views;
        self
    }

    /// Tokenizer for the configured delimiter
    #[must_use]
    pub fn tokenizer(&self) -> PathTokenizer {
        PathTokenizer::new(self.chain.delimiter.clone())
    }

    /// Ranker for the configured view bounds
    #[must_use]
    pub fn ranker(&self) -> ResultRanker {
        ResultRanker::new(self.views.table_rows, self.views.chart_rows)
    }

    /// Renderer for the configured style
    #[must_use]
    pub fn renderer(&self) -> GraphRenderer {
        GraphRenderer::new(self.render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_is_default() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.views.preview_rows, 50);
        assert_eq!(config.views.table_rows, 50);
        assert_eq!(config.views.chart_rows, 15);
        assert_eq!(config.chain.delimiter, " → ");
        assert_eq!(config.render.width, 1000);
        assert_eq!(config.render.height, 500);
        assert_eq!(config.render.seed, 42);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            [views]
            chart_rows = 5

            [chain]
            self_loops = "reject"

            [pipeline]
            command = ["python3", "score.py"]
            "#,
        )
        .unwrap();
        assert_eq!(config.views.chart_rows, 5);
        assert_eq!(config.views.table_rows, 50);
        assert_eq!(config.chain.self_loops, SelfLoopPolicy::Reject);
        assert_eq!(
            config.pipeline.command,
            Some(vec!["python3".to_string(), "score.py".to_string()])
        );
    }

    #[test]
    fn zero_limit_is_invalid() {
        let err = DashboardConfig::from_toml_str("[views]\ntable_rows = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "views.table_rows",
                ..
            }
        ));
    }

    #[test]
    fn blank_delimiter_is_invalid() {
        let err = DashboardConfig::from_toml_str("[chain]\ndelimiter = \"  \"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "chain.delimiter",
                ..
            }
        ));
    }

    #[test]
    fn zero_canvas_is_invalid() {
        let err = DashboardConfig::from_toml_str("[render]\nwidth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "render", .. }));
    }

    #[test]
    fn oversized_render_settings_are_invalid() {
        let err = DashboardConfig::from_toml_str("[render]\nwidth = 4294967295\nheight = 4294967295\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "render", .. }));

        for (toml, field) in [
            ("[render]\nnode_radius = 4294967295\n", "render.node_radius"),
            ("[render]\nlabel_scale = 4294967295\n", "render.label_scale"),
            ("[render]\niterations = 100000000\n", "render.iterations"),
        ] {
            match DashboardConfig::from_toml_str(toml) {
                Err(ConfigError::Invalid { field: bad, .. }) => assert_eq!(bad, field),
                other => panic!("{toml:?} accepted: {other:?}"),
            }
        }

        let largest = format!(
            "[render]\nwidth = {MAX_CANVAS_SIDE}\nheight = {MAX_CANVAS_SIDE}\nnode_radius = {MAX_NODE_RADIUS}\nlabel_scale = {MAX_LABEL_SCALE}\n"
        );
        assert!(DashboardConfig::from_toml_str(&largest).is_ok());
    }

    #[test]
    fn empty_command_is_invalid() {
        let err = DashboardConfig::from_toml_str("[pipeline]\ncommand = []\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "pipeline.command",
                ..
            }
        ));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = DashboardConfig::from_toml_str("[views\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("procpath.toml");
        std::fs::write(&path, "[render]\nseed = 7\n").unwrap();
        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.render.seed, 7);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DashboardConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn builders_feed_components() {
        let config = DashboardConfig::new()
            .with_seed(9)
            .with_self_loops(SelfLoopPolicy::Reject)
            .with_view_limits(ViewLimits {
                preview_rows: 3,
                table_rows: 2,
                chart_rows: 1,
            });
        assert_eq!(config.renderer().style().seed, 9);
        assert_eq!(config.ranker(), ResultRanker::new(2, 1));
        assert_eq!(config.tokenizer().delimiter(), " → ");
    }
}
