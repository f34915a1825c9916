//! Scoring pipelines
//!
//! The scorer is an opaque, possibly foreign component. It takes the raw
//! table and hands back a results table; anything it raises is folded into
//! [`DashboardError::PipelineFailure`] by [`AnalysisPipelineAdapter`].

use crate::error::DashboardError;
use crate::results::ResultSet;
use crate::table::RecordTable;
use anyhow::{bail, Context};
use std::io::Write;
use std::process::{Command, Stdio};

/// An external analysis step that scores process chains
pub trait ScoringPipeline {
    /// Name used in logs and failure messages
    fn name(&self) -> &str;

    /// Score `input`, returning a table with (ideally) `path` and
    /// `threat_score` columns
    ///
    /// # Errors
    /// Any failure of the scorer.
    fn analyze(&self, input: &RecordTable) -> anyhow::Result<RecordTable>;
}

/// Treats the uploaded table as already scored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoredInputPipeline;

impl ScoringPipeline for ScoredInputPipeline {
    fn name(&self) -> &str {
        "scored-input"
    }

    fn analyze(&self, input: &RecordTable) -> anyhow::Result<RecordTable> {
        Ok(input.clone())
    }
}

/// Runs an external program: CSV on stdin, CSV on stdout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPipeline {
    program: String,
    args: Vec<String>,
    name: String,
}

impl CommandPipeline {
    /// Create a pipeline for `program` with `args`
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program = program.into();
        Self {
            name: program.clone(),
            program,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a pipeline from a full argv; `None` when `argv` is empty
    #[must_use]
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }

    /// Program being run
    #[inline]
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl ScoringPipeline for CommandPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze(&self, input: &RecordTable) -> anyhow::Result<RecordTable> {
        let mut stdin_bytes = Vec::new();
        input
            .write_csv(&mut stdin_bytes)
            .context("failed to encode input table")?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start {}", self.program))?;

        tracing::debug!(program = %self.program, bytes = stdin_bytes.len(), "scorer started");

        let mut stdin = child
            .stdin
            .take()
            .context("scorer stdin was not captured")?;
        // Fed from its own thread so a scorer that writes before it has read
        // everything cannot fill the stdout pipe and stall both sides
        let writer = std::thread::spawn(move || stdin.write_all(&stdin_bytes));

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for {}", self.program))?;

        match writer.join() {
            Ok(Ok(())) => {}
            // A scorer may exit without draining stdin; its exit status decides
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(err)) => return Err(err).context("failed to write input to scorer"),
            Err(_) => bail!("scorer input thread panicked"),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        RecordTable::read_csv(output.stdout.as_slice())
            .with_context(|| format!("{} produced unreadable output", self.program))
    }
}

/// Runs a pipeline and types what it returns
pub struct AnalysisPipelineAdapter<'p> {
    pipeline: &'p dyn ScoringPipeline,
}

impl<'p> AnalysisPipelineAdapter<'p> {
    /// Wrap a pipeline
    #[must_use]
    pub fn new(pipeline: &'p dyn ScoringPipeline) -> Self {
        Self { pipeline }
    }

    /// Analyze `input` and validate the result shape
    ///
    /// Absent `path` or `threat_score` columns are allowed through; present
    /// ones must be usable in every row.
    ///
    /// # Errors
    /// [`DashboardError::PipelineFailure`] if the pipeline fails or its
    /// output is unusable.
    pub fn run(&self, input: &RecordTable) -> Result<ResultSet, DashboardError> {
        let name = self.pipeline.name();
        tracing::debug!(pipeline = name, rows = input.len(), "running scoring pipeline");

        let output = self.pipeline.analyze(input).map_err(|err| {
            tracing::warn!(pipeline = name, error = %format!("{err:#}"), "scoring pipeline failed");
            DashboardError::pipeline_failure(name, &err)
        })?;

        let results = ResultSet::from_table(&output).map_err(|shape| {
            let err = anyhow::Error::new(shape).context("unusable result");
            tracing::warn!(pipeline = name, error = %format!("{err:#}"), "scoring pipeline output rejected");
            DashboardError::pipeline_failure(name, &err)
        })?;

        tracing::info!(
            pipeline = name,
            rows = results.len(),
            has_path = results.schema().has_path,
            has_threat_score = results.schema().has_threat_score,
            "analysis completed"
        );
        Ok(results)
    }
}

impl std::fmt::Debug for AnalysisPipelineAdapter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipelineAdapter")
            .field("pipeline", &self.pipeline.name())
            .finish()
    }
}
