//! Testing utilities for the procpath workspace
//!
//! Shared fixtures and fake scoring pipelines.

#![allow(missing_docs)]

use procpath_core::{DashboardConfig, RecordTable, ScoringPipeline, Session};

/// Scored process chains, in pipeline output order
pub const SAMPLE_RESULTS_CSV: &str = "\
path,threat_score,count
explorer.exe → cmd.exe,0.35,12
services.exe → svchost.exe,0.05,240
winword.exe → cmd.exe → powershell.exe,0.92,1
explorer.exe → chrome.exe,0.05,88
cmd.exe → cmd.exe,0.61,3
";

/// Raw process events without scores
pub const SAMPLE_EVENTS_CSV: &str = "\
pid,ppid,image
4,0,System
612,4,smss.exe
3120,612,explorer.exe
";

pub fn table(csv: &str) -> RecordTable {
    RecordTable::read_csv(csv.as_bytes()).unwrap()
}

pub fn sample_results() -> RecordTable {
    table(SAMPLE_RESULTS_CSV)
}

pub fn session(csv: &str) -> Session {
    Session::ingest(csv.as_bytes(), DashboardConfig::default()).unwrap()
}

/// Table of `n` chains `p0 .. p{n-1}` scored by the given function
pub fn scored_table(n: usize, score: impl Fn(usize) -> f64) -> RecordTable {
    let rows = (0..n)
        .map(|i| vec![format!("p{i} → q{i}"), score(i).to_string()])
        .collect();
    RecordTable::new(vec!["path".into(), "threat_score".into()], rows).unwrap()
}

/// Pipeline that ignores its input and returns a fixed table
#[derive(Debug, Clone)]
pub struct StaticPipeline(pub RecordTable);

impl ScoringPipeline for StaticPipeline {
    fn name(&self) -> &str {
        "static"
    }

    fn analyze(&self, _input: &RecordTable) -> anyhow::Result<RecordTable> {
        Ok(self.0.clone())
    }
}

/// Pipeline that always raises
#[derive(Debug, Clone)]
pub struct FailingPipeline(pub &'static str);

impl ScoringPipeline for FailingPipeline {
    fn name(&self) -> &str {
        "failing"
    }

    fn analyze(&self, _input: &RecordTable) -> anyhow::Result<RecordTable> {
        anyhow::bail!("{}", self.0)
    }
}
