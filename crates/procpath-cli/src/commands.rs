//! Subcommand handlers
//!
//! Handlers write the report to `out` and return an [`Outcome`]; only
//! configuration and I/O problems on the report stream come back as `Err`.

use crate::report::DashboardReport;
use anyhow::Context;
use clap::ArgMatches;
use procpath_core::{
    render_chain, CommandPipeline, DashboardConfig, DashboardError, Notice, ScoredInputPipeline,
    ScoringPipeline, Selection, Session,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything requested was shown; contained warnings are allowed
    Completed,
    /// Ingestion or the scoring pipeline failed
    Halted,
    /// A requested image was not produced
    NoImage,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed => ExitCode::SUCCESS,
            Outcome::Halted => ExitCode::from(1),
            Outcome::NoImage => ExitCode::from(2),
        }
    }
}

/// Dispatch on the parsed subcommand
///
/// # Errors
/// Bad configuration, or a failure writing to `out`.
pub fn run(matches: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<Outcome> {
    match matches.subcommand() {
        Some(("analyze", args)) => analyze(args, out),
        Some(("render", args)) => render(args, out),
        Some(("graph", args)) => graph(args, out),
        Some((other, _)) => anyhow::bail!("unknown subcommand {other}"),
        None => anyhow::bail!("no subcommand given"),
    }
}

/// Merge the config file and command-line overrides
///
/// # Errors
/// If the file cannot be loaded or the result is invalid.
pub fn load_config(args: &ArgMatches) -> anyhow::Result<DashboardConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };

    if let Ok(Some(argv)) = args.try_get_many::<String>("pipeline-cmd") {
        config = config.with_pipeline_command(argv.cloned().collect());
    }
    if let Some(Some(seed)) = args.try_get_one::<u64>("seed").ok() {
        config = config.with_seed(*seed);
    }

    config.validate()?;
    tracing::debug!(?config, "configuration resolved");
    Ok(config)
}

fn pipeline_for(config: &DashboardConfig) -> Box<dyn ScoringPipeline> {
    match config
        .pipeline
        .command
        .as_deref()
        .and_then(CommandPipeline::from_argv)
    {
        Some(pipeline) => Box::new(pipeline),
        None => Box::new(ScoredInputPipeline),
    }
}

fn analyze(args: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<Outcome> {
    let json = args.get_flag("json");
    let config = load_config(args)?;

    let Some(input) = args.get_one::<PathBuf>("input") else {
        emit(out, &DashboardReport::awaiting_input(), json)?;
        return Ok(Outcome::Completed);
    };

    let session = match Session::open(input, config) {
        Ok(session) => session,
        Err(err) => return halted(out, &err),
    };

    let pipeline = pipeline_for(session.config());
    let analysis = session.analyze(pipeline.as_ref());
    emit(out, &DashboardReport::new(&session, analysis.as_ref()), json)?;

    Ok(match analysis {
        Ok(_) => Outcome::Completed,
        Err(_) => Outcome::Halted,
    })
}

fn render(args: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<Outcome> {
    let config = load_config(args)?;
    let input = args
        .get_one::<PathBuf>("input")
        .context("missing input file")?;
    let target = args
        .get_one::<PathBuf>("out")
        .context("missing --out")?;

    let selection = match (args.get_one::<String>("path"), args.get_one::<u64>("rank")) {
        (Some(path), _) => Selection::Path(path.clone()),
        (None, Some(rank)) => {
            let rank = usize::try_from(*rank).context("--rank out of range")?;
            Selection::Rank(rank.saturating_sub(1))
        }
        (None, None) => anyhow::bail!("one of --path or --rank is required"),
    };

    let session = match Session::open(input, config) {
        Ok(session) => session,
        Err(err) => return halted(out, &err),
    };
    let pipeline = pipeline_for(session.config());
    let analysis = match session.analyze(pipeline.as_ref()) {
        Ok(analysis) => analysis,
        Err(err) => return halted(out, &err),
    };
    for notice in analysis.notices() {
        tracing::debug!(%notice, "analysis notice");
    }

    let written = session
        .render_selection(&analysis, &selection)
        .and_then(|rendered| {
            rendered
                .write_png(target)
                .map_err(DashboardError::from)
                .map(|()| rendered.layout().len())
        });
    finish_image(out, written, target)
}

fn graph(args: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<Outcome> {
    let config = load_config(args)?;
    let chain = args
        .get_one::<String>("chain")
        .context("missing path")?;
    let target = args
        .get_one::<PathBuf>("out")
        .context("missing --out")?;

    let written = render_chain(&config, chain).and_then(|rendered| {
        rendered
            .write_png(target)
            .map_err(DashboardError::from)
            .map(|()| rendered.layout().len())
    });
    finish_image(out, written, target)
}

fn finish_image(
    out: &mut dyn Write,
    written: Result<usize, DashboardError>,
    target: &std::path::Path,
) -> anyhow::Result<Outcome> {
    match written {
        Ok(nodes) => {
            writeln!(
                out,
                "wrote graph of {nodes} process{} to {}",
                if nodes == 1 { "" } else { "es" },
                target.display()
            )?;
            Ok(Outcome::Completed)
        }
        Err(err) => {
            writeln!(out, "{}", Notice::from_error(&err))?;
            Ok(if err.is_fatal() {
                Outcome::Halted
            } else {
                Outcome::NoImage
            })
        }
    }
}

fn halted(out: &mut dyn Write, err: &DashboardError) -> anyhow::Result<Outcome> {
    writeln!(out, "{}", Notice::from_error(err))?;
    if let Some(detail) = err.detail() {
        writeln!(out, "      {detail}")?;
    }
    Ok(Outcome::Halted)
}

fn emit(out: &mut dyn Write, report: &DashboardReport, json: bool) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", report.to_json()?)?;
    } else {
        write!(out, "{}", report.render_text())?;
    }
    Ok(())
}
