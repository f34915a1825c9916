//! `procpath` command-line entry point

use procpath_cli::{build_cli, logging, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = build_cli().get_matches();

    let sub = matches.subcommand().map(|(_, sub)| sub);
    let flag = |name: &str| {
        matches.get_flag(name) || sub.is_some_and(|sub| sub.get_flag(name))
    };
    if let Err(err) = logging::init(flag("verbose"), flag("log-json")) {
        eprintln!("warning: {err:#}");
    }

    let mut stdout = std::io::stdout().lock();
    match run(&matches, &mut stdout) {
        Ok(outcome) => {
            tracing::debug!(?outcome, "procpath finished");
            outcome.into()
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "procpath failed");
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}
