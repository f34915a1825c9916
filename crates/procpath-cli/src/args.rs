//! Command-line definition

use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};
use std::path::PathBuf;

/// Build the `procpath` command
#[must_use]
pub fn build_cli() -> Command {
    Command::new("procpath")
        .version(crate::VERSION)
        .about("Rank scored process chains and draw the suspicious ones")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("analyze")
                .about("Score an upload and print the ranked views")
                .arg(input_arg().required(false))
                .arg(config_arg())
                .arg(pipeline_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Score an upload and draw one chain as a PNG")
                .arg(input_arg().required(true))
                .arg(config_arg())
                .arg(pipeline_arg())
                .arg(
                    Arg::new("path")
                        .long("path")
                        .value_name("PATH")
                        .help("Chain to draw, by its exact path value"),
                )
                .arg(
                    Arg::new("rank")
                        .long("rank")
                        .value_name("N")
                        .value_parser(value_parser!(u64).range(1..))
                        .help("Chain to draw, by 1-based position in the ranking"),
                )
                .group(
                    ArgGroup::new("selection")
                        .args(["path", "rank"])
                        .required(true),
                )
                .arg(out_arg())
                .arg(seed_arg()),
        )
        .subcommand(
            Command::new("graph")
                .about("Draw a literal path string as a PNG")
                .arg(
                    Arg::new("chain")
                        .value_name("PATH")
                        .required(true)
                        .help("Delimited process chain, e.g. \"explorer.exe → cmd.exe\""),
                )
                .arg(config_arg())
                .arg(out_arg())
                .arg(seed_arg()),
        )
}

fn input_arg() -> Arg {
    Arg::new("input")
        .value_name("CSV")
        .value_parser(value_parser!(PathBuf))
        .help("Uploaded process chain table")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("TOML configuration file")
}

/// Everything after `--` is the scorer's argv, passed through unsplit
fn pipeline_arg() -> Arg {
    Arg::new("pipeline-cmd")
        .value_name("CMD")
        .num_args(1..)
        .last(true)
        .help("External scorer and its arguments, after `--`; reads CSV on stdin, writes CSV on stdout")
}

fn out_arg() -> Arg {
    Arg::new("out")
        .long("out")
        .short('o')
        .value_name("FILE.png")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Where to write the PNG")
}

fn seed_arg() -> Arg {
    Arg::new("seed")
        .long("seed")
        .value_parser(value_parser!(u64))
        .help("Layout seed (default 42)")
}
