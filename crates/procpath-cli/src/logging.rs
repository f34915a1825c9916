//! Log output for the binary
//!
//! Logs go to stderr so stdout carries only the report.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "procpath=info";

/// Filter used with `--verbose`
pub const VERBOSE_FILTER: &str = "procpath=debug";

/// Choose the log filter: `--verbose` wins, then `RUST_LOG`, then the default
#[must_use]
pub fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber
///
/// # Errors
/// If a subscriber is already installed.
pub fn init(verbose: bool, json: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|err| anyhow::anyhow!("failed to install logger: {err}"))
}
