//! Procpath CLI - terminal front end for the process path dashboard
//!
//! ```text
//! procpath analyze upload.csv [--json] [-- python3 score.py --model "my model.pkl"]
//! procpath render upload.csv --rank 1 --out chain.png
//! procpath graph "explorer.exe → cmd.exe" --out chain.png
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod args;
pub mod commands;
pub mod logging;
pub mod report;

pub use args::build_cli;
pub use commands::{run, Outcome};
pub use report::DashboardReport;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
