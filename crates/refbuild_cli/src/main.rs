//! refbuild: incremental project-reference builds.
//!
//! `refbuild --b [config...] [-v] [-f]` builds projects and their references,
//! `refbuild -p <config>` compiles one project directly. Either way the
//! project tree is loaded from disk into a virtual file system, built, and
//! the written files are copied back. `refbuild --baseline <scenario.toml>`
//! runs a scenario in memory and checks it against its reference baseline.

#![warn(missing_docs)]

mod baseline;
mod disk;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use refbuild_build::CommandLine;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "REFBUILD_LOG";

/// refbuild: incremental builds with project references.
#[derive(Parser, Debug)]
#[command(name = "refbuild", version, about = "Incremental project-reference builds")]
pub struct Cli {
    /// Build or compile flags.
    #[command(flatten)]
    pub command: CommandLine,

    /// Directory tree to load. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Version recorded in build info.
    #[arg(long, value_name = "VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub tool_version: String,

    /// Run a scenario and compare it with its reference baseline.
    #[arg(long, value_name = "SCENARIO", conflicts_with_all = ["build", "project"])]
    pub baseline: Option<PathBuf>,

    /// Directory of reference baselines. Defaults to `baselines/reference`
    /// beside the scenario's directory.
    #[arg(long, value_name = "DIR", requires = "baseline")]
    pub reference_dir: Option<PathBuf>,

    /// Store the produced transcript as the new reference baseline.
    #[arg(long, requires = "baseline")]
    pub accept: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match &cli.baseline {
        Some(scenario) => baseline::run(scenario, cli.reference_dir.as_deref(), cli.accept),
        None => disk::run(&cli),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
