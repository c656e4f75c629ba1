//! The compiler-style command line accepted by the engine.

use clap::{Args, Parser};

use crate::error::BuildError;

/// Flags selecting how a build runs.
///
/// Mirrors the subset of compiler flags the harness understands:
/// `--b [config...]` for build mode, `-p <config>` for direct mode.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    /// Build the given projects and everything they reference.
    #[arg(short = 'b', long = "build", visible_alias = "b", num_args = 0.., value_name = "CONFIG")]
    pub build: Option<Vec<String>>,

    /// Compile a single project directly.
    #[arg(short = 'p', long = "project", value_name = "CONFIG")]
    pub project: Option<String>,

    /// Report project status while building.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Rebuild every project regardless of its build info.
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

/// Parser for a full command string such as `tsc --b -v`.
#[derive(Parser, Debug)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Invocation {
    #[command(flatten)]
    command: CommandLine,
}

/// What a command line asks the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Build mode over these config specs, in command-line order.
    Build {
        /// Config files or directories as written.
        configs: Vec<String>,
    },
    /// Direct compilation of one config.
    Direct {
        /// Config file or directory as written.
        config: String,
    },
}

impl CommandLine {
    /// Parses a whitespace-separated command whose first word is the tool name.
    pub fn parse_command(command: &str) -> Result<Self, BuildError> {
        Invocation::try_parse_from(command.split_whitespace())
            .map(|inv| inv.command)
            .map_err(|e| BuildError::InvalidCommand {
                reason: e.to_string().lines().next().unwrap_or_default().to_string(),
            })
    }

    /// Returns the requested mode. Without flags the current directory's
    /// project is compiled directly.
    pub fn mode(&self) -> Result<Mode, BuildError> {
        match (&self.build, &self.project) {
            (Some(_), Some(_)) => Err(BuildError::InvalidCommand {
                reason: "'--build' cannot be combined with '--project'".to_string(),
            }),
            (Some(configs), None) if configs.is_empty() => Ok(Mode::Build {
                configs: vec![".".to_string()],
            }),
            (Some(configs), None) => Ok(Mode::Build {
                configs: configs.clone(),
            }),
            (None, Some(config)) => Ok(Mode::Direct {
                config: config.clone(),
            }),
            (None, None) => Ok(Mode::Direct {
                config: ".".to_string(),
            }),
        }
    }
}
