//! Error types for scenario loading, running and baseline files.

use std::path::PathBuf;

use refbuild_build::BuildError;
use refbuild_vfs::VfsError;

/// Failures that stop a scenario or a baseline check.
#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    /// A scenario or baseline file could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The scenario description is malformed or inconsistent.
    #[error("invalid scenario '{name}': {reason}")]
    Scenario {
        /// Scenario name, or the file it came from.
        name: String,
        /// What was wrong.
        reason: String,
    },

    /// A step edit could not be applied to the virtual file system.
    #[error("step {step}: cannot edit {path}: {source}")]
    Edit {
        /// One-based step number.
        step: usize,
        /// The path being edited.
        path: String,
        /// The underlying error.
        source: VfsError,
    },

    /// A step's command failed inside the harness.
    #[error("step {step}: {source}")]
    Command {
        /// One-based step number.
        step: usize,
        /// The underlying error.
        source: BuildError,
    },

    /// Rendering a build-info file for the transcript failed.
    #[error("cannot render build info {path}: {reason}")]
    Build {
        /// The build-info path.
        path: String,
        /// What went wrong.
        reason: String,
    },
}
