//! Error types for configuration loading and validation.

use refbuild_vfs::VfsError;

/// Errors that make a project configuration unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read file '{path}'")]
    Read {
        /// The config path.
        path: String,
        /// The underlying file system error.
        source: VfsError,
    },

    /// The config file is not a valid project description.
    #[error("failed to parse file '{path}': {reason}")]
    Parse {
        /// The config path.
        path: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// An `include` or `exclude` pattern could not be compiled.
    #[error("file specification '{pattern}' is not valid: {reason}")]
    InvalidPattern {
        /// The offending pattern as written.
        pattern: String,
        /// Description of the failure.
        reason: String,
    },
}
