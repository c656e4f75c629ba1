//! Error types for graph construction and build execution.

use refbuild_cache::CacheError;
use refbuild_common::InternalError;
use refbuild_vfs::VfsError;

/// Errors raised while ordering projects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Project references loop back on themselves.
    #[error("project references form a cycle: {}", .cycle.join(" -> "))]
    CycleDetected {
        /// Config paths along the cycle; the first entry is repeated last.
        cycle: Vec<String>,
    },
}

/// Failures of the harness itself while running a build.
///
/// Problems with the projects being built are diagnostics, not errors.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The command line could not be understood.
    #[error("invalid command line: {reason}")]
    InvalidCommand {
        /// What was wrong.
        reason: String,
    },

    /// A write to the virtual file system failed.
    #[error("failed to write {path}: {source}")]
    Vfs {
        /// Target path.
        path: String,
        /// Underlying error.
        source: VfsError,
    },

    /// Persisting build info failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The engine broke one of its own invariants.
    #[error(transparent)]
    Internal(#[from] InternalError),
}
