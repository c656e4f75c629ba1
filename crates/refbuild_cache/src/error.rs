//! Error types for build-state operations.

use refbuild_vfs::VfsError;

/// Errors that can occur while reading or writing build info.
///
/// Loading is fail-safe: a missing or corrupt record is a cache miss, not an
/// error. This enum surfaces when a caller asks for the error explicitly
/// (parsing) or when persisting fails.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The virtual file system rejected a read or write.
    #[error("build info I/O error at {path}: {source}")]
    Vfs {
        /// The build-info path.
        path: String,
        /// The underlying file system error.
        source: VfsError,
    },

    /// The build-info text is not a valid record.
    #[error("failed to parse build info {path}: {reason}")]
    Parse {
        /// The build-info path.
        path: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// A record could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
