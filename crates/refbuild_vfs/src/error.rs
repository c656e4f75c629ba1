//! Error types for virtual file system access.

/// Errors returned by [`Vfs`](crate::Vfs) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VfsError {
    /// No file exists at the given path.
    #[error("file not found: {path}")]
    NotFound {
        /// The path that was looked up.
        path: String,
    },

    /// The path is not rooted at `/`.
    #[error("virtual paths must be absolute: {path}")]
    RelativePath {
        /// The offending path.
        path: String,
    },
}
