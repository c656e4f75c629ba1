//! Common result and error types for the harness.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a bug in the harness, not a problem with the project under
/// test. Problems with the project (bad config, files outside `rootDir`) are
/// reported as diagnostics and the operation still returns `Ok`.
pub type RefbuildResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the harness, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal harness error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
