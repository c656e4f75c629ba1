//! In-memory virtual file system that every build step reads and writes.
//!
//! The [`Vfs`] maps absolute `/`-separated paths to [`VirtualFile`]s carrying
//! text content, a modification time from a monotonic virtual clock, and a
//! content hash. Case sensitivity is a per-instance setting, mirroring the
//! host file system the scenario pretends to run on.

#![warn(missing_docs)]

pub mod error;
pub mod file;
pub mod vfs;

pub use error::VfsError;
pub use file::VirtualFile;
pub use vfs::{Vfs, WriteOutcome};
