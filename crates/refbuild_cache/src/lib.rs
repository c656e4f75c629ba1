//! Incremental build state: the per-project build-info record.
//!
//! A [`BuildInfo`] remembers the root files, error flag and tool version of
//! a project's last build. [`BuildStateStore`] persists it next to the
//! project's outputs, and [`staleness`] decides from it whether the next
//! build can be skipped.

#![warn(missing_docs)]

pub mod buildinfo;
pub mod error;
pub mod staleness;
pub mod store;

pub use buildinfo::BuildInfo;
pub use error::CacheError;
pub use staleness::{staleness, OutOfDateReason, Staleness, StalenessInputs};
pub use store::BuildStateStore;
