//! Shared foundational types used across the refbuild harness.
//!
//! This crate provides content hashing for no-op write detection, slash-path
//! arithmetic over virtual file system paths, and the common internal result type.

#![warn(missing_docs)]

pub mod hash;
pub mod path;
pub mod result;

pub use hash::ContentHash;
pub use result::{InternalError, RefbuildResult};
