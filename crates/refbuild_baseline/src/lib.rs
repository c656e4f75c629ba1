//! Golden-transcript verification for incremental builds.
//!
//! A [`Scenario`] describes a virtual project and a sequence of command
//! lines, each optionally preceded by file edits. [`run`] plays the steps
//! against a fresh file system and collects a [`Transcript`]: inputs, console
//! output, every written file, and exit statuses. [`compare`] diffs two
//! transcripts line by line after timestamps have been normalized, and
//! [`verify_baseline`] checks a transcript against a reference file on disk.

#![warn(missing_docs)]

pub mod compare;
pub mod error;
pub mod runner;
pub mod scenario;
pub mod transcript;

pub use compare::{accept_baseline, compare, normalize, verify_baseline, Mismatch, Verdict};
pub use error::BaselineError;
pub use runner::{run, run_with};
pub use scenario::{Edit, Scenario, Step};
pub use transcript::{BuildRun, InputFile, OutputFile, Transcript};
