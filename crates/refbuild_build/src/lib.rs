//! Project-reference builds over the virtual file system.
//!
//! [`ProjectGraph`] loads a project and everything it references and orders
//! them. [`execute`] runs a command line: build mode (`--b`) walks the graph,
//! skipping projects whose build info shows they are up to date and
//! withholding outputs from projects with errors; direct mode (`-p`) compiles
//! one project and emits regardless. Every run works through an explicit
//! [`BuildContext`] and returns a [`BuildReport`].

#![warn(missing_docs)]

pub mod command;
pub mod console;
pub mod context;
pub mod emit;
pub mod engine;
pub mod error;
pub mod graph;
pub mod program;
pub mod status;

pub use command::{CommandLine, Mode};
pub use console::{timestamp, Console};
pub use context::{BuildContext, WrittenFile};
pub use emit::{CommonJsEmitter, Emitter};
pub use engine::{execute, BuildReport, ExitStatus, ProjectOutcome};
pub use error::{BuildError, GraphError};
pub use graph::{ProjectGraph, ProjectNode};
pub use program::Program;
pub use status::ProjectState;
