//! Compiler-style diagnostics: codes, messages, reason chains and rendering.
//!
//! A [`Diagnostic`] carries a numeric `TSxxxx` code, a [`Severity`], a
//! formatted message, an optional file location, and a [`MessageChain`]
//! explaining *why* (for example, why a file is part of the program). The
//! [`messages`] catalog holds every message template the harness reports.
//! [`PlainRenderer`] produces the exact console text recorded in baselines.

#![warn(missing_docs)]

pub mod chain;
pub mod code;
pub mod diagnostic;
pub mod messages;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use chain::MessageChain;
pub use code::DiagnosticCode;
pub use diagnostic::{Diagnostic, Location};
pub use messages::Message;
pub use renderer::{error_summary, DiagnosticRenderer, PlainRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
