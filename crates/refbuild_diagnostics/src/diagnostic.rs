//! Structured diagnostic messages with codes, locations and reason chains.

use crate::chain::MessageChain;
use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A byte range in a virtual file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Absolute virtual path of the file.
    pub file: String,
    /// Byte offset of the first character.
    pub start: u32,
    /// Length of the range in bytes.
    pub length: u32,
}

/// A diagnostic produced while building a project.
///
/// Options-level problems (a file outside `rootDir`, an unreadable config)
/// have no [`Location`]. The `chain` explains the context, for example which
/// include pattern pulled a file into the program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the kind of diagnostic.
    pub code: DiagnosticCode,
    /// The fully formatted headline.
    pub message: String,
    /// Where the problem is, when it is tied to file text.
    pub location: Option<Location>,
    /// Explanation lines rendered under the headline.
    pub chain: Vec<MessageChain>,
}

impl Diagnostic {
    /// Creates a diagnostic with the given severity, code and message.
    pub fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
            chain: Vec::new(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Attaches a file location.
    pub fn with_location(mut self, file: impl Into<String>, start: u32, length: u32) -> Self {
        self.location = Some(Location {
            file: file.into(),
            start,
            length,
        });
        self
    }

    /// Appends an explanation chain.
    pub fn with_chain(mut self, chain: MessageChain) -> Self {
        self.chain.push(chain);
        self
    }

    /// Returns `true` if this diagnostic fails the build.
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}
