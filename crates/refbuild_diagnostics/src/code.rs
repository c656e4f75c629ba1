//! Numeric diagnostic codes displayed with the `TS` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A diagnostic code such as `TS6059`.
///
/// Codes are stable identifiers: baselines and tests match on them, so a
/// message's wording may change while its code stays put.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode(pub u32);

impl DiagnosticCode {
    /// Returns the bare number.
    pub fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TS{}", self.0)
    }
}
