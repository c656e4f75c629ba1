//! Catalog of every message the harness reports.
//!
//! Templates use positional `{0}`, `{1}` placeholders. Status messages
//! (`Severity::Message`) are printed as timestamped console lines in verbose
//! build mode; error templates become [`Diagnostic`]s.

use crate::code::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// A message template with its code and default severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message {
    /// Numeric code.
    pub code: u32,
    /// Default severity.
    pub severity: Severity,
    /// Template text with `{n}` placeholders.
    pub template: &'static str,
}

impl Message {
    const fn new(code: u32, severity: Severity, template: &'static str) -> Self {
        Self {
            code,
            severity,
            template,
        }
    }

    /// Substitutes `args` into the template.
    pub fn format(&self, args: &[&str]) -> String {
        let mut text = self.template.to_string();
        for (i, arg) in args.iter().enumerate() {
            text = text.replace(&format!("{{{i}}}"), arg);
        }
        text
    }

    /// Builds a diagnostic from this template.
    pub fn diagnostic(&self, args: &[&str]) -> Diagnostic {
        Diagnostic::new(self.severity, DiagnosticCode(self.code), self.format(args))
    }
}

use Severity::{Error, Message as Info};

// Program construction.

/// A source file outside the configured `rootDir`.
pub const FILE_NOT_UNDER_ROOT_DIR: Message = Message::new(
    6059,
    Error,
    "File '{0}' is not under 'rootDir' '{1}'. 'rootDir' is expected to contain all source files.",
);
/// Head of a file-inclusion explanation.
pub const FILE_IS_IN_PROGRAM_BECAUSE: Message =
    Message::new(1393, Info, "The file is in the program because:");
/// A file matched the implicit `**/*` include.
pub const MATCHED_BY_DEFAULT_INCLUDE_PATTERN: Message =
    Message::new(1457, Info, "Matched by default include pattern '**/*'");
/// A file matched an explicit include pattern.
pub const MATCHED_BY_INCLUDE_PATTERN: Message =
    Message::new(1407, Info, "Matched by include pattern '{0}' in '{1}'");
/// A file listed under `files`.
pub const PART_OF_FILES_LIST: Message = Message::new(1409, Info, "Part of 'files' list in {0}");
/// A root file that does not exist.
pub const FILE_NOT_FOUND: Message = Message::new(6053, Error, "File '{0}' not found.");
/// Include/exclude resolution produced no files.
pub const NO_INPUTS_FOUND: Message = Message::new(
    18003,
    Error,
    "No inputs were found in config file '{0}'. Specified 'include' paths were '{1}' and 'exclude' paths were '{2}'.",
);

// Configuration.

/// The config file is missing.
pub const CANNOT_READ_FILE: Message = Message::new(5083, Error, "Cannot read file '{0}'.");
/// The config file is not valid JSON for a project.
pub const FAILED_TO_PARSE_FILE: Message =
    Message::new(5014, Error, "Failed to parse file '{0}': {1}.");
/// An include or exclude pattern does not compile.
pub const INVALID_PATTERN: Message =
    Message::new(5010, Error, "File specification '{0}' is not valid: {1}.");
/// A referenced project without `composite`.
pub const REFERENCED_PROJECT_MUST_BE_COMPOSITE: Message = Message::new(
    6306,
    Error,
    "Referenced project '{0}' must have setting \"composite\": true.",
);
/// References that loop back on themselves.
pub const PROJECT_REFERENCE_CYCLE: Message = Message::new(
    6202,
    Error,
    "Project references may not form a circular graph. Cycle detected: {0}",
);

// Build-mode status.

/// Header listing the build order.
pub const PROJECTS_IN_THIS_BUILD: Message = Message::new(6355, Info, "Projects in this build: {0}");
/// No buildinfo on disk.
pub const OUT_OF_DATE_OUTPUT_MISSING: Message = Message::new(
    6352,
    Info,
    "Project '{0}' is out of date because output file '{1}' does not exist",
);
/// An input is newer than the buildinfo.
pub const OUT_OF_DATE_OUTPUT_OLDER: Message = Message::new(
    6350,
    Info,
    "Project '{0}' is out of date because output '{1}' is older than input '{2}'",
);
/// The buildinfo was written by another tool version.
pub const OUT_OF_DATE_VERSION: Message = Message::new(
    6381,
    Info,
    "Project '{0}' is out of date because output for it was generated with version '{1}' that differs with current version '{2}'",
);
/// The previous build recorded errors.
pub const OUT_OF_DATE_ERRORS: Message = Message::new(
    6419,
    Info,
    "Project '{0}' is out of date because buildinfo file '{1}' indicates that program needs to report errors.",
);
/// A previous root file left the program.
pub const OUT_OF_DATE_ROOT_REMOVED: Message = Message::new(
    6420,
    Info,
    "Project '{0}' is out of date because buildinfo file '{1}' indicates that file '{2}' was root file of compilation but not any more.",
);
/// A new root file joined the program.
pub const OUT_OF_DATE_ROOT_ADDED: Message = Message::new(
    6421,
    Info,
    "Project '{0}' is out of date because buildinfo file '{1}' indicates that file '{2}' is not part of the previous compilation.",
);
/// An input file disappeared.
pub const OUT_OF_DATE_INPUT_MISSING: Message = Message::new(
    6423,
    Info,
    "Project '{0}' is out of date because input '{1}' does not exist",
);
/// Nothing to do.
pub const UP_TO_DATE: Message = Message::new(
    6361,
    Info,
    "Project '{0}' is up to date because newest input '{1}' is older than output '{2}'",
);
/// A build is starting.
pub const BUILDING_PROJECT: Message = Message::new(6358, Info, "Building project '{0}'...");
/// A dependency failed.
pub const SKIPPING_BUILD_DEPENDENCY_ERRORS: Message = Message::new(
    6362,
    Info,
    "Skipping build of project '{0}' because its dependency '{1}' has errors",
);
/// A dependency was itself skipped.
pub const SKIPPING_BUILD_DEPENDENCY_NOT_BUILT: Message = Message::new(
    6382,
    Info,
    "Skipping build of project '{0}' because its dependency '{1}' was not built",
);
/// A forced rebuild.
pub const FORCING_BUILD: Message = Message::new(
    6388,
    Info,
    "Project '{0}' is being forcibly rebuilt",
);

// Summary.

/// One error in the whole invocation.
pub const FOUND_ONE_ERROR: Message = Message::new(6259, Info, "Found 1 error.");
/// Several errors in the whole invocation.
pub const FOUND_N_ERRORS: Message = Message::new(6194, Info, "Found {0} errors.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_positional() {
        let text = FILE_NOT_UNDER_ROOT_DIR.format(&["/p/types/type.ts", "/p/src"]);
        assert_eq!(
            text,
            "File '/p/types/type.ts' is not under 'rootDir' '/p/src'. 'rootDir' is expected to contain all source files."
        );
    }

    #[test]
    fn repeated_and_missing_args() {
        let m = Message::new(1, Info, "{0} and {0} but {1}");
        assert_eq!(m.format(&["a"]), "a and a but {1}");
    }

    #[test]
    fn diagnostic_carries_code_and_severity() {
        let diag = FILE_NOT_FOUND.diagnostic(&["/p/a.ts"]);
        assert_eq!(diag.code, DiagnosticCode(6053));
        assert!(diag.is_error());
        assert_eq!(diag.message, "File '/p/a.ts' not found.");
    }

    #[test]
    fn status_messages_are_informational() {
        assert!(!BUILDING_PROJECT.diagnostic(&["/p/tsconfig.json"]).is_error());
        assert_eq!(
            OUT_OF_DATE_ERRORS.format(&["tsconfig.json", "dist/tsconfig.tsbuildinfo"]),
            "Project 'tsconfig.json' is out of date because buildinfo file 'dist/tsconfig.tsbuildinfo' indicates that program needs to report errors."
        );
    }
}
