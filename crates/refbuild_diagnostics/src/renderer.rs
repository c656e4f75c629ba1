//! Rendering diagnostics into the console text recorded in baselines.

use refbuild_common::path;
use refbuild_vfs::Vfs;

use crate::diagnostic::Diagnostic;
use crate::messages::{FOUND_N_ERRORS, FOUND_ONE_ERROR};

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic, including its trailing newline.
    fn render(&self, diag: &Diagnostic, fs: &Vfs) -> String;
}

/// Renders diagnostics in the compiler's plain (non-pretty) format.
///
/// ```text
/// src/a.ts(3,7): error TS2322: Type 'string' is not assignable to type 'number'.
/// error TS6059: File '/p/types/type.ts' is not under 'rootDir' '/p/src'. ...
///   The file is in the program because:
///     Matched by default include pattern '**/*'
/// ```
///
/// File locations are shown relative to the current directory.
#[derive(Debug, Clone)]
pub struct PlainRenderer {
    /// Directory locations are made relative to.
    pub current_directory: String,
}

impl PlainRenderer {
    /// Creates a renderer for the given current directory.
    pub fn new(current_directory: impl Into<String>) -> Self {
        Self {
            current_directory: current_directory.into(),
        }
    }
}

impl DiagnosticRenderer for PlainRenderer {
    fn render(&self, diag: &Diagnostic, fs: &Vfs) -> String {
        let mut out = String::new();

        if let Some(location) = &diag.location {
            let shown = path::relative(
                &self.current_directory,
                &location.file,
                fs.is_case_sensitive(),
            );
            match fs.file(&location.file) {
                Ok(file) => {
                    let (line, col) = file.line_col(location.start);
                    out.push_str(&format!("{shown}({line},{col}): "));
                }
                Err(_) => out.push_str(&format!("{shown}: ")),
            }
        }

        out.push_str(&format!("{} {}: {}\n", diag.severity, diag.code, diag.message));

        for chain in &diag.chain {
            for (depth, text) in chain.flatten() {
                let indent = "  ".repeat(depth + 1);
                out.push_str(&format!("{indent}{text}\n"));
            }
        }

        out
    }
}

/// Returns the closing `Found N errors.` line, or `None` when there were none.
pub fn error_summary(error_count: usize) -> Option<String> {
    match error_count {
        0 => None,
        1 => Some(FOUND_ONE_ERROR.format(&[])),
        n => Some(FOUND_N_ERRORS.format(&[&n.to_string()])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MessageChain;
    use crate::code::DiagnosticCode;
    use crate::messages::{
        FILE_IS_IN_PROGRAM_BECAUSE, FILE_NOT_UNDER_ROOT_DIR, MATCHED_BY_DEFAULT_INCLUDE_PATTERN,
    };

    #[test]
    fn render_options_diagnostic_with_chain() {
        let fs = Vfs::new(false);
        let diag = FILE_NOT_UNDER_ROOT_DIR
            .diagnostic(&["/p/types/type.ts", "/p/src"])
            .with_chain(
                MessageChain::new(FILE_IS_IN_PROGRAM_BECAUSE.format(&[]))
                    .with_child(MessageChain::new(MATCHED_BY_DEFAULT_INCLUDE_PATTERN.format(&[]))),
            );
        let output = PlainRenderer::new("/p").render(&diag, &fs);
        assert_eq!(
            output,
            "error TS6059: File '/p/types/type.ts' is not under 'rootDir' '/p/src'. 'rootDir' is expected to contain all source files.\n\
             \x20 The file is in the program because:\n\
             \x20   Matched by default include pattern '**/*'\n"
        );
    }

    #[test]
    fn render_located_diagnostic() {
        let mut fs = Vfs::new(true);
        fs.write("/p/src/a.ts", "let a = 1;\nlet b: number = 'x';\n").unwrap();
        let diag = Diagnostic::error(DiagnosticCode(2322), "Type 'string' is not assignable to type 'number'.")
            .with_location("/p/src/a.ts", 15, 1);
        let output = PlainRenderer::new("/p").render(&diag, &fs);
        assert_eq!(
            output,
            "src/a.ts(2,5): error TS2322: Type 'string' is not assignable to type 'number'.\n"
        );
    }

    #[test]
    fn render_location_in_missing_file() {
        let fs = Vfs::new(true);
        let diag = Diagnostic::error(DiagnosticCode(1), "gone").with_location("/p/x.ts", 0, 0);
        let output = PlainRenderer::new("/p").render(&diag, &fs);
        assert_eq!(output, "x.ts: error TS1: gone\n");
    }

    #[test]
    fn summary_lines() {
        assert_eq!(error_summary(0), None);
        assert_eq!(error_summary(1).as_deref(), Some("Found 1 error."));
        assert_eq!(error_summary(3).as_deref(), Some("Found 3 errors."));
    }
}
