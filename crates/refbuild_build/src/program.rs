//! Program construction: root files, options diagnostics and emit.

use refbuild_common::path;
use refbuild_config::resolve::{effective_excludes, effective_includes, is_declaration_file};
use refbuild_config::{effective_root_dir, resolve_root_files, InclusionReason, ProjectConfig, RootFile};
use refbuild_diagnostics::messages::{
    FILE_IS_IN_PROGRAM_BECAUSE, FILE_NOT_FOUND, FILE_NOT_UNDER_ROOT_DIR,
    MATCHED_BY_DEFAULT_INCLUDE_PATTERN, MATCHED_BY_INCLUDE_PATTERN, NO_INPUTS_FOUND,
    PART_OF_FILES_LIST, REFERENCED_PROJECT_MUST_BE_COMPOSITE,
};
use refbuild_diagnostics::{Diagnostic, DiagnosticSink, MessageChain};
use refbuild_vfs::Vfs;

use crate::emit::{output_paths, Emitter};
use crate::graph::config_error_diagnostic;

/// A project's program: its root files and the diagnostics building it
/// produced.
#[derive(Debug, Clone)]
pub struct Program {
    /// Root files in program order.
    pub roots: Vec<RootFile>,
    /// Directory outputs are laid out against.
    pub root_dir: String,
    /// Diagnostics in report order.
    pub diagnostics: Vec<Diagnostic>,
}

/// An emitted file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// Absolute output path.
    pub path: String,
    /// Output text.
    pub text: String,
}

fn inclusion_chain(reason: &InclusionReason, config_display: &str) -> MessageChain {
    let detail = match reason {
        InclusionReason::FilesList => PART_OF_FILES_LIST.format(&[config_display]),
        InclusionReason::IncludePattern(pattern) => {
            MATCHED_BY_INCLUDE_PATTERN.format(&[pattern, config_display])
        }
        InclusionReason::DefaultInclude => MATCHED_BY_DEFAULT_INCLUDE_PATTERN.format(&[]),
    };
    MessageChain::new(FILE_IS_IN_PROGRAM_BECAUSE.format(&[])).with_child(MessageChain::new(detail))
}

fn json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

impl Program {
    /// Builds the program of `config`.
    ///
    /// `references` are the loaded configs of the projects it references;
    /// `config_display` is how the config is named in reason chains.
    pub fn create(
        fs: &Vfs,
        config: &ProjectConfig,
        references: &[&ProjectConfig],
        config_display: &str,
    ) -> Self {
        let cs = fs.is_case_sensitive();
        let sink = DiagnosticSink::new();

        let roots = match resolve_root_files(config, fs) {
            Ok(roots) => roots,
            Err(e) => {
                sink.emit(config_error_diagnostic(&e));
                Vec::new()
            }
        };

        for reference in references {
            if !reference.options.composite {
                sink.emit(REFERENCED_PROJECT_MUST_BE_COMPOSITE.diagnostic(&[&reference.path]));
            }
        }

        if roots.is_empty() && sink.diagnostics().is_empty() {
            let (includes, _) = effective_includes(config);
            let excludes = config.exclude.clone().unwrap_or_default();
            sink.emit(NO_INPUTS_FOUND.diagnostic(&[
                &config.path,
                &json_list(&includes),
                &json_list(&excludes),
            ]));
        }

        for root in roots.iter().filter(|r| !fs.exists(&r.path)) {
            sink.emit(FILE_NOT_FOUND.diagnostic(&[&root.path]));
        }

        let root_dir = effective_root_dir(config, &roots, cs);
        if config.options.root_dir.is_some() || config.options.composite {
            for root in &roots {
                if is_declaration_file(&root.path) || path::is_under(&root_dir, &root.path, cs) {
                    continue;
                }
                sink.emit(
                    FILE_NOT_UNDER_ROOT_DIR
                        .diagnostic(&[&root.path, &root_dir])
                        .with_chain(inclusion_chain(&root.reason, config_display)),
                );
            }
        }

        tracing::debug!(
            config = %config.path,
            roots = roots.len(),
            errors = sink.error_count(),
            excludes = ?effective_excludes(config),
            "created program"
        );

        Self {
            roots,
            root_dir,
            diagnostics: sink.take_all(),
        }
    }

    /// Returns `true` if any error was reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns the absolute root paths.
    pub fn root_paths(&self) -> Vec<String> {
        self.roots.iter().map(|r| r.path.clone()).collect()
    }

    /// Produces the outputs of every root file, JavaScript before its
    /// declaration, in root order. Nothing is emitted under `noEmit`.
    pub fn emit(&self, fs: &Vfs, config: &ProjectConfig, emitter: &dyn Emitter) -> Vec<EmittedFile> {
        if config.options.no_emit {
            return Vec::new();
        }
        let cs = fs.is_case_sensitive();
        let mut emitted = Vec::new();
        for root in &self.roots {
            let Some(outputs) = output_paths(config, &self.root_dir, &root.path, cs) else {
                continue;
            };
            let Ok(source) = fs.read(&root.path) else {
                continue;
            };
            emitted.push(EmittedFile {
                path: outputs.js,
                text: emitter.emit_js(source),
            });
            if let Some(declaration) = outputs.declaration {
                emitted.push(EmittedFile {
                    path: declaration,
                    text: emitter.emit_declaration(source),
                });
            }
        }
        emitted
    }
}
