//! Per-invocation state shared by every build step.

use refbuild_cache::{BuildInfo, BuildStateStore};
use refbuild_common::path;
use refbuild_config::ProjectConfig;
use refbuild_diagnostics::Diagnostic;
use refbuild_vfs::{Vfs, WriteOutcome};

use crate::console::Console;
use crate::emit::{CommonJsEmitter, Emitter};
use crate::error::BuildError;

/// A file written during an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Absolute path.
    pub path: String,
    /// Whether the content changed.
    pub outcome: WriteOutcome,
}

/// Everything one invocation works with. Nothing outlives it except the
/// file system it borrows.
pub struct BuildContext<'fs> {
    /// The file system being built.
    pub fs: &'fs mut Vfs,
    /// Directory relative paths on the command line resolve against.
    pub current_directory: String,
    /// Build-info persistence, stamped with the tool version.
    pub store: BuildStateStore,
    /// Output generator.
    pub emitter: Box<dyn Emitter>,
    /// Console text produced so far.
    pub console: Console,
    /// Every file written, in write order.
    pub written: Vec<WrittenFile>,
    /// Every diagnostic reported, in report order.
    pub diagnostics: Vec<Diagnostic>,
}

impl<'fs> BuildContext<'fs> {
    /// Creates a context using the CommonJS emitter.
    pub fn new(fs: &'fs mut Vfs, current_directory: &str, version: &str) -> Self {
        let current_directory = path::normalize(current_directory);
        Self {
            fs,
            console: Console::new(&current_directory),
            current_directory,
            store: BuildStateStore::new(version),
            emitter: Box::new(CommonJsEmitter),
            written: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Replaces the emitter.
    pub fn with_emitter(mut self, emitter: impl Emitter + 'static) -> Self {
        self.emitter = Box::new(emitter);
        self
    }

    /// Returns `p` relative to the current directory, for console output.
    pub fn display_path(&self, p: &str) -> String {
        path::relative(&self.current_directory, p, self.fs.is_case_sensitive())
    }

    /// Prints a timestamped status line.
    pub fn status(&mut self, message: &str) {
        let now = self.fs.now();
        self.console.status(now, message);
    }

    /// Prints diagnostics and records them.
    pub fn report(&mut self, diagnostics: &[Diagnostic]) {
        self.console.report(self.fs, diagnostics);
        self.diagnostics.extend_from_slice(diagnostics);
    }

    /// Writes an output file and records the write.
    pub fn write_output(&mut self, p: &str, text: String) -> Result<WriteOutcome, BuildError> {
        let outcome = self.fs.write(p, text).map_err(|source| BuildError::Vfs {
            path: p.to_string(),
            source,
        })?;
        self.written.push(WrittenFile {
            path: path::normalize(p),
            outcome,
        });
        Ok(outcome)
    }

    /// Persists a project's build info and records the write.
    pub fn save_build_info(
        &mut self,
        config: &ProjectConfig,
        info: &BuildInfo,
    ) -> Result<WriteOutcome, BuildError> {
        let outcome = self.store.save(self.fs, config, info)?;
        self.written.push(WrittenFile {
            path: config.build_info_path(),
            outcome,
        });
        Ok(outcome)
    }
}
