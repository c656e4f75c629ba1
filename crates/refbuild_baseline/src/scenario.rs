//! Scenario descriptions loaded from TOML.
//!
//! ```toml
//! name = "rootdir-file-outside-root"
//! current_directory = "/home/src/workspaces/project"
//!
//! [files]
//! "src/index.ts" = "export const x = 10;"
//!
//! [[steps]]
//! command = "tsc --b -v"
//!
//! [[steps]]
//! description = "edit source"
//! command = "tsc --b -v"
//! edits = [{ kind = "append", path = "src/index.ts", content = "\nexport const y = 1;" }]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use refbuild_build::CommandLine;
use refbuild_common::path;
use refbuild_vfs::Vfs;
use serde::Deserialize;

use crate::error::BaselineError;

fn default_current_directory() -> String {
    "/home/src/workspaces/project".to_string()
}

fn default_version() -> String {
    "FakeTSVersion".to_string()
}

/// A virtual project and the commands run against it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Name; also the baseline file stem.
    pub name: String,
    /// Directory commands run in. Relative file paths resolve against it.
    #[serde(default = "default_current_directory")]
    pub current_directory: String,
    /// Whether the virtual file system compares paths case-sensitively.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Tool version stamped into build info.
    #[serde(default = "default_version")]
    pub version: String,
    /// Initial files, path to content.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One command, with the edits applied before it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Shown as the `Change::` heading of every step but the first.
    pub description: Option<String>,
    /// Edits applied before the command, in order.
    #[serde(default)]
    pub edits: Vec<Edit>,
    /// The command line, tool name first.
    pub command: String,
}

/// A change to the virtual file system between steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Edit {
    /// Replace (or create) a file.
    Write {
        /// Target path.
        path: String,
        /// New content.
        content: String,
    },
    /// Add text to the end of an existing file.
    Append {
        /// Target path.
        path: String,
        /// Text to add.
        content: String,
    },
    /// Delete a file.
    Remove {
        /// Target path.
        path: String,
    },
    /// Bump a file's modification time.
    Touch {
        /// Target path.
        path: String,
    },
}

impl Edit {
    /// Returns the path the edit targets, as written.
    pub fn path(&self) -> &str {
        match self {
            Edit::Write { path, .. }
            | Edit::Append { path, .. }
            | Edit::Remove { path }
            | Edit::Touch { path } => path,
        }
    }
}

impl Scenario {
    /// Loads a scenario file.
    pub fn load(path: &Path) -> Result<Self, BaselineError> {
        let text = std::fs::read_to_string(path).map_err(|source| BaselineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|e| match e {
            BaselineError::Scenario { name, reason } if name.is_empty() => BaselineError::Scenario {
                name: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parses and validates a scenario from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, BaselineError> {
        let scenario: Scenario = toml::from_str(text).map_err(|e| BaselineError::Scenario {
            name: String::new(),
            reason: e.to_string(),
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn invalid(&self, reason: impl Into<String>) -> BaselineError {
        BaselineError::Scenario {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn validate(&self) -> Result<(), BaselineError> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("name must not be empty"));
        }
        if !path::is_rooted(&self.current_directory) {
            return Err(self.invalid(format!(
                "current_directory '{}' must be absolute",
                self.current_directory
            )));
        }
        if self.steps.is_empty() {
            return Err(self.invalid("at least one step is required"));
        }
        for (i, step) in self.steps.iter().enumerate() {
            CommandLine::parse_command(&step.command)
                .and_then(|cmd| cmd.mode())
                .map_err(|e| self.invalid(format!("step {}: {e}", i + 1)))?;
        }
        Ok(())
    }

    /// Resolves a scenario path against the current directory.
    pub fn resolve(&self, p: &str) -> String {
        path::combine(&self.current_directory, p)
    }

    /// Creates the initial file system. Files are written in path order, one
    /// clock tick apart.
    pub fn seed(&self) -> Result<Vfs, BaselineError> {
        let mut fs = Vfs::new(self.case_sensitive);
        for (p, content) in &self.files {
            fs.write(&self.resolve(p), content.as_str())
                .map_err(|_| self.invalid(format!("cannot seed file '{p}'")))?;
        }
        Ok(fs)
    }
}
