//! Configuration types deserialized from `tsconfig.json`.

use refbuild_common::path;
use serde::Deserialize;

/// The on-disk shape of a project file, before paths are resolved.
///
/// Unknown keys (`module`, `target`, `strict`, ...) are accepted and ignored:
/// they only matter to the real checker, not to build orchestration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    /// The `compilerOptions` object.
    #[serde(default)]
    pub compiler_options: CompilerOptions,
    /// Explicit root files.
    pub files: Option<Vec<String>>,
    /// Include patterns.
    pub include: Option<Vec<String>>,
    /// Exclude patterns.
    pub exclude: Option<Vec<String>>,
    /// Project references.
    #[serde(default)]
    pub references: Vec<RawReference>,
}

/// A `references` entry as written.
#[derive(Debug, Deserialize)]
pub struct RawReference {
    /// Path to the referenced project directory or config file.
    pub path: String,
}

/// The compiler options that influence build orchestration and emit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Output directory. Absolute after loading.
    pub out_dir: Option<String>,
    /// Root of the source tree. Absolute after loading.
    pub root_dir: Option<String>,
    /// Marks the project as referenceable; implies declarations and incremental state.
    #[serde(default)]
    pub composite: bool,
    /// Emit `.d.ts` files.
    #[serde(default)]
    pub declaration: bool,
    /// Persist build info in direct compile mode too.
    #[serde(default)]
    pub incremental: bool,
    /// Skip writing JavaScript and declaration outputs.
    #[serde(default)]
    pub no_emit: bool,
    /// Explicit buildinfo location. Absolute after loading.
    pub ts_build_info_file: Option<String>,
}

impl CompilerOptions {
    /// Returns `true` if declaration files are produced.
    pub fn emits_declarations(&self) -> bool {
        self.declaration || self.composite
    }

    /// Returns `true` if direct compile mode persists build info.
    pub fn is_incremental(&self) -> bool {
        self.incremental || self.composite
    }
}

/// A resolved reference to another project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReference {
    /// Absolute path of the referenced config file.
    pub path: String,
    /// The path as written in `references`.
    pub original: String,
}

/// A loaded project with every path made absolute.
///
/// The config path is the project's identity throughout the build.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Absolute path of the config file.
    pub path: String,
    /// Compiler options with absolute directories.
    pub options: CompilerOptions,
    /// `files` entries as written.
    pub files: Option<Vec<String>>,
    /// `include` patterns as written.
    pub include: Option<Vec<String>>,
    /// `exclude` patterns as written.
    pub exclude: Option<Vec<String>>,
    /// Referenced projects in declaration order.
    pub references: Vec<ProjectReference>,
}

impl ProjectConfig {
    /// Returns the directory containing the config file.
    pub fn directory(&self) -> &str {
        path::directory_of(&self.path)
    }

    /// Returns the config file name without its `.json` extension.
    pub fn stem(&self) -> &str {
        let name = path::file_name(&self.path);
        name.strip_suffix(".json").unwrap_or(name)
    }

    /// Returns the path of the incremental build-info file.
    ///
    /// `tsBuildInfoFile` wins; otherwise `<outDir>/<stem>.tsbuildinfo`, falling
    /// back to the config directory when there is no `outDir`.
    pub fn build_info_path(&self) -> String {
        if let Some(explicit) = &self.options.ts_build_info_file {
            return explicit.clone();
        }
        let dir = self
            .options
            .out_dir
            .as_deref()
            .unwrap_or_else(|| self.directory());
        path::combine(dir, &format!("{}.tsbuildinfo", self.stem()))
    }
}
