//! Root file resolution: expanding `files`, `include` and `exclude`.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use refbuild_common::path;
use refbuild_vfs::Vfs;

use crate::error::ConfigError;
use crate::types::ProjectConfig;

/// Extensions that make a file a program input.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".mts", ".cts", ".d.ts"];

/// Directories excluded when a project does not specify `exclude`.
const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// The include pattern used when neither `files` nor `include` is given.
pub const DEFAULT_INCLUDE: &str = "**/*";

/// Why a file is a root of the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InclusionReason {
    /// Listed under `files`.
    FilesList,
    /// Matched an explicit `include` pattern (stored as written).
    IncludePattern(String),
    /// Matched the implicit `**/*` include.
    DefaultInclude,
}

/// A root file with the reason it is in the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFile {
    /// Absolute path.
    pub path: String,
    /// Why it was picked up.
    pub reason: InclusionReason,
}

/// Returns `true` if `file` has an extension the compiler consumes.
pub fn is_supported_source(file: &str) -> bool {
    SUPPORTED_EXTENSIONS.iter().any(|ext| file.ends_with(ext))
}

/// Returns `true` if `file` is a declaration file (no emit).
pub fn is_declaration_file(file: &str) -> bool {
    file.ends_with(".d.ts") || file.ends_with(".d.mts") || file.ends_with(".d.cts")
}

/// Sources whose output a declaration file of the same stem may be.
const DECLARATION_SOURCES: &[(&str, &[&str])] = &[
    (".d.ts", &[".ts", ".tsx"]),
    (".d.mts", &[".mts"]),
    (".d.cts", &[".cts"]),
];

/// A globbed declaration file loses to a globbed source of the same stem,
/// so a project without `outDir` never picks up its own declarations.
fn shadowed_by_source(candidate: &str, matched_keys: &[String], case_sensitive: bool) -> bool {
    DECLARATION_SOURCES.iter().any(|(declaration, sources)| {
        candidate.strip_suffix(declaration).is_some_and(|stem| {
            sources.iter().any(|ext| {
                matched_keys.contains(&path::key(&format!("{stem}{ext}"), case_sensitive))
            })
        })
    })
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains('*') || segment.contains('?')
}

/// A pattern without wildcards or extension in its last segment names a directory.
fn names_directory(pattern: &str) -> bool {
    let last = path::file_name(pattern.trim_end_matches('/'));
    !has_wildcard(last) && !last.contains('.')
}

fn build_set(
    patterns: &[String],
    directory_suffix: &str,
    case_sensitive: bool,
) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let trimmed = pattern.trim_start_matches("./").trim_end_matches('/');
        let mut variants = vec![trimmed.to_string()];
        if names_directory(trimmed) {
            variants.push(format!("{trimmed}/{directory_suffix}"));
        }
        for variant in variants {
            let glob = GlobBuilder::new(&variant)
                .literal_separator(true)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.kind().to_string(),
                })?;
            builder.add(glob);
        }
    }
    builder.build().map_err(|e| ConfigError::InvalidPattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}

/// Index of the original pattern behind a glob-set match.
///
/// Directory patterns contribute two globs, so glob indices are mapped back.
fn pattern_index(patterns: &[String], glob_index: usize) -> usize {
    let mut seen = 0;
    for (i, pattern) in patterns.iter().enumerate() {
        let trimmed = pattern.trim_start_matches("./").trim_end_matches('/');
        let width = if names_directory(trimmed) { 2 } else { 1 };
        if glob_index < seen + width {
            return i;
        }
        seen += width;
    }
    patterns.len().saturating_sub(1)
}

/// Returns the exclude patterns in effect for a project.
///
/// Without an explicit `exclude`, package directories and the `outDir` are
/// excluded so a project never compiles its own output.
pub fn effective_excludes(config: &ProjectConfig) -> Vec<String> {
    if let Some(exclude) = &config.exclude {
        return exclude.clone();
    }
    let mut excludes: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    if let Some(out_dir) = &config.options.out_dir {
        let relative = path::relative(config.directory(), out_dir, true);
        if !relative.starts_with("..") {
            excludes.push(relative);
        }
    }
    excludes
}

/// Returns the include patterns in effect and whether they are the default.
pub fn effective_includes(config: &ProjectConfig) -> (Vec<String>, bool) {
    match (&config.include, &config.files) {
        (Some(include), _) => (include.clone(), false),
        (None, None) => (vec![DEFAULT_INCLUDE.to_string()], true),
        (None, Some(_)) => (Vec::new(), false),
    }
}

/// Expands a project's `files`, `include` and `exclude` into root files.
///
/// Explicit `files` come first in the order written (missing ones are kept
/// so the build can report them), then every supported file under the
/// config directory that matches an include and no exclude, in path order.
/// A file appears once, with the first reason that selected it.
pub fn resolve_root_files(config: &ProjectConfig, fs: &Vfs) -> Result<Vec<RootFile>, ConfigError> {
    let case_sensitive = fs.is_case_sensitive();
    let base = config.directory();
    let mut roots: Vec<RootFile> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for file in config.files.iter().flatten() {
        let full = path::combine(base, file);
        let key = path::key(&full, case_sensitive);
        if !seen.contains(&key) {
            seen.push(key);
            roots.push(RootFile {
                path: full,
                reason: InclusionReason::FilesList,
            });
        }
    }

    let (includes, is_default) = effective_includes(config);
    if includes.is_empty() {
        return Ok(roots);
    }
    let include_set = build_set(&includes, "**/*", case_sensitive)?;
    let exclude_set = build_set(&effective_excludes(config), "**", case_sensitive)?;

    let mut matched: Vec<(&str, usize)> = Vec::new();
    for candidate in fs.files_under(base) {
        if !is_supported_source(candidate) {
            continue;
        }
        let relative = path::relative(base, candidate, case_sensitive);
        if exclude_set.is_match(&relative) {
            continue;
        }
        if let Some(glob_index) = include_set.matches(&relative).into_iter().min() {
            matched.push((candidate, glob_index));
        }
    }
    let matched_keys: Vec<String> = matched
        .iter()
        .map(|(candidate, _)| path::key(candidate, case_sensitive))
        .collect();

    for (candidate, glob_index) in matched {
        if shadowed_by_source(candidate, &matched_keys, case_sensitive) {
            continue;
        }
        let key = path::key(candidate, case_sensitive);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        let reason = if is_default {
            InclusionReason::DefaultInclude
        } else {
            InclusionReason::IncludePattern(includes[pattern_index(&includes, glob_index)].clone())
        };
        roots.push(RootFile {
            path: candidate.to_string(),
            reason,
        });
    }

    tracing::debug!(config = %config.path, count = roots.len(), "resolved root files");
    Ok(roots)
}

/// Returns the directory output paths are computed against.
///
/// An explicit `rootDir` wins. Composite projects default to the config
/// directory; other projects use the common directory of their emitting
/// sources.
pub fn effective_root_dir(config: &ProjectConfig, roots: &[RootFile], case_sensitive: bool) -> String {
    if let Some(root_dir) = &config.options.root_dir {
        return root_dir.clone();
    }
    if config.options.composite {
        return config.directory().to_string();
    }
    path::common_directory(
        roots
            .iter()
            .map(|r| r.path.as_str())
            .filter(|p| !is_declaration_file(p)),
        case_sensitive,
    )
    .unwrap_or_else(|| config.directory().to_string())
}
