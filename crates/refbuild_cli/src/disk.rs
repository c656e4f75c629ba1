//! Building a project tree that lives on disk.
//!
//! The tree is copied into a [`Vfs`] with its real modification times
//! (seconds since the Unix epoch), built there, and every file the build
//! wrote is copied back.

use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use refbuild_build::{execute, BuildContext, BuildReport, CommandLine};
use refbuild_vfs::Vfs;

use crate::Cli;

/// Directories never loaded.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "target"];

/// Extensions of files the build reads or may overwrite.
const LOADED_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "mts", "cts", "js", "mjs", "cjs", "json", "tsbuildinfo",
];

/// Converts a host path to a virtual `/`-separated absolute path.
pub fn to_virtual(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                out.push('/');
                out.push_str(&prefix.as_os_str().to_string_lossy());
            }
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => out.push_str("/.."),
            Component::Normal(segment) => {
                out.push('/');
                out.push_str(&segment.to_string_lossy());
            }
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Converts a virtual path back to a host path.
pub fn to_disk(virtual_path: &str) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(virtual_path.trim_start_matches('/'))
    } else {
        PathBuf::from(virtual_path)
    }
}

fn modified_secs(path: &Path) -> u64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| SKIPPED_DIRS.contains(&n));
            if !skipped {
                walk_dir(&path, files)?;
            }
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| LOADED_EXTENSIONS.contains(&e))
        {
            files.push(path);
        }
    }
    Ok(())
}

/// Loads every buildable file under `root` into a new file system.
///
/// Files that are not valid UTF-8 are skipped.
pub fn load_tree(root: &Path) -> Result<Vfs, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    walk_dir(root, &mut files)?;
    files.sort();

    let mut fs = Vfs::new(!cfg!(any(windows, target_os = "macos")));
    for file in &files {
        match std::fs::read_to_string(file) {
            Ok(text) => fs.insert_with_mtime(&to_virtual(file), text, modified_secs(file))?,
            Err(e) => tracing::debug!(path = %file.display(), error = %e, "skipping unreadable file"),
        }
    }
    tracing::debug!(root = %root.display(), files = files.len(), "loaded tree");
    Ok(fs)
}

/// Builds `command` against the tree under `root`, running in `cwd`, and
/// writes the outputs back to disk.
pub fn build(
    root: &Path,
    cwd: &Path,
    command: &CommandLine,
    version: &str,
) -> Result<BuildReport, Box<dyn std::error::Error>> {
    let mut fs = load_tree(root)?;
    let ctx = BuildContext::new(&mut fs, &to_virtual(cwd), version);
    let report = execute(ctx, command)?;

    for written in &report.written {
        let target = to_disk(&written.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, fs.read(&written.path)?)?;
    }
    Ok(report)
}

/// Handles a build or compile invocation, printing the console text.
pub fn run(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let root = match &cli.root {
        Some(root) => std::fs::canonicalize(root)?,
        None => cwd.clone(),
    };
    let report = build(&root, &cwd, &cli.command, &cli.tool_version)?;
    print!("{}", report.console);
    Ok(report.exit_status.code())
}
