//! Transcript comparison and reference baseline files.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::BaselineError;

static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d{1,2}:\d{2}:\d{2} [AP]M\]").expect("valid regex"));

/// Placeholder every console timestamp is replaced with.
pub const TIMESTAMP_PLACEHOLDER: &str = "[HH:MM:SS AM]";

/// Replaces volatile fields so that reruns compare equal: console
/// timestamps become [`TIMESTAMP_PLACEHOLDER`] and line endings become `\n`.
pub fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    TIMESTAMP
        .replace_all(&text, TIMESTAMP_PLACEHOLDER)
        .into_owned()
}

/// A line that differs between two transcripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// One-based line number.
    pub line: usize,
    /// The reference line; `None` past the end of the reference.
    pub expected: Option<String>,
    /// The produced line; `None` past the end of the output.
    pub actual: Option<String>,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |l: &Option<String>| match l {
            Some(text) => format!("{text:?}"),
            None => "<missing>".to_string(),
        };
        write!(
            f,
            "line {}: expected {}, got {}",
            self.line,
            show(&self.expected),
            show(&self.actual)
        )
    }
}

/// Compares `actual` against `expected` line by line after normalizing both.
///
/// Returns every differing line; an empty list means the transcripts match.
pub fn compare(actual: &str, expected: &str) -> Vec<Mismatch> {
    let actual = normalize(actual);
    let expected = normalize(expected);
    let actual: Vec<&str> = actual.split('\n').collect();
    let expected: Vec<&str> = expected.split('\n').collect();

    (0..actual.len().max(expected.len()))
        .filter_map(|i| {
            let a = actual.get(i).copied();
            let e = expected.get(i).copied();
            (a != e).then(|| Mismatch {
                line: i + 1,
                expected: e.map(str::to_string),
                actual: a.map(str::to_string),
            })
        })
        .collect()
}

/// The result of checking a transcript against its reference baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The transcript matches the reference.
    Matched,
    /// No reference exists yet; the transcript was written for review.
    Missing {
        /// Where the transcript was written.
        local: PathBuf,
    },
    /// The transcript differs; it was written for review.
    Mismatched {
        /// Where the transcript was written.
        local: PathBuf,
        /// The differing lines.
        mismatches: Vec<Mismatch>,
    },
}

impl Verdict {
    /// Returns `true` for [`Verdict::Matched`].
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Matched)
    }
}

fn baseline_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.txt"))
}

fn write_file(path: &Path, text: &str) -> Result<(), BaselineError> {
    let io = |source| BaselineError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io)?;
    }
    std::fs::write(path, text).map_err(io)
}

/// Checks `actual` against `<reference_dir>/<name>.txt`.
///
/// On a mismatch, or when there is no reference yet, the normalized
/// transcript is written to `<local_dir>/<name>.txt` so it can be reviewed
/// and accepted. A stale local copy is removed when the check passes.
pub fn verify_baseline(
    name: &str,
    actual: &str,
    reference_dir: &Path,
    local_dir: &Path,
) -> Result<Verdict, BaselineError> {
    let reference = baseline_file(reference_dir, name);
    let local = baseline_file(local_dir, name);

    let expected = match std::fs::read_to_string(&reference) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(reference = %reference.display(), "no reference baseline");
            write_file(&local, &normalize(actual))?;
            return Ok(Verdict::Missing { local });
        }
        Err(source) => {
            return Err(BaselineError::Io {
                path: reference,
                source,
            })
        }
    };

    let mismatches = compare(actual, &expected);
    if mismatches.is_empty() {
        if local.exists() {
            std::fs::remove_file(&local).map_err(|source| BaselineError::Io {
                path: local.clone(),
                source,
            })?;
        }
        return Ok(Verdict::Matched);
    }

    tracing::debug!(name, count = mismatches.len(), "baseline mismatch");
    write_file(&local, &normalize(actual))?;
    Ok(Verdict::Mismatched { local, mismatches })
}

/// Writes `actual`, normalized, as the new reference baseline for `name`.
pub fn accept_baseline(name: &str, actual: &str, reference_dir: &Path) -> Result<PathBuf, BaselineError> {
    let reference = baseline_file(reference_dir, name);
    write_file(&reference, &normalize(actual))?;
    Ok(reference)
}
