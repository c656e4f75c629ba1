//! The persisted build-info record and its two text forms.
//!
//! The compact form is what lands on disk:
//!
//! ```text
//! {"root":["../src/index.ts","../types/type.ts"],"errors":true,"version":"FakeTSVersion"}
//! ```
//!
//! The readable form is the same record pretty-printed with a trailing
//! `size` field holding the byte length of the compact form. Baselines show
//! the readable form so reviewers can see what changed.

use refbuild_common::path;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

fn is_false(b: &bool) -> bool {
    !*b
}

/// Incremental state recorded by a project's last build.
///
/// Field order is significant: it fixes the serialized text and thus the
/// derived size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    /// Root files, relative to the build-info file's directory, in program order.
    pub root: Vec<String>,
    /// Whether the build reported any error diagnostic.
    #[serde(default, skip_serializing_if = "is_false")]
    pub errors: bool,
    /// Version of the tool that wrote the record.
    pub version: String,
}

/// The readable form: the record plus its derived size.
#[derive(Serialize)]
struct Readable<'a> {
    root: &'a [String],
    #[serde(skip_serializing_if = "is_false")]
    errors: bool,
    version: &'a str,
    size: usize,
}

impl BuildInfo {
    /// Creates a record for a program whose absolute root paths are `roots`.
    ///
    /// Paths are stored relative to the directory holding `build_info_path`.
    pub fn for_program(
        build_info_path: &str,
        roots: &[String],
        errors: bool,
        version: &str,
        case_sensitive: bool,
    ) -> Self {
        let dir = path::directory_of(build_info_path);
        Self {
            root: roots
                .iter()
                .map(|r| path::relative(dir, r, case_sensitive))
                .collect(),
            errors,
            version: version.to_string(),
        }
    }

    /// Resolves the stored root paths back to absolute paths.
    pub fn root_paths(&self, build_info_path: &str) -> Vec<String> {
        let dir = path::directory_of(build_info_path);
        self.root.iter().map(|r| path::combine(dir, r)).collect()
    }

    /// Returns the compact text written to disk.
    pub fn to_compact(&self) -> Result<String, CacheError> {
        serde_json::to_string(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Returns the byte length of the compact form.
    pub fn size(&self) -> Result<usize, CacheError> {
        self.to_compact().map(|text| text.len())
    }

    /// Returns the pretty-printed form with the derived `size` appended.
    pub fn to_readable(&self) -> Result<String, CacheError> {
        let readable = Readable {
            root: &self.root,
            errors: self.errors,
            version: &self.version,
            size: self.size()?,
        };
        serde_json::to_string_pretty(&readable).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Parses either text form. `path` is only used for error reporting.
    ///
    /// A `size` field, if present, is ignored; it is always recomputed.
    pub fn parse(path: &str, text: &str) -> Result<Self, CacheError> {
        serde_json::from_str(text).map_err(|e| CacheError::Parse {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}
