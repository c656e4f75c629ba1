//! Loading and saving build info through the virtual file system.

use refbuild_config::ProjectConfig;
use refbuild_vfs::{Vfs, WriteOutcome};

use crate::buildinfo::BuildInfo;
use crate::error::CacheError;

/// Reads and writes the build-info record of each project.
///
/// A project is identified by its config; the record lives at
/// [`ProjectConfig::build_info_path`]. All reads are fail-safe: a missing or
/// corrupt record is reported as absent so the project simply rebuilds.
#[derive(Debug, Clone)]
pub struct BuildStateStore {
    version: String,
}

impl BuildStateStore {
    /// Creates a store that stamps records with `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Returns the tool version written into new records.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Loads the record of `config`, returning `None` if it is absent or
    /// cannot be parsed.
    ///
    /// Records written by another version are still returned; the version
    /// check belongs to the staleness decision so it can be reported.
    pub fn load(&self, fs: &Vfs, config: &ProjectConfig) -> Option<BuildInfo> {
        let path = config.build_info_path();
        let text = fs.read(&path).ok()?;
        match BuildInfo::parse(&path, text) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable build info");
                None
            }
        }
    }

    /// Builds a fresh record for `config` from its absolute root files.
    pub fn record(&self, fs: &Vfs, config: &ProjectConfig, roots: &[String], errors: bool) -> BuildInfo {
        BuildInfo::for_program(
            &config.build_info_path(),
            roots,
            errors,
            &self.version,
            fs.is_case_sensitive(),
        )
    }

    /// Writes `info` in compact form, returning how the file changed.
    pub fn save(
        &self,
        fs: &mut Vfs,
        config: &ProjectConfig,
        info: &BuildInfo,
    ) -> Result<WriteOutcome, CacheError> {
        let path = config.build_info_path();
        let text = info.to_compact()?;
        let outcome = fs
            .write(&path, text)
            .map_err(|source| CacheError::Vfs {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path, errors = info.errors, ?outcome, "saved build info");
        Ok(outcome)
    }
}
