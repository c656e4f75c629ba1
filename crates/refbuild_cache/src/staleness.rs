//! Deciding whether a project's previous build can be reused.

use refbuild_common::path;
use refbuild_vfs::Vfs;

use crate::buildinfo::BuildInfo;

/// Why a project must be rebuilt. Checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutOfDateReason {
    /// No readable build info exists.
    OutputMissing {
        /// Expected build-info path.
        build_info: String,
    },
    /// The build info was written by a different tool version.
    VersionMismatch {
        /// Version stored in the record.
        recorded: String,
        /// Version of the running tool.
        current: String,
    },
    /// The previous build reported errors, which must be reported again.
    ErrorsRecorded {
        /// Build-info path.
        build_info: String,
    },
    /// A file that was a root last time no longer is.
    RootRemoved {
        /// Build-info path.
        build_info: String,
        /// Absolute path of the dropped root.
        file: String,
    },
    /// A root file that the previous build did not have.
    RootAdded {
        /// Build-info path.
        build_info: String,
        /// Absolute path of the new root.
        file: String,
    },
    /// An input file is missing.
    InputMissing {
        /// Absolute path of the missing input.
        file: String,
    },
    /// An input changed after the build info was written.
    InputNewer {
        /// Build-info path.
        build_info: String,
        /// The newest input.
        input: String,
    },
}

/// The outcome of a staleness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// The previous build is still valid.
    UpToDate {
        /// The most recently modified input.
        newest_input: String,
        /// Build-info path.
        build_info: String,
    },
    /// The project must be rebuilt.
    OutOfDate(OutOfDateReason),
}

impl Staleness {
    /// Returns `true` if no rebuild is needed.
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Staleness::UpToDate { .. })
    }
}

/// Everything a staleness check looks at besides the file system.
#[derive(Debug, Clone, Copy)]
pub struct StalenessInputs<'a> {
    /// Absolute build-info path of the project.
    pub build_info_path: &'a str,
    /// The record left by the previous build, if any.
    pub previous: Option<&'a BuildInfo>,
    /// Absolute root files the project has now, in program order.
    pub roots: &'a [String],
    /// Further files whose changes invalidate the project: its config and the
    /// build-info files of the projects it references.
    pub extra_inputs: &'a [String],
    /// Version of the running tool.
    pub version: &'a str,
}

/// Decides whether the previous build recorded at `inputs.build_info_path`
/// can be reused.
pub fn staleness(fs: &Vfs, inputs: &StalenessInputs<'_>) -> Staleness {
    let build_info = inputs.build_info_path.to_string();
    let out_of_date = |reason| {
        tracing::debug!(?reason, "project out of date");
        Staleness::OutOfDate(reason)
    };

    let (Some(previous), Ok(built_at)) = (inputs.previous, fs.modified_time(inputs.build_info_path))
    else {
        return out_of_date(OutOfDateReason::OutputMissing { build_info });
    };

    if previous.version != inputs.version {
        return out_of_date(OutOfDateReason::VersionMismatch {
            recorded: previous.version.clone(),
            current: inputs.version.to_string(),
        });
    }

    if previous.errors {
        return out_of_date(OutOfDateReason::ErrorsRecorded { build_info });
    }

    let cs = fs.is_case_sensitive();
    let old_roots = previous.root_paths(inputs.build_info_path);
    let current_keys: Vec<String> = inputs.roots.iter().map(|r| path::key(r, cs)).collect();
    let old_keys: Vec<String> = old_roots.iter().map(|r| path::key(r, cs)).collect();

    if let Some(removed) = old_roots
        .iter()
        .zip(&old_keys)
        .find(|(_, key)| !current_keys.contains(key))
        .map(|(root, _)| root)
    {
        return out_of_date(OutOfDateReason::RootRemoved {
            build_info,
            file: removed.clone(),
        });
    }

    if let Some(added) = inputs
        .roots
        .iter()
        .zip(&current_keys)
        .find(|(_, key)| !old_keys.contains(key))
        .map(|(root, _)| root)
    {
        return out_of_date(OutOfDateReason::RootAdded {
            build_info,
            file: added.clone(),
        });
    }

    let mut newest: Option<(&str, u64)> = None;
    for input in inputs.roots.iter().chain(inputs.extra_inputs) {
        let Ok(modified) = fs.modified_time(input) else {
            return out_of_date(OutOfDateReason::InputMissing {
                file: input.clone(),
            });
        };
        if newest.map_or(true, |(_, t)| modified > t) {
            newest = Some((input, modified));
        }
    }

    match newest {
        Some((input, modified)) if modified > built_at => out_of_date(OutOfDateReason::InputNewer {
            build_info,
            input: input.to_string(),
        }),
        Some((input, _)) => Staleness::UpToDate {
            newest_input: input.to_string(),
            build_info,
        },
        None => Staleness::UpToDate {
            newest_input: build_info.clone(),
            build_info,
        },
    }
}
