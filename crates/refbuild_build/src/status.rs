//! Per-project build states and their status messages.

use refbuild_cache::{OutOfDateReason, Staleness};
use refbuild_common::{InternalError, RefbuildResult};
use refbuild_diagnostics::messages::{
    OUT_OF_DATE_ERRORS, OUT_OF_DATE_INPUT_MISSING, OUT_OF_DATE_OUTPUT_MISSING,
    OUT_OF_DATE_OUTPUT_OLDER, OUT_OF_DATE_ROOT_ADDED, OUT_OF_DATE_ROOT_REMOVED,
    OUT_OF_DATE_VERSION, UP_TO_DATE,
};

/// Where a project is in its build.
///
/// ```text
/// NotChecked -> UpToDate
///            -> NeedsBuild -> Building -> Built
///            -> Skipped
///            -> Invalid
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectState {
    /// Not looked at yet.
    NotChecked,
    /// The previous build is still valid.
    UpToDate,
    /// Must be rebuilt; `None` when the rebuild was forced.
    NeedsBuild(Option<OutOfDateReason>),
    /// Program construction and emit in progress.
    Building,
    /// Finished building.
    Built {
        /// Whether errors were reported.
        errors: bool,
    },
    /// Not built because a referenced project failed.
    Skipped {
        /// Config path of the failed reference.
        dependency: String,
    },
    /// The config could not be loaded.
    Invalid,
}

impl ProjectState {
    /// Returns `true` if moving from `self` to `next` is a legal step.
    pub fn can_transition_to(&self, next: &ProjectState) -> bool {
        use ProjectState::*;
        matches!(
            (self, next),
            (NotChecked, UpToDate)
                | (NotChecked, NeedsBuild(_))
                | (NotChecked, Skipped { .. })
                | (NotChecked, Invalid)
                | (NeedsBuild(_), Building)
                | (Building, Built { .. })
        )
    }

    /// Moves to `next`, failing on an illegal step.
    pub fn transition(&mut self, next: ProjectState) -> RefbuildResult<()> {
        if !self.can_transition_to(&next) {
            return Err(InternalError::new(format!(
                "illegal transition {self:?} -> {next:?}"
            )));
        }
        *self = next;
        Ok(())
    }

    /// Returns `true` if dependents of a project in this state must not build.
    pub fn blocks_dependents(&self) -> bool {
        matches!(
            self,
            ProjectState::Built { errors: true } | ProjectState::Skipped { .. } | ProjectState::Invalid
        )
    }

    /// Returns `true` once no further transition is possible.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ProjectState::UpToDate
                | ProjectState::Built { .. }
                | ProjectState::Skipped { .. }
                | ProjectState::Invalid
        )
    }
}

/// Formats the verbose status line for a staleness outcome.
///
/// `project` is the display name of the config; `display` shortens paths
/// for the console.
pub fn status_message(status: &Staleness, project: &str, display: impl Fn(&str) -> String) -> String {
    match status {
        Staleness::UpToDate {
            newest_input,
            build_info,
        } => UP_TO_DATE.format(&[project, &display(newest_input), &display(build_info)]),
        Staleness::OutOfDate(reason) => match reason {
            OutOfDateReason::OutputMissing { build_info } => {
                OUT_OF_DATE_OUTPUT_MISSING.format(&[project, &display(build_info)])
            }
            OutOfDateReason::VersionMismatch { recorded, current } => {
                OUT_OF_DATE_VERSION.format(&[project, recorded, current])
            }
            OutOfDateReason::ErrorsRecorded { build_info } => {
                OUT_OF_DATE_ERRORS.format(&[project, &display(build_info)])
            }
            OutOfDateReason::RootRemoved { build_info, file } => {
                OUT_OF_DATE_ROOT_REMOVED.format(&[project, &display(build_info), &display(file)])
            }
            OutOfDateReason::RootAdded { build_info, file } => {
                OUT_OF_DATE_ROOT_ADDED.format(&[project, &display(build_info), &display(file)])
            }
            OutOfDateReason::InputMissing { file } => {
                OUT_OF_DATE_INPUT_MISSING.format(&[project, &display(file)])
            }
            OutOfDateReason::InputNewer { build_info, input } => {
                OUT_OF_DATE_OUTPUT_OLDER.format(&[project, &display(build_info), &display(input)])
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(p: &str) -> String {
        p.trim_start_matches("/p/").to_string()
    }

    #[test]
    fn legal_transitions() {
        let built = ProjectState::Built { errors: false };
        assert!(ProjectState::NotChecked.can_transition_to(&ProjectState::NeedsBuild(None)));
        assert!(ProjectState::NeedsBuild(None).can_transition_to(&ProjectState::Building));
        assert!(ProjectState::Building.can_transition_to(&built));
        assert!(!ProjectState::NotChecked.can_transition_to(&built));
        assert!(!ProjectState::UpToDate.can_transition_to(&ProjectState::Building));
        assert!(built.is_final());
        assert!(!ProjectState::Building.is_final());
    }

    #[test]
    fn illegal_transition_is_an_error() {
        let mut state = ProjectState::UpToDate;
        let err = state.transition(ProjectState::Building).unwrap_err();
        assert_eq!(
            err.to_string(),
            "internal harness error: illegal transition UpToDate -> Building"
        );
        assert_eq!(state, ProjectState::UpToDate);

        let mut state = ProjectState::NotChecked;
        state.transition(ProjectState::Invalid).unwrap();
        assert_eq!(state, ProjectState::Invalid);
    }

    #[test]
    fn failures_block_dependents() {
        assert!(ProjectState::Built { errors: true }.blocks_dependents());
        assert!(ProjectState::Invalid.blocks_dependents());
        assert!(ProjectState::Skipped {
            dependency: "/core/tsconfig.json".to_string()
        }
        .blocks_dependents());
        assert!(!ProjectState::Built { errors: false }.blocks_dependents());
        assert!(!ProjectState::UpToDate.blocks_dependents());
    }

    #[test]
    fn errors_recorded_message() {
        let status = Staleness::OutOfDate(OutOfDateReason::ErrorsRecorded {
            build_info: "/p/dist/tsconfig.tsbuildinfo".to_string(),
        });
        assert_eq!(
            status_message(&status, "tsconfig.json", strip),
            "Project 'tsconfig.json' is out of date because buildinfo file 'dist/tsconfig.tsbuildinfo' indicates that program needs to report errors."
        );
    }

    #[test]
    fn up_to_date_message() {
        let status = Staleness::UpToDate {
            newest_input: "/p/src/index.ts".to_string(),
            build_info: "/p/dist/tsconfig.tsbuildinfo".to_string(),
        };
        assert_eq!(
            status_message(&status, "tsconfig.json", strip),
            "Project 'tsconfig.json' is up to date because newest input 'src/index.ts' is older than output 'dist/tsconfig.tsbuildinfo'"
        );
    }

    #[test]
    fn missing_output_message() {
        let status = Staleness::OutOfDate(OutOfDateReason::OutputMissing {
            build_info: "/p/dist/tsconfig.tsbuildinfo".to_string(),
        });
        assert_eq!(
            status_message(&status, "tsconfig.json", strip),
            "Project 'tsconfig.json' is out of date because output file 'dist/tsconfig.tsbuildinfo' does not exist"
        );
    }

    #[test]
    fn version_message() {
        let status = Staleness::OutOfDate(OutOfDateReason::VersionMismatch {
            recorded: "0.9".to_string(),
            current: "1.0".to_string(),
        });
        assert!(status_message(&status, "tsconfig.json", strip)
            .ends_with("generated with version '0.9' that differs with current version '1.0'"));
    }
}
