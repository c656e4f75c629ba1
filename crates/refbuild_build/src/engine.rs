//! The incremental build engine: build mode and direct mode.

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::NodeIndex;
use refbuild_cache::{staleness, Staleness, StalenessInputs};
use refbuild_config::{load_config, resolve_config_path, ProjectConfig};
use refbuild_diagnostics::messages::{
    BUILDING_PROJECT, FORCING_BUILD, PROJECTS_IN_THIS_BUILD, PROJECT_REFERENCE_CYCLE,
    SKIPPING_BUILD_DEPENDENCY_ERRORS, SKIPPING_BUILD_DEPENDENCY_NOT_BUILT,
};
use refbuild_diagnostics::Diagnostic;

use crate::command::{CommandLine, Mode};
use crate::context::{BuildContext, WrittenFile};
use crate::error::{BuildError, GraphError};
use crate::graph::{config_error_diagnostic, ProjectGraph, ProjectNode};
use crate::program::Program;
use crate::status::{status_message, ProjectState};

/// How an invocation ended. The discriminant is the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Everything built without errors.
    Success = 0,
    /// Errors were reported and no outputs were written.
    DiagnosticsPresentOutputsSkipped = 1,
    /// Errors were reported but outputs were written anyway.
    DiagnosticsPresentOutputsGenerated = 2,
    /// A project config could not be loaded.
    InvalidProjectOutputsSkipped = 3,
    /// Project references form a cycle; nothing was built.
    ProjectReferenceCycleOutputsSkipped = 4,
}

impl ExitStatus {
    /// Returns the process exit code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Returns the name used in transcripts.
    pub fn name(self) -> &'static str {
        match self {
            ExitStatus::Success => "Success",
            ExitStatus::DiagnosticsPresentOutputsSkipped => "DiagnosticsPresent_OutputsSkipped",
            ExitStatus::DiagnosticsPresentOutputsGenerated => "DiagnosticsPresent_OutputsGenerated",
            ExitStatus::InvalidProjectOutputsSkipped => "InvalidProject_OutputsSkipped",
            ExitStatus::ProjectReferenceCycleOutputsSkipped => {
                "ProjectReferenceCycle_OutputsSkipped"
            }
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExitStatus.{}", self.name())
    }
}

/// The final state of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutcome {
    /// Absolute config path.
    pub config: String,
    /// Final state.
    pub state: ProjectState,
}

/// Everything an invocation produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// How the invocation ended.
    pub exit_status: ExitStatus,
    /// Console text, including the error summary.
    pub console: String,
    /// Files written, in write order.
    pub written: Vec<WrittenFile>,
    /// Final state of each project, in build order.
    pub projects: Vec<ProjectOutcome>,
    /// Every diagnostic reported.
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs one command line against the context's file system.
pub fn execute(mut ctx: BuildContext<'_>, command: &CommandLine) -> Result<BuildReport, BuildError> {
    let (exit_status, projects) = match command.mode()? {
        Mode::Build { configs } => build_mode(&mut ctx, &configs, command.verbose, command.force)?,
        Mode::Direct { config } => direct_mode(&mut ctx, &config)?,
    };
    tracing::debug!(%exit_status, "invocation finished");
    Ok(BuildReport {
        exit_status,
        console: ctx.console.finish(),
        written: ctx.written,
        projects,
        diagnostics: ctx.diagnostics,
    })
}

struct BuildOptions {
    verbose: bool,
    force: bool,
}

fn build_mode(
    ctx: &mut BuildContext<'_>,
    configs: &[String],
    verbose: bool,
    force: bool,
) -> Result<(ExitStatus, Vec<ProjectOutcome>), BuildError> {
    let roots: Vec<String> = configs
        .iter()
        .map(|c| resolve_config_path(&ctx.current_directory, c))
        .collect();
    let graph = ProjectGraph::load(ctx.fs, &roots);

    let order = match graph.build_order() {
        Ok(order) => order,
        Err(GraphError::CycleDetected { cycle }) => {
            let shown: Vec<String> = cycle.iter().map(|c| ctx.display_path(c)).collect();
            let diag = PROJECT_REFERENCE_CYCLE.diagnostic(&[&shown.join(" -> ")]);
            ctx.report(&[diag]);
            return Ok((ExitStatus::ProjectReferenceCycleOutputsSkipped, Vec::new()));
        }
    };

    if verbose {
        let listed: String = order
            .iter()
            .map(|&n| format!("\n    * {}", ctx.display_path(graph.node(n).path())))
            .collect();
        ctx.status(&PROJECTS_IN_THIS_BUILD.format(&[&listed]));
    }

    let options = BuildOptions { verbose, force };
    let mut states: HashMap<NodeIndex, ProjectState> = HashMap::new();
    let mut outcomes = Vec::with_capacity(order.len());
    for &node in &order {
        let state = build_project(ctx, &graph, node, &states, &options)?;
        debug_assert!(state.is_final());
        outcomes.push(ProjectOutcome {
            config: graph.node(node).path().to_string(),
            state: state.clone(),
        });
        states.insert(node, state);
    }

    let exit_status = if outcomes.iter().any(|o| o.state == ProjectState::Invalid) {
        ExitStatus::InvalidProjectOutputsSkipped
    } else if ctx.console.error_count() > 0 {
        ExitStatus::DiagnosticsPresentOutputsSkipped
    } else {
        ExitStatus::Success
    };
    Ok((exit_status, outcomes))
}

fn advance(config: &str, state: &mut ProjectState, next: ProjectState) -> Result<(), BuildError> {
    tracing::debug!(config, from = ?state, to = ?next, "project state");
    state.transition(next)?;
    Ok(())
}

fn build_project(
    ctx: &mut BuildContext<'_>,
    graph: &ProjectGraph,
    node: NodeIndex,
    states: &HashMap<NodeIndex, ProjectState>,
    options: &BuildOptions,
) -> Result<ProjectState, BuildError> {
    let mut state = ProjectState::NotChecked;
    let config = match graph.node(node) {
        ProjectNode::Loaded(config) => config,
        ProjectNode::Invalid { path, diagnostic } => {
            ctx.report(std::slice::from_ref(diagnostic));
            advance(path, &mut state, ProjectState::Invalid)?;
            return Ok(state);
        }
    };
    let references = graph.references(node);

    let blocker = references
        .iter()
        .find_map(|r| states.get(r).filter(|s| s.blocks_dependents()).map(|s| (*r, s)));
    if let Some((dependency, dependency_state)) = blocker {
        let dependency = graph.node(dependency).path().to_string();
        if options.verbose {
            let message = match dependency_state {
                ProjectState::Skipped { .. } => SKIPPING_BUILD_DEPENDENCY_NOT_BUILT,
                _ => SKIPPING_BUILD_DEPENDENCY_ERRORS,
            };
            ctx.status(&message.format(&[&config.path, &dependency]));
        }
        advance(&config.path, &mut state, ProjectState::Skipped { dependency })?;
        return Ok(state);
    }

    let referenced: Vec<&ProjectConfig> = references
        .iter()
        .filter_map(|&r| graph.node(r).config())
        .collect();
    let config_display = ctx.display_path(&config.path);
    let program = Program::create(ctx.fs, config, &referenced, &config_display);

    if options.force {
        if options.verbose {
            ctx.status(&FORCING_BUILD.format(&[&config_display]));
        }
        advance(&config.path, &mut state, ProjectState::NeedsBuild(None))?;
    } else {
        let previous = ctx.store.load(ctx.fs, config);
        let build_info_path = config.build_info_path();
        let roots = program.root_paths();
        let extra_inputs: Vec<String> = std::iter::once(config.path.clone())
            .chain(referenced.iter().map(|r| r.build_info_path()))
            .collect();
        let status = staleness(
            ctx.fs,
            &StalenessInputs {
                build_info_path: &build_info_path,
                previous: previous.as_ref(),
                roots: &roots,
                extra_inputs: &extra_inputs,
                version: ctx.store.version(),
            },
        );
        if options.verbose {
            let message = status_message(&status, &config_display, |p| ctx.display_path(p));
            ctx.status(&message);
        }
        match status {
            Staleness::UpToDate { .. } => {
                advance(&config.path, &mut state, ProjectState::UpToDate)?;
                return Ok(state);
            }
            Staleness::OutOfDate(reason) => {
                advance(&config.path, &mut state, ProjectState::NeedsBuild(Some(reason)))?;
            }
        }
    }

    if options.verbose {
        ctx.status(&BUILDING_PROJECT.format(&[&config.path]));
    }
    advance(&config.path, &mut state, ProjectState::Building)?;

    let errors = program.has_errors();
    ctx.report(&program.diagnostics);
    if !errors {
        let emitted = program.emit(ctx.fs, config, ctx.emitter.as_ref());
        for file in emitted {
            ctx.write_output(&file.path, file.text)?;
        }
    }
    let info = ctx.store.record(ctx.fs, config, &program.root_paths(), errors);
    ctx.save_build_info(config, &info)?;

    advance(&config.path, &mut state, ProjectState::Built { errors })?;
    Ok(state)
}

fn direct_mode(
    ctx: &mut BuildContext<'_>,
    config_arg: &str,
) -> Result<(ExitStatus, Vec<ProjectOutcome>), BuildError> {
    let config_path = resolve_config_path(&ctx.current_directory, config_arg);
    let config = match load_config(ctx.fs, &config_path) {
        Ok(config) => config,
        Err(e) => {
            ctx.report(&[config_error_diagnostic(&e)]);
            let outcome = ProjectOutcome {
                config: config_path,
                state: ProjectState::Invalid,
            };
            return Ok((ExitStatus::InvalidProjectOutputsSkipped, vec![outcome]));
        }
    };

    let mut referenced: Vec<ProjectConfig> = Vec::with_capacity(config.references.len());
    let mut reference_errors: Vec<Diagnostic> = Vec::new();
    for reference in &config.references {
        match load_config(ctx.fs, &reference.path) {
            Ok(loaded) => referenced.push(loaded),
            Err(e) => reference_errors.push(config_error_diagnostic(&e)),
        }
    }
    let referenced: Vec<&ProjectConfig> = referenced.iter().collect();
    let config_display = ctx.display_path(&config.path);
    let program = Program::create(ctx.fs, &config, &referenced, &config_display);

    let errors = program.has_errors() || !reference_errors.is_empty();
    ctx.report(&reference_errors);
    ctx.report(&program.diagnostics);
    let emitted = program.emit(ctx.fs, &config, ctx.emitter.as_ref());
    for file in emitted {
        ctx.write_output(&file.path, file.text)?;
    }
    if config.options.is_incremental() {
        let info = ctx.store.record(ctx.fs, &config, &program.root_paths(), errors);
        ctx.save_build_info(&config, &info)?;
    }

    let exit_status = match (errors, config.options.no_emit) {
        (false, _) => ExitStatus::Success,
        (true, true) => ExitStatus::DiagnosticsPresentOutputsSkipped,
        (true, false) => ExitStatus::DiagnosticsPresentOutputsGenerated,
    };
    let outcome = ProjectOutcome {
        config: config.path.clone(),
        state: ProjectState::Built { errors },
    };
    Ok((exit_status, vec![outcome]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use refbuild_vfs::{Vfs, WriteOutcome};

    const ROOT: &str = "/home/src/workspaces/project";

    fn fixture() -> Vfs {
        let mut fs = Vfs::new(false);
        fs.write(
            &format!("{ROOT}/tsconfig.json"),
            r#"{ "compilerOptions": { "outDir": "dist", "rootDir": "src" } }"#,
        )
        .unwrap();
        fs.write(&format!("{ROOT}/src/index.ts"), "export const x = 10;").unwrap();
        fs.write(&format!("{ROOT}/types/type.ts"), "export type t = string;").unwrap();
        fs
    }

    fn run(fs: &mut Vfs, command: &str) -> BuildReport {
        let ctx = BuildContext::new(fs, ROOT, "FakeTSVersion");
        execute(ctx, &CommandLine::parse_command(command).unwrap()).unwrap()
    }

    fn clean_project(fs: &mut Vfs, dir: &str, references: &[&str]) {
        let refs: Vec<String> = references
            .iter()
            .map(|r| format!("{{ \"path\": \"{r}\" }}"))
            .collect();
        fs.write(
            &format!("{dir}/tsconfig.json"),
            format!(
                "{{ \"compilerOptions\": {{ \"composite\": true, \"outDir\": \"dist\", \"rootDir\": \"src\" }}, \"references\": [{}] }}",
                refs.join(", ")
            ),
        )
        .unwrap();
        fs.write(&format!("{dir}/src/index.ts"), "export const v = 1;").unwrap();
    }

    #[test]
    fn build_mode_withholds_outputs_on_error() {
        let mut fs = fixture();
        let report = run(&mut fs, "tsc --b");
        assert_eq!(report.exit_status, ExitStatus::DiagnosticsPresentOutputsSkipped);
        assert_eq!(report.exit_status.code(), 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(
            report.written,
            vec![WrittenFile {
                path: format!("{ROOT}/dist/tsconfig.tsbuildinfo"),
                outcome: WriteOutcome::Created,
            }]
        );
        assert!(!fs.exists(&format!("{ROOT}/dist/index.js")));
        assert_eq!(
            fs.read(&format!("{ROOT}/dist/tsconfig.tsbuildinfo")).unwrap(),
            r#"{"root":["../src/index.ts","../types/type.ts"],"errors":true,"version":"FakeTSVersion"}"#
        );
        assert!(report.console.ends_with("\nFound 1 error.\n\n"));
    }

    #[test]
    fn verbose_rerun_reports_recorded_errors() {
        let mut fs = fixture();
        run(&mut fs, "tsc --b -v");
        let report = run(&mut fs, "tsc --b -v");
        assert!(report.console.contains(
            "Project 'tsconfig.json' is out of date because buildinfo file 'dist/tsconfig.tsbuildinfo' indicates that program needs to report errors."
        ));
        assert!(report
            .console
            .contains("Projects in this build: \n    * tsconfig.json\n\n"));
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.written[0].outcome, WriteOutcome::SameContents);
    }

    #[test]
    fn direct_mode_emits_despite_errors() {
        let mut fs = fixture();
        let report = run(&mut fs, "tsc -p .");
        assert_eq!(report.exit_status, ExitStatus::DiagnosticsPresentOutputsGenerated);
        assert!(fs
            .read(&format!("{ROOT}/dist/index.js"))
            .unwrap()
            .contains("exports.x = 10;"));
        assert!(!fs.exists(&format!("{ROOT}/dist/tsconfig.tsbuildinfo")));
        assert_eq!(report.console.matches("error TS6059").count(), 1);
    }

    #[test]
    fn clean_build_then_up_to_date() {
        let mut fs = Vfs::new(true);
        clean_project(&mut fs, "/repo/core", &[]);
        clean_project(&mut fs, "/repo/app", &["../core"]);
        let ctx = BuildContext::new(&mut fs, "/repo", "1.0");
        let first = execute(ctx, &CommandLine::parse_command("tsc --b app -v").unwrap()).unwrap();
        assert_eq!(first.exit_status, ExitStatus::Success);
        let order: Vec<&str> = first.projects.iter().map(|p| p.config.as_str()).collect();
        assert_eq!(order, vec!["/repo/core/tsconfig.json", "/repo/app/tsconfig.json"]);
        assert!(fs.exists("/repo/core/dist/index.js"));
        assert!(fs.exists("/repo/core/dist/index.d.ts"));

        let ctx = BuildContext::new(&mut fs, "/repo", "1.0");
        let second = execute(ctx, &CommandLine::parse_command("tsc --b app -v").unwrap()).unwrap();
        assert!(second
            .projects
            .iter()
            .all(|p| p.state == ProjectState::UpToDate));
        assert!(second.written.is_empty());
        assert!(second.console.contains(
            "Project 'core/tsconfig.json' is up to date because newest input 'core/src/index.ts' is older than output 'core/dist/tsconfig.tsbuildinfo'"
        ));
    }

    #[test]
    fn edited_dependency_rebuilds_dependents() {
        let mut fs = Vfs::new(true);
        clean_project(&mut fs, "/repo/core", &[]);
        clean_project(&mut fs, "/repo/app", &["../core"]);
        let ctx = BuildContext::new(&mut fs, "/repo", "1.0");
        execute(ctx, &CommandLine::parse_command("tsc --b app").unwrap()).unwrap();

        fs.write("/repo/core/src/index.ts", "export const v = 2;").unwrap();
        let ctx = BuildContext::new(&mut fs, "/repo", "1.0");
        let report = execute(ctx, &CommandLine::parse_command("tsc --b app").unwrap()).unwrap();
        assert!(report
            .projects
            .iter()
            .all(|p| p.state == ProjectState::Built { errors: false }));
        assert!(report.written.iter().any(|w| w.path == "/repo/app/dist/index.js"
            && w.outcome == WriteOutcome::SameContents));
    }

    #[test]
    fn failed_reference_skips_dependents() {
        let mut fs = Vfs::new(true);
        clean_project(&mut fs, "/repo/core", &[]);
        clean_project(&mut fs, "/repo/mid", &["../core"]);
        clean_project(&mut fs, "/repo/app", &["../mid"]);
        fs.write("/repo/core/tsconfig.json", r#"{ "compilerOptions": { "composite": true, "rootDir": "src" }, "files": ["src/index.ts", "other.ts"] }"#)
            .unwrap();
        fs.write("/repo/core/other.ts", "").unwrap();
        let ctx = BuildContext::new(&mut fs, "/repo", "1.0");
        let report = execute(ctx, &CommandLine::parse_command("tsc --b app -v").unwrap()).unwrap();
        assert_eq!(report.exit_status, ExitStatus::DiagnosticsPresentOutputsSkipped);
        assert_eq!(
            report.projects[1].state,
            ProjectState::Skipped {
                dependency: "/repo/core/tsconfig.json".to_string()
            }
        );
        assert!(matches!(report.projects[2].state, ProjectState::Skipped { .. }));
        assert!(report.console.contains(
            "Skipping build of project '/repo/mid/tsconfig.json' because its dependency '/repo/core/tsconfig.json' has errors"
        ));
        assert!(report.console.contains(
            "Skipping build of project '/repo/app/tsconfig.json' because its dependency '/repo/mid/tsconfig.json' was not built"
        ));
    }

    #[test]
    fn cycle_aborts_build() {
        let mut fs = Vfs::new(true);
        clean_project(&mut fs, "/repo/a", &["../b"]);
        clean_project(&mut fs, "/repo/b", &["../a"]);
        let ctx = BuildContext::new(&mut fs, "/repo", "1.0");
        let report = execute(ctx, &CommandLine::parse_command("tsc --b a").unwrap()).unwrap();
        assert_eq!(report.exit_status, ExitStatus::ProjectReferenceCycleOutputsSkipped);
        assert!(report.written.is_empty());
        assert!(report.console.contains(
            "error TS6202: Project references may not form a circular graph. Cycle detected: a/tsconfig.json -> b/tsconfig.json -> a/tsconfig.json"
        ));
    }

    #[test]
    fn missing_config_is_invalid_project() {
        let mut fs = Vfs::new(true);
        let ctx = BuildContext::new(&mut fs, "/repo", "1.0");
        let report = execute(ctx, &CommandLine::parse_command("tsc --b").unwrap()).unwrap();
        assert_eq!(report.exit_status, ExitStatus::InvalidProjectOutputsSkipped);
        assert!(report
            .console
            .starts_with("error TS5083: Cannot read file '/repo/tsconfig.json'."));
    }

    #[test]
    fn force_rebuilds_up_to_date_project() {
        let mut fs = Vfs::new(true);
        clean_project(&mut fs, "/repo/core", &[]);
        let ctx = BuildContext::new(&mut fs, "/repo/core", "1.0");
        execute(ctx, &CommandLine::parse_command("tsc --b").unwrap()).unwrap();
        let ctx = BuildContext::new(&mut fs, "/repo/core", "1.0");
        let report = execute(ctx, &CommandLine::parse_command("tsc --b -v -f").unwrap()).unwrap();
        assert!(report
            .console
            .contains("Project 'tsconfig.json' is being forcibly rebuilt"));
        assert!(report
            .written
            .iter()
            .all(|w| w.outcome == WriteOutcome::SameContents));
        assert_eq!(report.written.len(), 3);
    }

    #[test]
    fn non_composite_reference_is_error() {
        let mut fs = Vfs::new(true);
        clean_project(&mut fs, "/repo/app", &["../core"]);
        fs.write("/repo/core/tsconfig.json", "{}").unwrap();
        fs.write("/repo/core/index.ts", "export const c = 1;").unwrap();
        let ctx = BuildContext::new(&mut fs, "/repo", "1.0");
        let report = execute(ctx, &CommandLine::parse_command("tsc --b app").unwrap()).unwrap();
        assert_eq!(report.exit_status, ExitStatus::DiagnosticsPresentOutputsSkipped);
        assert!(report.console.contains("error TS6306"));
    }

    #[test]
    fn composite_without_out_dir_settles_up_to_date() {
        let mut fs = Vfs::new(true);
        fs.write("/p/tsconfig.json", r#"{ "compilerOptions": { "composite": true } }"#)
            .unwrap();
        fs.write("/p/src/a.ts", "export const a = 1;").unwrap();
        let ctx = BuildContext::new(&mut fs, "/p", "1.0");
        let first = execute(ctx, &CommandLine::parse_command("tsc --b -v").unwrap()).unwrap();
        assert_eq!(first.exit_status, ExitStatus::Success);
        assert!(fs.exists("/p/src/a.d.ts"));
        assert_eq!(
            fs.read("/p/tsconfig.tsbuildinfo").unwrap(),
            r#"{"root":["src/a.ts"],"version":"1.0"}"#
        );

        let ctx = BuildContext::new(&mut fs, "/p", "1.0");
        let second = execute(ctx, &CommandLine::parse_command("tsc --b -v").unwrap()).unwrap();
        assert_eq!(second.projects[0].state, ProjectState::UpToDate);
        assert!(second.written.is_empty());
        assert!(second
            .console
            .contains("Project 'tsconfig.json' is up to date because newest input"));
    }

    #[test]
    fn direct_mode_reports_unreadable_reference() {
        let mut fs = Vfs::new(true);
        clean_project(&mut fs, "/repo/app", &["../core"]);
        let ctx = BuildContext::new(&mut fs, "/repo/app", "1.0");
        let report = execute(ctx, &CommandLine::parse_command("tsc -p .").unwrap()).unwrap();
        assert_eq!(report.exit_status, ExitStatus::DiagnosticsPresentOutputsGenerated);
        assert!(report
            .console
            .contains("error TS5083: Cannot read file '/repo/core/tsconfig.json'."));
        assert!(fs.exists("/repo/app/dist/index.js"));
    }

    #[test]
    fn exit_status_names() {
        assert_eq!(
            ExitStatus::DiagnosticsPresentOutputsSkipped.to_string(),
            "ExitStatus.DiagnosticsPresent_OutputsSkipped"
        );
        assert_eq!(ExitStatus::ProjectReferenceCycleOutputsSkipped.code(), 4);
    }
}
