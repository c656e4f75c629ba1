//! Plays a scenario's steps against a fresh virtual file system.

use refbuild_build::{execute, BuildContext, CommandLine, CommonJsEmitter, Emitter, WrittenFile};
use refbuild_cache::BuildInfo;
use refbuild_vfs::Vfs;

use crate::error::BaselineError;
use crate::scenario::{Edit, Scenario, Step};
use crate::transcript::{BuildRun, InputFile, OutputFile, Transcript};

/// Runs every step of `scenario` with the CommonJS emitter.
pub fn run(scenario: &Scenario) -> Result<Transcript, BaselineError> {
    run_with(scenario, CommonJsEmitter)
}

/// Runs every step of `scenario`, emitting through `emitter`.
///
/// Each command gets its own [`BuildContext`]; only the file system carries
/// over from one step to the next.
pub fn run_with<E>(scenario: &Scenario, emitter: E) -> Result<Transcript, BaselineError>
where
    E: Emitter + Clone + 'static,
{
    let mut fs = scenario.seed()?;
    let mut runs = Vec::with_capacity(scenario.steps.len());

    for (i, step) in scenario.steps.iter().enumerate() {
        let number = i + 1;
        let edited = apply_edits(&mut fs, scenario, step, number)?;
        let inputs = if i == 0 {
            fs.paths()
                .map(|p| InputFile {
                    path: p.to_string(),
                    content: fs.read(p).ok().map(str::to_string),
                })
                .collect()
        } else {
            edited
                .into_iter()
                .map(|p| InputFile {
                    content: fs.read(&p).ok().map(str::to_string),
                    path: p,
                })
                .collect()
        };

        let command = CommandLine::parse_command(&step.command).map_err(|source| {
            BaselineError::Command {
                step: number,
                source,
            }
        })?;
        let ctx = BuildContext::new(&mut fs, &scenario.current_directory, &scenario.version)
            .with_emitter(emitter.clone());
        let report = execute(ctx, &command).map_err(|source| BaselineError::Command {
            step: number,
            source,
        })?;
        tracing::debug!(
            scenario = %scenario.name,
            step = number,
            exit_status = %report.exit_status,
            written = report.written.len(),
            "step finished"
        );

        runs.push(BuildRun {
            description: step.description.clone(),
            command: step.command.clone(),
            inputs,
            outputs: collect_outputs(&fs, &report.written)?,
            console: report.console,
            exit_status: report.exit_status,
        });
    }

    Ok(Transcript {
        current_directory: scenario.current_directory.clone(),
        case_sensitive: scenario.case_sensitive,
        runs,
    })
}

/// Applies a step's edits and returns the touched paths, first touch first.
fn apply_edits(
    fs: &mut Vfs,
    scenario: &Scenario,
    step: &Step,
    number: usize,
) -> Result<Vec<String>, BaselineError> {
    let mut touched: Vec<String> = Vec::new();
    for edit in &step.edits {
        let path = scenario.resolve(edit.path());
        let result = match edit {
            Edit::Write { content, .. } => fs.write(&path, content.as_str()).map(drop),
            Edit::Append { content, .. } => match fs.read(&path) {
                Ok(existing) => {
                    let joined = format!("{existing}{content}");
                    fs.write(&path, joined).map(drop)
                }
                Err(e) => Err(e),
            },
            Edit::Remove { .. } => fs.remove(&path),
            Edit::Touch { .. } => fs.touch(&path),
        };
        result.map_err(|source| BaselineError::Edit {
            step: number,
            path: path.clone(),
            source,
        })?;
        if !touched.contains(&path) {
            touched.push(path);
        }
    }
    Ok(touched)
}

fn collect_outputs(fs: &Vfs, written: &[WrittenFile]) -> Result<Vec<OutputFile>, BaselineError> {
    written
        .iter()
        .map(|w| {
            let content = fs.read(&w.path).unwrap_or_default().to_string();
            let readable = if w.path.ends_with(".tsbuildinfo") {
                let rendered = BuildInfo::parse(&w.path, &content)
                    .and_then(|info| info.to_readable())
                    .map_err(|e| BaselineError::Build {
                        path: w.path.clone(),
                        reason: e.to_string(),
                    })?;
                Some(rendered)
            } else {
                None
            };
            Ok(OutputFile {
                path: w.path.clone(),
                outcome: w.outcome,
                content,
                readable,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use refbuild_build::ExitStatus;
    use refbuild_vfs::WriteOutcome;

    fn scenario(steps: &str) -> Scenario {
        Scenario::from_toml(&format!(
            r#"
name = "runner"
current_directory = "/p"

[files]
"tsconfig.json" = '{{ "compilerOptions": {{ "outDir": "dist", "composite": true }} }}'
"a.ts" = "export const a = 1;"

{steps}
"#
        ))
        .unwrap()
    }

    #[test]
    fn first_step_lists_every_file() {
        let transcript = run(&scenario("[[steps]]\ncommand = \"tsc --b\"")).unwrap();
        let inputs: Vec<&str> = transcript.runs[0].inputs.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(inputs, vec!["/p/a.ts", "/p/tsconfig.json"]);
        assert_eq!(transcript.runs[0].exit_status, ExitStatus::Success);
    }

    #[test]
    fn build_info_gets_readable_form() {
        let transcript = run(&scenario("[[steps]]\ncommand = \"tsc --b\"")).unwrap();
        let info = transcript.runs[0]
            .outputs
            .iter()
            .find(|o| o.path == "/p/dist/tsconfig.tsbuildinfo")
            .unwrap();
        assert!(info.readable.as_ref().unwrap().contains("\"size\": "));
        let js = transcript.runs[0]
            .outputs
            .iter()
            .find(|o| o.path == "/p/dist/a.js")
            .unwrap();
        assert!(js.readable.is_none());
        assert!(js.content.contains("exports.a = 1;"));
    }

    #[test]
    fn later_steps_list_edited_files_only() {
        let transcript = run(&scenario(
            r#"
[[steps]]
command = "tsc --b"

[[steps]]
description = "append"
command = "tsc --b -v"
edits = [
    { kind = "append", path = "a.ts", content = "\nexport const b = 2;" },
    { kind = "touch", path = "a.ts" },
]
"#,
        ))
        .unwrap();
        let second = &transcript.runs[1];
        assert_eq!(
            second.inputs,
            vec![InputFile {
                path: "/p/a.ts".to_string(),
                content: Some("export const a = 1;\nexport const b = 2;".to_string()),
            }]
        );
        assert!(second.console.contains("is older than input 'a.ts'"));
        let js = second.outputs.iter().find(|o| o.path == "/p/dist/a.js").unwrap();
        assert_eq!(js.outcome, WriteOutcome::Changed);
    }

    #[test]
    fn failed_edit_names_step() {
        let err = run(&scenario(
            r#"
[[steps]]
command = "tsc --b"
edits = [{ kind = "remove", path = "missing.ts" }]
"#,
        ))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "step 1: cannot edit /p/missing.ts: file not found: /p/missing.ts"
        );
    }
}
