//! The recorded result of a scenario and its text rendering.

use std::fmt;

use refbuild_build::ExitStatus;
use refbuild_vfs::WriteOutcome;

/// A file shown under a step's `Input::` heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Absolute path.
    pub path: String,
    /// Content after the step's edits; `None` once deleted.
    pub content: Option<String>,
}

/// A file written by a step's command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Absolute path.
    pub path: String,
    /// Whether the write changed anything.
    pub outcome: WriteOutcome,
    /// Content as written.
    pub content: String,
    /// Readable rendering, for build-info files.
    pub readable: Option<String>,
}

/// One step of a scenario, once run.
#[derive(Debug, Clone)]
pub struct BuildRun {
    /// The step's description.
    pub description: Option<String>,
    /// The command line as written.
    pub command: String,
    /// Files to show as the step's input.
    pub inputs: Vec<InputFile>,
    /// Console text, with its error summary.
    pub console: String,
    /// Written files, in write order.
    pub outputs: Vec<OutputFile>,
    /// How the command ended.
    pub exit_status: ExitStatus,
}

/// Every run of a scenario, in step order.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Directory the commands ran in.
    pub current_directory: String,
    /// Whether paths compared case-sensitively.
    pub case_sensitive: bool,
    /// The runs.
    pub runs: Vec<BuildRun>,
}

fn push_file(out: &mut String, header: &str, content: &str) {
    out.push_str(&format!("//// [{header}]\n{content}"));
    if !content.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
}

fn push_written(out: &mut String, path: &str, outcome: WriteOutcome, content: &str) {
    match outcome {
        WriteOutcome::SameContents => {
            out.push_str(&format!("//// [{path}] file written with same contents\n"));
        }
        WriteOutcome::Created | WriteOutcome::Changed => push_file(out, path, content),
    }
}

impl Transcript {
    /// Renders the transcript as baseline text.
    ///
    /// ```text
    /// currentDirectory:: /p useCaseSensitiveFileNames:: false
    /// Input::
    /// //// [/p/src/index.ts]
    /// export const x = 10;
    ///
    ///
    /// tsc --b -v
    /// Output::
    /// <console text>
    ///
    /// //// [/p/dist/tsconfig.tsbuildinfo]
    /// ...
    ///
    /// exitCode:: ExitStatus.Success
    /// ```
    ///
    /// Later steps start with a `Change::` heading and list only the files
    /// their edits touched.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, run) in self.runs.iter().enumerate() {
            if i == 0 {
                out.push_str(&format!(
                    "currentDirectory:: {} useCaseSensitiveFileNames:: {}\n",
                    self.current_directory, self.case_sensitive
                ));
            } else {
                let description = run.description.as_deref().unwrap_or("no-change-run");
                out.push_str(&format!("\nChange:: {description}\n\n"));
            }

            out.push_str("Input::\n");
            for input in &run.inputs {
                match &input.content {
                    Some(content) => push_file(&mut out, &input.path, content),
                    None => out.push_str(&format!("//// [{}] deleted\n", input.path)),
                }
            }

            out.push_str(&format!("\n{}\nOutput::\n", run.command));
            out.push_str(&run.console);
            out.push('\n');

            for file in &run.outputs {
                push_written(&mut out, &file.path, file.outcome, &file.content);
                if let Some(readable) = &file.readable {
                    let readable_path = format!("{}.readable.baseline.txt", file.path);
                    push_written(&mut out, &readable_path, file.outcome, readable);
                }
            }

            out.push_str(&format!("\nexitCode:: {}\n", run.exit_status));
        }
        out
    }

    /// Returns the exit status of every run.
    pub fn exit_statuses(&self) -> Vec<ExitStatus> {
        self.runs.iter().map(|r| r.exit_status).collect()
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
