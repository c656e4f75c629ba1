//! `refbuild --baseline`: run a scenario and check its transcript.

use std::path::{Path, PathBuf};

use refbuild_baseline::{accept_baseline, verify_baseline, Scenario, Verdict};

/// Mismatching lines printed before the rest are summarized.
const SHOWN_MISMATCHES: usize = 20;

/// Returns `<scenario dir>/../baselines/reference`.
fn default_reference_dir(scenario: &Path) -> PathBuf {
    scenario
        .parent()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""))
        .join("baselines")
        .join("reference")
}

/// Local copies of failing transcripts go beside the reference directory.
fn local_dir(reference_dir: &Path) -> PathBuf {
    reference_dir
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("local")
}

/// Runs the scenario at `scenario_path`. Exits 0 when the transcript matches
/// (or was accepted) and 1 otherwise.
pub fn run(
    scenario_path: &Path,
    reference_dir: Option<&Path>,
    accept: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let scenario = Scenario::load(scenario_path)?;
    let transcript = refbuild_baseline::run(&scenario)?.render();
    let reference_dir = reference_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_reference_dir(scenario_path));

    if accept {
        let written = accept_baseline(&scenario.name, &transcript, &reference_dir)?;
        println!("{}: accepted {}", scenario.name, written.display());
        return Ok(0);
    }

    let verdict = verify_baseline(
        &scenario.name,
        &transcript,
        &reference_dir,
        &local_dir(&reference_dir),
    )?;
    match verdict {
        Verdict::Matched => {
            println!("{}: ok", scenario.name);
            Ok(0)
        }
        Verdict::Missing { local } => {
            eprintln!(
                "{}: no reference baseline; new transcript written to {}",
                scenario.name,
                local.display()
            );
            Ok(1)
        }
        Verdict::Mismatched { local, mismatches } => {
            eprintln!("{}: {} line(s) differ", scenario.name, mismatches.len());
            for mismatch in mismatches.iter().take(SHOWN_MISMATCHES) {
                eprintln!("  {mismatch}");
            }
            if mismatches.len() > SHOWN_MISMATCHES {
                eprintln!("  ... {} more", mismatches.len() - SHOWN_MISMATCHES);
            }
            eprintln!("actual transcript written to {}", local.display());
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
name = "cli-smoke"
current_directory = "/p"

[files]
"tsconfig.json" = "{}"
"a.ts" = "export const a = 1;"

[[steps]]
command = "tsc --b"
"#;

    #[test]
    fn default_dirs_sit_beside_scenarios() {
        let reference = default_reference_dir(Path::new("suite/scenarios/a.toml"));
        assert_eq!(reference, PathBuf::from("suite/baselines/reference"));
        assert_eq!(local_dir(&reference), PathBuf::from("suite/baselines/local"));
    }

    #[test]
    fn accept_then_verify() {
        let dir = tempfile::tempdir().unwrap();
        let scenarios = dir.path().join("scenarios");
        std::fs::create_dir_all(&scenarios).unwrap();
        let scenario = scenarios.join("cli-smoke.toml");
        std::fs::write(&scenario, SCENARIO).unwrap();

        assert_eq!(run(&scenario, None, false).unwrap(), 1);
        assert!(dir.path().join("baselines/local/cli-smoke.txt").exists());

        assert_eq!(run(&scenario, None, true).unwrap(), 0);
        assert!(dir.path().join("baselines/reference/cli-smoke.txt").exists());
        assert_eq!(run(&scenario, None, false).unwrap(), 0);
        assert!(!dir.path().join("baselines/local/cli-smoke.txt").exists());
    }
}
