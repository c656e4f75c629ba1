//! Configuration file loading.

use refbuild_common::path;
use refbuild_vfs::Vfs;

use crate::error::ConfigError;
use crate::types::{CompilerOptions, ProjectConfig, ProjectReference, RawConfig};

const DEFAULT_CONFIG_NAME: &str = "tsconfig.json";

/// Turns a command-line or reference path into a config file path.
///
/// A path ending in `.json` names the file itself; anything else is a
/// directory holding a `tsconfig.json`.
pub fn resolve_config_path(base: &str, target: &str) -> String {
    let full = path::combine(base, target);
    if full.ends_with(".json") {
        full
    } else {
        path::combine(&full, DEFAULT_CONFIG_NAME)
    }
}

/// Loads a project file from the virtual file system.
pub fn load_config(fs: &Vfs, config_path: &str) -> Result<ProjectConfig, ConfigError> {
    let text = fs.read(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_string(),
        source,
    })?;
    load_config_from_str(config_path, text)
}

/// Parses a project file's text. `config_path` anchors relative paths.
///
/// Comments and trailing commas are accepted, as in hand-written project files.
pub fn load_config_from_str(config_path: &str, text: &str) -> Result<ProjectConfig, ConfigError> {
    let cleaned = strip_trailing_commas(&strip_comments(text));
    let raw: RawConfig = serde_json::from_str(&cleaned).map_err(|e| ConfigError::Parse {
        path: config_path.to_string(),
        reason: e.to_string(),
    })?;

    let dir = path::directory_of(config_path).to_string();
    let absolutize = |p: &Option<String>| p.as_ref().map(|p| path::combine(&dir, p));

    let options = CompilerOptions {
        out_dir: absolutize(&raw.compiler_options.out_dir),
        root_dir: absolutize(&raw.compiler_options.root_dir),
        ts_build_info_file: absolutize(&raw.compiler_options.ts_build_info_file),
        ..raw.compiler_options.clone()
    };

    let references = raw
        .references
        .iter()
        .map(|r| ProjectReference {
            path: resolve_config_path(&dir, &r.path),
            original: r.path.clone(),
        })
        .collect();

    tracing::debug!(config = config_path, "loaded project config");

    Ok(ProjectConfig {
        path: path::normalize(config_path),
        options,
        files: raw.files,
        include: raw.include,
        exclude: raw.exclude,
        references,
    })
}

/// Removes `//` and `/* */` comments outside string literals.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Removes commas directly followed (modulo whitespace) by `}` or `]`.
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 1;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if !matches!(next, Some('}') | Some(']')) {
                out.push(c);
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fixture_config() {
        let text = r#"{ "compilerOptions": { "outDir": "dist", "rootDir": "src" } }"#;
        let config = load_config_from_str("/home/src/workspaces/project/tsconfig.json", text).unwrap();
        assert_eq!(
            config.options.out_dir.as_deref(),
            Some("/home/src/workspaces/project/dist")
        );
        assert_eq!(
            config.options.root_dir.as_deref(),
            Some("/home/src/workspaces/project/src")
        );
        assert!(config.files.is_none());
        assert!(config.include.is_none());
        assert!(config.references.is_empty());
    }

    #[test]
    fn unknown_options_ignored() {
        let text = r#"{ "compilerOptions": { "module": "commonjs", "strict": true, "composite": true } }"#;
        let config = load_config_from_str("/p/tsconfig.json", text).unwrap();
        assert!(config.options.composite);
    }

    #[test]
    fn references_resolve_to_config_files() {
        let text = r#"{ "references": [ { "path": "../core" }, { "path": "../util/tsconfig.build.json" } ] }"#;
        let config = load_config_from_str("/repo/app/tsconfig.json", text).unwrap();
        let paths: Vec<&str> = config.references.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/repo/core/tsconfig.json", "/repo/util/tsconfig.build.json"]
        );
        assert_eq!(config.references[0].original, "../core");
    }

    #[test]
    fn comments_and_trailing_commas_accepted() {
        let text = r#"{
            // output goes here
            "compilerOptions": { "outDir": "out", /* inline */ },
            "include": ["src/**/*", "http://not/a/comment",],
        }"#;
        let config = load_config_from_str("/p/tsconfig.json", text).unwrap();
        assert_eq!(config.options.out_dir.as_deref(), Some("/p/out"));
        assert_eq!(
            config.include,
            Some(vec!["src/**/*".to_string(), "http://not/a/comment".to_string()])
        );
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = load_config_from_str("/p/tsconfig.json", "{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let fs = Vfs::new(true);
        let err = load_config(&fs, "/p/tsconfig.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_from_vfs() {
        let mut fs = Vfs::new(true);
        fs.write("/p/tsconfig.json", "{}").unwrap();
        let config = load_config(&fs, "/p/tsconfig.json").unwrap();
        assert_eq!(config.directory(), "/p");
        assert_eq!(config.options, CompilerOptions::default());
    }

    #[test]
    fn config_path_resolution() {
        assert_eq!(resolve_config_path("/p", "."), "/p/tsconfig.json");
        assert_eq!(resolve_config_path("/p", "sub"), "/p/sub/tsconfig.json");
        assert_eq!(resolve_config_path("/p", "tsconfig.lib.json"), "/p/tsconfig.lib.json");
        assert_eq!(resolve_config_path("/p", "/abs/x.json"), "/abs/x.json");
    }
}
