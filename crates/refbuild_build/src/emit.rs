//! Output naming and the stand-in emitter.
//!
//! Type checking and real code generation live outside the harness. The
//! [`Emitter`] trait is the seam where they would plug in; [`CommonJsEmitter`]
//! is a small line-based transform that produces deterministic CommonJS and
//! declaration text for simple modules, enough to exercise the write path.

use std::sync::LazyLock;

use refbuild_common::path;
use refbuild_config::ProjectConfig;
use regex::Regex;

/// Turns source text into output text.
pub trait Emitter {
    /// Produces JavaScript for a source file.
    fn emit_js(&self, source: &str) -> String;
    /// Produces a declaration file for a source file.
    fn emit_declaration(&self, source: &str) -> String;
}

/// Where the outputs of one source file go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// JavaScript output.
    pub js: String,
    /// Declaration output, when declarations are enabled.
    pub declaration: Option<String>,
}

const SOURCE_EXTENSIONS: &[(&str, &str, &str)] = &[
    (".tsx", ".js", ".d.ts"),
    (".mts", ".mjs", ".d.mts"),
    (".cts", ".cjs", ".d.cts"),
    (".ts", ".js", ".d.ts"),
];

/// Computes the outputs of `file`, or `None` for files that emit nothing
/// (declaration files and unknown extensions).
///
/// With an `outDir`, outputs mirror the source's position relative to
/// `root_dir`; otherwise they sit next to the source.
pub fn output_paths(
    config: &ProjectConfig,
    root_dir: &str,
    file: &str,
    case_sensitive: bool,
) -> Option<OutputPaths> {
    if refbuild_config::resolve::is_declaration_file(file) {
        return None;
    }
    let (stem, js_ext, dts_ext) = SOURCE_EXTENSIONS
        .iter()
        .find_map(|(src, js, dts)| file.strip_suffix(src).map(|stem| (stem, *js, *dts)))?;
    let base = match &config.options.out_dir {
        Some(out_dir) => path::combine(out_dir, &path::relative(root_dir, stem, case_sensitive)),
        None => stem.to_string(),
    };
    Some(OutputPaths {
        js: format!("{base}{js_ext}"),
        declaration: config
            .options
            .emits_declarations()
            .then(|| format!("{base}{dts_ext}")),
    })
}

static TYPE_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:declare\s+)?(?:type\s+\w+.*=.*;|interface\s+\w+[^{]*\{.*\}\s*;?)\s*$|^\s*import\s+type\s")
        .expect("valid regex")
});
static ANNOTATED_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*(?:export\s+)?(?:const|let|var)\s+[A-Za-z_$][\w$]*)\s*:\s*[^=]+?\s*=").expect("valid regex")
});
static EXPORTED_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^export\s+(const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::\s*([^=]+?)\s*)?=\s*(.*?);?\s*$")
        .expect("valid regex")
});
static EXPORTED_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^export\s+function\s+([A-Za-z_$][\w$]*)\s*\(([^)]*)\)\s*(?::\s*([^{]+?))?\s*\{")
        .expect("valid regex")
});
static NAMED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import\s*\{([^}]*)\}\s*from\s*(["'][^"']+["'])\s*;?\s*$"#).expect("valid regex")
});
static LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:-?\d+(?:\.\d+)?|"[^"]*"|'[^']*'|true|false)$"#).expect("valid regex")
});

fn is_module(source: &str) -> bool {
    source
        .lines()
        .any(|l| l.trim_start().starts_with("export ") || l.trim_start().starts_with("import "))
}

fn brace_delta(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// Line-based CommonJS emitter for simple modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonJsEmitter;

impl Emitter for CommonJsEmitter {
    fn emit_js(&self, source: &str) -> String {
        let mut prologue = vec!["\"use strict\";".to_string()];
        let module = is_module(source);
        if module {
            prologue.push(
                "Object.defineProperty(exports, \"__esModule\", { value: true });".to_string(),
            );
        }

        let mut exported_vars: Vec<String> = Vec::new();
        let mut exported_fns: Vec<String> = Vec::new();
        let mut body: Vec<String> = Vec::new();

        for line in source.lines() {
            if line.trim().is_empty() || TYPE_ONLY.is_match(line) {
                continue;
            }
            let line = ANNOTATED_VARIABLE.replace(line, "$1 =").into_owned();
            if let Some(caps) = EXPORTED_VARIABLE.captures(&line) {
                let name = caps[2].to_string();
                body.push(format!("exports.{name} = {};", &caps[4]));
                exported_vars.push(name);
            } else if let Some(caps) = EXPORTED_FUNCTION.captures(&line) {
                exported_fns.push(caps[1].to_string());
                body.push(line.replacen("export ", "", 1));
            } else if let Some(caps) = NAMED_IMPORT.captures(&line) {
                body.push(format!("const {{{}}} = require({});", &caps[1], &caps[2]));
            } else {
                body.push(line);
            }
        }

        if !exported_vars.is_empty() {
            let chain: Vec<String> = exported_vars
                .iter()
                .rev()
                .map(|name| format!("exports.{name}"))
                .collect();
            prologue.push(format!("{} = void 0;", chain.join(" = ")));
        }
        for name in &exported_fns {
            prologue.push(format!("exports.{name} = {name};"));
        }

        let mut out = prologue.join("\n");
        for line in body {
            out.push('\n');
            out.push_str(&line);
        }
        out.push('\n');
        out
    }

    fn emit_declaration(&self, source: &str) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut depth = 0;
        for line in source.lines() {
            let at_top = depth == 0;
            depth += brace_delta(line);
            if !at_top {
                continue;
            }
            let trimmed = line.trim();
            if let Some(caps) = EXPORTED_VARIABLE.captures(trimmed) {
                let name = &caps[2];
                let keyword = if &caps[1] == "const" { "const" } else { "let" };
                let declared = match (caps.get(3), &caps[4]) {
                    (Some(ty), _) => format!("export declare {keyword} {name}: {};", ty.as_str()),
                    (None, init) if keyword == "const" && LITERAL.is_match(init) => {
                        format!("export declare const {name} = {init};")
                    }
                    (None, init) => format!("export declare {keyword} {name}: {};", widen(init)),
                };
                out.push(declared);
            } else if let Some(caps) = EXPORTED_FUNCTION.captures(trimmed) {
                let ret = caps.get(3).map_or("void", |m| m.as_str());
                out.push(format!(
                    "export declare function {}({}): {ret};",
                    &caps[1], &caps[2]
                ));
            } else if trimmed.starts_with("export type ") || trimmed.starts_with("export interface ") {
                out.push(trimmed.to_string());
            } else if trimmed.starts_with("import ") && !trimmed.starts_with("import type ") {
                out.push(trimmed.to_string());
            }
        }
        if out.is_empty() && is_module(source) {
            out.push("export {};".to_string());
        }
        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}

fn widen(init: &str) -> &'static str {
    if init.parse::<f64>().is_ok() {
        "number"
    } else if init.starts_with('"') || init.starts_with('\'') || init.starts_with('`') {
        "string"
    } else if init == "true" || init == "false" {
        "boolean"
    } else {
        "any"
    }
}
