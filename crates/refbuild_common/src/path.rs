//! Slash-separated path arithmetic for virtual file system paths.
//!
//! Virtual paths are plain `/`-separated strings rooted at `/`. These helpers
//! never touch the host file system, so the same code runs identically for
//! in-memory scenarios and for projects loaded from disk.

/// Returns `true` if `path` is absolute (starts with `/`).
pub fn is_rooted(path: &str) -> bool {
    path.starts_with('/')
}

/// Collapses `.` and `..` segments and duplicate separators.
///
/// A rooted path never climbs above `/`. A relative path keeps leading `..`
/// segments it cannot resolve.
pub fn normalize(path: &str) -> String {
    let rooted = is_rooted(path);
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Resolves `relative` against `base`. A rooted `relative` wins outright.
pub fn combine(base: &str, relative: &str) -> String {
    if is_rooted(relative) {
        normalize(relative)
    } else {
        normalize(&format!("{base}/{relative}"))
    }
}

/// Returns the directory portion of `path` (`/` for top-level entries).
pub fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

/// Returns the final segment of `path`.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns the canonical comparison key for a path.
///
/// On a case-insensitive file system two paths are the same file when their
/// lowercased forms match.
pub fn key(path: &str, case_sensitive: bool) -> String {
    let normalized = normalize(path);
    if case_sensitive {
        normalized
    } else {
        normalized.to_lowercase()
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn segment_eq(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a == b || a.to_lowercase() == b.to_lowercase()
    }
}

/// Returns `true` if `path` lies strictly inside directory `dir`.
pub fn is_under(dir: &str, path: &str, case_sensitive: bool) -> bool {
    let dir = normalize(dir);
    let path = normalize(path);
    let dir_parts = segments(&dir);
    let path_parts = segments(&path);
    path_parts.len() > dir_parts.len()
        && dir_parts
            .iter()
            .zip(&path_parts)
            .all(|(a, b)| segment_eq(a, b, case_sensitive))
}

/// Computes the path of `to` relative to the directory `from_dir`.
///
/// Both inputs must be rooted. Returns `.` when they name the same location.
pub fn relative(from_dir: &str, to: &str, case_sensitive: bool) -> String {
    let from = normalize(from_dir);
    let to = normalize(to);
    let from_parts = segments(&from);
    let to_parts = segments(&to);
    let shared = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| segment_eq(a, b, case_sensitive))
        .count();
    let mut out: Vec<&str> = vec![".."; from_parts.len() - shared];
    out.extend(&to_parts[shared..]);
    if out.is_empty() {
        ".".to_string()
    } else {
        out.join("/")
    }
}

/// Returns the longest directory containing every path in `paths`.
///
/// Each path contributes its own directory, so a single file yields its
/// parent. Returns `None` for an empty input.
pub fn common_directory<'a>(
    paths: impl IntoIterator<Item = &'a str>,
    case_sensitive: bool,
) -> Option<String> {
    let mut common: Option<Vec<String>> = None;
    for path in paths {
        let dir = normalize(directory_of(path));
        let parts: Vec<String> = segments(&dir).into_iter().map(str::to_string).collect();
        common = Some(match common {
            None => parts,
            Some(prev) => prev
                .into_iter()
                .zip(parts)
                .take_while(|(a, b)| segment_eq(a, b, case_sensitive))
                .map(|(a, _)| a)
                .collect(),
        });
    }
    common.map(|parts| format!("/{}", parts.join("/")))
}

/// Strips the first matching extension from `path`, checking longer
/// extensions first so `.d.ts` wins over `.ts`.
pub fn strip_extension<'a>(path: &'a str, extensions: &[&str]) -> Option<&'a str> {
    let mut sorted: Vec<&str> = extensions.to_vec();
    sorted.sort_by_key(|ext| std::cmp::Reverse(ext.len()));
    sorted
        .into_iter()
        .find_map(|ext| path.strip_suffix(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_segments() {
        assert_eq!(normalize("/a/./b//c/../d"), "/a/b/d");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize("../x/../../y"), "../../y");
        assert_eq!(normalize("a/.."), ".");
    }

    #[test]
    fn combine_relative_and_rooted() {
        assert_eq!(combine("/proj", "src"), "/proj/src");
        assert_eq!(combine("/proj/dist", "../types/type.js"), "/proj/types/type.js");
        assert_eq!(combine("/proj", "/other/x.ts"), "/other/x.ts");
    }

    #[test]
    fn directory_and_file_name() {
        assert_eq!(directory_of("/proj/tsconfig.json"), "/proj");
        assert_eq!(directory_of("/tsconfig.json"), "/");
        assert_eq!(file_name("/proj/src/index.ts"), "index.ts");
    }

    #[test]
    fn under_is_strict_and_segment_based() {
        assert!(is_under("/proj/src", "/proj/src/index.ts", true));
        assert!(!is_under("/proj/src", "/proj/src", true));
        assert!(!is_under("/proj/src", "/proj/srcx/index.ts", true));
        assert!(!is_under("/proj/src", "/proj/types/type.ts", true));
    }

    #[test]
    fn under_respects_case_flag() {
        assert!(is_under("/Proj/Src", "/proj/src/a.ts", false));
        assert!(!is_under("/Proj/Src", "/proj/src/a.ts", true));
        assert!(is_under("/p/Ärger", "/p/ärger/a.ts", false));
        assert!(!is_under("/p/Ärger", "/p/ärger/a.ts", true));
        assert_eq!(relative("/p/Ärger", "/p/ärger/a.ts", false), "a.ts");
        assert_eq!(
            common_directory(["/p/Ärger/a.ts", "/p/ärger/b.ts"], false).as_deref(),
            Some("/p/Ärger")
        );
    }

    #[test]
    fn relative_paths() {
        assert_eq!(relative("/proj/dist", "/proj/src/index.ts", true), "../src/index.ts");
        assert_eq!(relative("/proj", "/proj/tsconfig.json", true), "tsconfig.json");
        assert_eq!(relative("/proj", "/proj", true), ".");
    }

    #[test]
    fn common_directory_of_sources() {
        let dir = common_directory(["/p/src/a.ts", "/p/src/lib/b.ts"], true);
        assert_eq!(dir.as_deref(), Some("/p/src"));
        let dir = common_directory(["/p/src/a.ts", "/p/types/t.ts"], true);
        assert_eq!(dir.as_deref(), Some("/p"));
        assert_eq!(common_directory(std::iter::empty(), true), None);
    }

    #[test]
    fn strip_longest_extension() {
        let exts = [".ts", ".d.ts", ".tsx"];
        assert_eq!(strip_extension("/a/b.d.ts", &exts), Some("/a/b"));
        assert_eq!(strip_extension("/a/b.ts", &exts), Some("/a/b"));
        assert_eq!(strip_extension("/a/b.js", &exts), None);
    }

    #[test]
    fn key_lowercases_when_insensitive() {
        assert_eq!(key("/A/B.ts", false), "/a/b.ts");
        assert_eq!(key("/A/B.ts", true), "/A/B.ts");
    }
}
