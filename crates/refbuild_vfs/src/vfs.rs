//! The virtual file system: path-keyed storage with a monotonic clock.

use std::collections::BTreeMap;

use refbuild_common::path;

use crate::error::VfsError;
use crate::file::VirtualFile;

/// How a [`Vfs::write`] changed the file system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// No file existed at the path.
    Created,
    /// The file existed with different content.
    Changed,
    /// The file existed with byte-identical content. Its timestamp still moves.
    SameContents,
}

/// In-memory file system owning every file of a build scenario.
///
/// Keys are normalized per the case-sensitivity flag; each [`VirtualFile`]
/// keeps the casing it was created with for display. Every mutation advances
/// the virtual clock by one tick, so modification times are strictly
/// increasing in write order.
#[derive(Debug, Clone)]
pub struct Vfs {
    files: BTreeMap<String, VirtualFile>,
    case_sensitive: bool,
    clock: u64,
}

impl Vfs {
    /// Creates an empty file system.
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            files: BTreeMap::new(),
            case_sensitive,
            clock: 0,
        }
    }

    /// Returns whether paths compare case-sensitively.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Returns the current virtual time.
    pub fn now(&self) -> u64 {
        self.clock
    }

    /// Moves the clock forward without touching any file.
    pub fn advance(&mut self, ticks: u64) {
        self.clock += ticks;
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn key_for(&self, p: &str) -> Result<String, VfsError> {
        if !path::is_rooted(p) {
            return Err(VfsError::RelativePath {
                path: p.to_string(),
            });
        }
        Ok(path::key(p, self.case_sensitive))
    }

    fn not_found(p: &str) -> VfsError {
        VfsError::NotFound {
            path: p.to_string(),
        }
    }

    /// Writes `content` to `p`, creating or replacing the file.
    pub fn write(&mut self, p: &str, content: impl Into<String>) -> Result<WriteOutcome, VfsError> {
        let key = self.key_for(p)?;
        let content = content.into();
        let now = self.tick();
        let outcome = match self.files.get(&key) {
            None => WriteOutcome::Created,
            Some(existing) if existing.has_same_content(&content) => WriteOutcome::SameContents,
            Some(_) => WriteOutcome::Changed,
        };
        let stored_path = self
            .files
            .get(&key)
            .map(|f| f.path.clone())
            .unwrap_or_else(|| path::normalize(p));
        tracing::trace!(path = %stored_path, ?outcome, time = now, "vfs write");
        self.files
            .insert(key, VirtualFile::new(stored_path, content, now));
        Ok(outcome)
    }

    /// Inserts a file with an explicit modification time.
    ///
    /// Used when seeding from a real disk, where timestamps already exist.
    /// The clock is moved past `modified` so later writes are newer.
    pub fn insert_with_mtime(
        &mut self,
        p: &str,
        content: impl Into<String>,
        modified: u64,
    ) -> Result<(), VfsError> {
        let key = self.key_for(p)?;
        self.clock = self.clock.max(modified);
        self.files
            .insert(key, VirtualFile::new(path::normalize(p), content.into(), modified));
        Ok(())
    }

    /// Returns the file stored at `p`.
    pub fn file(&self, p: &str) -> Result<&VirtualFile, VfsError> {
        let key = self.key_for(p)?;
        self.files.get(&key).ok_or_else(|| Self::not_found(p))
    }

    /// Reads the text content of `p`.
    pub fn read(&self, p: &str) -> Result<&str, VfsError> {
        self.file(p).map(|f| f.content.as_str())
    }

    /// Returns `true` if a file exists at `p`.
    pub fn exists(&self, p: &str) -> bool {
        self.file(p).is_ok()
    }

    /// Returns `true` if any file lives below directory `dir`.
    pub fn directory_exists(&self, dir: &str) -> bool {
        self.files
            .values()
            .any(|f| path::is_under(dir, &f.path, self.case_sensitive))
    }

    /// Deletes the file at `p`.
    pub fn remove(&mut self, p: &str) -> Result<(), VfsError> {
        let key = self.key_for(p)?;
        match self.files.remove(&key) {
            Some(_) => {
                self.tick();
                Ok(())
            }
            None => Err(Self::not_found(p)),
        }
    }

    /// Returns the modification time of `p`.
    pub fn modified_time(&self, p: &str) -> Result<u64, VfsError> {
        self.file(p).map(|f| f.modified)
    }

    /// Updates the modification time of `p` without changing its content.
    pub fn touch(&mut self, p: &str) -> Result<(), VfsError> {
        let key = self.key_for(p)?;
        if !self.files.contains_key(&key) {
            return Err(Self::not_found(p));
        }
        let now = self.tick();
        if let Some(file) = self.files.get_mut(&key) {
            file.modified = now;
        }
        Ok(())
    }

    /// Lists every file strictly below `dir`, in key order.
    pub fn files_under(&self, dir: &str) -> Vec<&str> {
        self.files
            .values()
            .filter(|f| path::is_under(dir, &f.path, self.case_sensitive))
            .map(|f| f.path.as_str())
            .collect()
    }

    /// Iterates over every stored path, in key order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.values().map(|f| f.path.as_str())
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let mut fs = Vfs::new(true);
        let outcome = fs.write("/proj/src/index.ts", "export const x = 10;").unwrap();
        assert_eq!(outcome, WriteOutcome::Created);
        assert_eq!(fs.read("/proj/src/index.ts").unwrap(), "export const x = 10;");
        assert!(fs.exists("/proj/src/index.ts"));
    }

    #[test]
    fn read_missing_is_not_found() {
        let fs = Vfs::new(true);
        assert_eq!(
            fs.read("/nope.ts"),
            Err(VfsError::NotFound {
                path: "/nope.ts".to_string()
            })
        );
    }

    #[test]
    fn relative_paths_rejected() {
        let mut fs = Vfs::new(true);
        assert!(matches!(
            fs.write("src/a.ts", ""),
            Err(VfsError::RelativePath { .. })
        ));
    }

    #[test]
    fn same_contents_detected_and_timestamp_moves() {
        let mut fs = Vfs::new(true);
        fs.write("/a.js", "x").unwrap();
        let first = fs.modified_time("/a.js").unwrap();
        assert_eq!(fs.write("/a.js", "x").unwrap(), WriteOutcome::SameContents);
        assert!(fs.modified_time("/a.js").unwrap() > first);
        assert_eq!(fs.write("/a.js", "y").unwrap(), WriteOutcome::Changed);
    }

    #[test]
    fn case_insensitive_lookup_keeps_original_casing() {
        let mut fs = Vfs::new(false);
        fs.write("/Proj/Src/Index.ts", "a").unwrap();
        assert!(fs.exists("/proj/src/index.ts"));
        fs.write("/proj/src/INDEX.ts", "b").unwrap();
        let paths: Vec<&str> = fs.paths().collect();
        assert_eq!(paths, vec!["/Proj/Src/Index.ts"]);
        assert_eq!(fs.read("/PROJ/SRC/index.TS").unwrap(), "b");
    }

    #[test]
    fn case_sensitive_distinguishes() {
        let mut fs = Vfs::new(true);
        fs.write("/a/File.ts", "a").unwrap();
        assert!(!fs.exists("/a/file.ts"));
    }

    #[test]
    fn remove_and_touch() {
        let mut fs = Vfs::new(true);
        fs.write("/a.ts", "a").unwrap();
        let before = fs.modified_time("/a.ts").unwrap();
        fs.touch("/a.ts").unwrap();
        assert!(fs.modified_time("/a.ts").unwrap() > before);
        fs.remove("/a.ts").unwrap();
        assert!(!fs.exists("/a.ts"));
        assert!(fs.remove("/a.ts").is_err());
        assert!(fs.touch("/a.ts").is_err());
    }

    #[test]
    fn files_under_uses_prefix_segments() {
        let mut fs = Vfs::new(true);
        fs.write("/p/src/a.ts", "").unwrap();
        fs.write("/p/src/lib/b.ts", "").unwrap();
        fs.write("/p/srcx/c.ts", "").unwrap();
        assert_eq!(fs.files_under("/p/src"), vec!["/p/src/a.ts", "/p/src/lib/b.ts"]);
        assert!(fs.directory_exists("/p"));
        assert!(!fs.directory_exists("/q"));
    }

    #[test]
    fn seeded_mtime_moves_clock() {
        let mut fs = Vfs::new(true);
        fs.insert_with_mtime("/a.ts", "a", 1_000).unwrap();
        assert_eq!(fs.modified_time("/a.ts").unwrap(), 1_000);
        fs.write("/b.ts", "b").unwrap();
        assert_eq!(fs.modified_time("/b.ts").unwrap(), 1_001);
    }

    #[test]
    fn paths_are_normalized() {
        let mut fs = Vfs::new(true);
        fs.write("/p/dist/../types/type.js", "").unwrap();
        assert!(fs.exists("/p/types/type.js"));
    }
}
