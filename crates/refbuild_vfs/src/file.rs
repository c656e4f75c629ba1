//! A single file stored in the virtual file system.

use refbuild_common::ContentHash;

/// A file held by the [`Vfs`](crate::Vfs).
///
/// Stores the text together with its modification time and a content hash,
/// plus precomputed line starts so diagnostics can be placed at line/column
/// coordinates.
#[derive(Debug, Clone)]
pub struct VirtualFile {
    /// The path as it was first written (original casing preserved).
    pub path: String,
    /// The full text content.
    pub content: String,
    /// Virtual clock tick of the last write or touch.
    pub modified: u64,
    /// Hash of `content`.
    pub hash: ContentHash,
    line_starts: Vec<u32>,
}

impl VirtualFile {
    /// Creates a file stamped with the given modification time.
    pub fn new(path: impl Into<String>, content: String, modified: u64) -> Self {
        let line_starts = compute_line_starts(&content);
        let hash = ContentHash::of_text(&content);
        Self {
            path: path.into(),
            content,
            modified,
            hash,
            line_starts,
        }
    }

    /// Returns `true` if `text` is byte-identical to the current content.
    pub fn has_same_content(&self, text: &str) -> bool {
        self.hash == ContentHash::of_text(text) && self.content == text
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = (line_idx as u32) + 1;
        let col = byte_offset - self.line_starts[line_idx] + 1;
        (line, col)
    }
}

fn compute_line_starts(content: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}
