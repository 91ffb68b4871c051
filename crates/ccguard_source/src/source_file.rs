//! Source file representation with line-start indexing.

use crate::file_id::FileId;
use ccguard_common::ContentHash;
use std::path::PathBuf;

/// A file taking part in a translation unit.
///
/// Stores the file's text along with precomputed line-start offsets for
/// line/column resolution and whole-line access.
pub struct SourceFile {
    /// The unique identifier for this file within the [`SourceDb`](crate::SourceDb).
    pub id: FileId,
    /// The path of this file as reported by the host compiler.
    pub path: PathBuf,
    /// The full text content of the file. Empty if the text was unavailable.
    pub content: String,
    /// Byte offsets of each line start (the first entry is always 0).
    line_starts: Vec<u32>,
    /// Hash of the file content.
    pub content_hash: ContentHash,
}

impl SourceFile {
    /// Creates a new `SourceFile` with precomputed line starts and content hash.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let line_starts = compute_line_starts(&content);
        let content_hash = ContentHash::from_bytes(content.as_bytes());
        Self {
            id,
            path,
            content,
            line_starts,
            content_hash,
        }
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    ///
    /// Offsets past the end of the text are clamped to the last line.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = self.line_index(byte_offset);
        let line = (line_idx as u32) + 1;
        let col = byte_offset.saturating_sub(self.line_starts[line_idx]) + 1;
        (line, col)
    }

    /// Returns the 1-indexed line containing `byte_offset`.
    pub fn line_of(&self, byte_offset: u32) -> u32 {
        self.line_index(byte_offset) as u32 + 1
    }

    /// Returns the text of a 1-indexed line without its terminator.
    ///
    /// Returns an empty string for lines outside the file.
    pub fn line_text(&self, line: u32) -> &str {
        let Some(idx) = (line as usize).checked_sub(1) else {
            return "";
        };
        let Some(&start) = self.line_starts.get(idx) else {
            return "";
        };
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(self.content.len(), |&next| next as usize);
        self.content
            .get(start as usize..end)
            .unwrap_or("")
            .trim_end_matches(['\n', '\r'])
    }

    /// Returns a substring of the file content between byte offsets.
    ///
    /// Returns an empty string when the range falls outside the text.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        self.content.get(start as usize..end as usize).unwrap_or("")
    }

    fn line_index(&self, byte_offset: u32) -> usize {
        match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }
}

/// Computes the byte offsets of each line start in the given content.
fn compute_line_starts(content: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_file(content: &str) -> SourceFile {
        SourceFile::new(
            FileId::from_raw(0),
            PathBuf::from("widget.hh"),
            content.to_string(),
        )
    }

    #[test]
    fn line_starts_computation() {
        let f = make_file("abc\ndef\nghi");
        assert_eq!(f.line_starts, vec![0, 4, 8]);
    }

    #[test]
    fn line_col_resolution() {
        let f = make_file("abc\ndef\nghi");
        assert_eq!(f.line_col(0), (1, 1));
        assert_eq!(f.line_col(4), (2, 1));
        assert_eq!(f.line_col(5), (2, 2));
        assert_eq!(f.line_col(8), (3, 1));
    }

    #[test]
    fn line_text_strips_terminator() {
        let f = make_file("#pragma once\r\n#include <a.hh>\n\nint x;");
        assert_eq!(f.line_text(1), "#pragma once");
        assert_eq!(f.line_text(2), "#include <a.hh>");
        assert_eq!(f.line_text(3), "");
        assert_eq!(f.line_text(4), "int x;");
        assert_eq!(f.line_text(0), "");
        assert_eq!(f.line_text(9), "");
    }

    #[test]
    fn out_of_range_is_tolerated() {
        let f = make_file("");
        assert_eq!(f.line_col(40), (1, 41));
        assert_eq!(f.snippet(3, 9), "");
    }

    #[test]
    fn snippet_extraction() {
        let f = make_file("struct Point;");
        assert_eq!(f.snippet(0, 6), "struct");
    }
}
