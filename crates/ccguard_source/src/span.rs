//! Byte-offset ranges within source files.

use crate::file_id::FileId;
use serde::{Deserialize, Serialize};

/// A byte offset range within a source file.
///
/// The `start` is inclusive and `end` is exclusive. A zero-length span marks
/// an insertion point for fix-its.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The source file this span belongs to.
    pub file: FileId,
    /// Byte offset of the start of the span (inclusive).
    pub start: u32,
    /// Byte offset of the end of the span (exclusive).
    pub end: u32,
}

impl Span {
    /// A dummy span used when no source location is available.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a new span in the given file with the given byte range.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Creates a zero-length span at `offset`.
    pub fn point(file: FileId, offset: u32) -> Self {
        Self::new(file, offset, offset)
    }

    /// Returns the zero-length span at the start of this span.
    pub fn start_point(self) -> Span {
        Span::point(self.file, self.start)
    }

    /// Returns the zero-length span just past the end of this span.
    pub fn end_point(self) -> Span {
        Span::point(self.file, self.end)
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if this span has zero length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this is the dummy span.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}
