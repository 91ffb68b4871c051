//! Central database of the files seen by one translation unit.

use crate::file_id::FileId;
use crate::resolved_span::ResolvedSpan;
use crate::source_file::SourceFile;
use crate::span::Span;
use std::io;
use std::path::{Path, PathBuf};

/// The source database, owning the text of every file of a translation unit
/// and resolving [`FileId`] + byte offsets to line/column coordinates.
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty source database.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Loads a source file from the filesystem and returns its [`FileId`].
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_source(path, content))
    }

    /// Adds a source file from an in-memory string.
    ///
    /// The `name` parameter is used as the file path in diagnostics.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), content));
        id
    }

    /// Returns the [`SourceFile`] for the given [`FileId`].
    ///
    /// # Panics
    ///
    /// Panics if the `FileId` is invalid.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Returns the [`SourceFile`] for the given [`FileId`], if it exists.
    pub fn try_get_file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.as_raw() as usize)
    }

    /// Returns the number of files in the database.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no files have been added.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolves a [`Span`] to human-readable line/column coordinates.
    ///
    /// Returns `None` for dummy spans and unknown files.
    pub fn resolve_span(&self, span: Span) -> Option<ResolvedSpan> {
        let file = self.try_get_file(span.file)?;
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end.saturating_sub(1).max(span.start));
        Some(ResolvedSpan {
            file_path: file.path.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        })
    }

    /// Returns the 1-indexed line on which a span starts.
    pub fn line_of(&self, span: Span) -> Option<u32> {
        self.try_get_file(span.file)
            .map(|file| file.line_of(span.start))
    }

    /// Returns the full text of the line on which a span starts.
    pub fn line_text(&self, span: Span) -> &str {
        match self.try_get_file(span.file) {
            Some(file) => file.line_text(file.line_of(span.start)),
            None => "",
        }
    }

    /// Returns the source text corresponding to a [`Span`].
    pub fn snippet(&self, span: Span) -> &str {
        match self.try_get_file(span.file) {
            Some(file) => file.snippet(span.start, span.end),
            None => "",
        }
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}
