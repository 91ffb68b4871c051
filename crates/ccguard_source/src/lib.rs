//! Source file management and span tracking for diagnostics.
//!
//! This crate provides the [`SourceDb`] holding the text of every file seen
//! by a translation unit, [`FileId`] and [`Span`] types for tracking source
//! locations, and [`ResolvedSpan`] for converting byte offsets to line/column
//! coordinates. Line access is also what the preprocessor checks use to
//! re-read a directive's exact text.

#![warn(missing_docs)]

pub mod file_id;
pub mod resolved_span;
pub mod source_db;
pub mod source_file;
pub mod span;

pub use file_id::FileId;
pub use resolved_span::ResolvedSpan;
pub use source_db::SourceDb;
pub use source_file::SourceFile;
pub use span::Span;
