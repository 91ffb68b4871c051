//! Shared foundational types used across the ccguard C++ rule checker.
//!
//! This crate provides the internal-error result type, content hashing used
//! to deduplicate findings across translation units, and path helpers shared
//! by the preprocessor-driven checks.

#![warn(missing_docs)]

pub mod hash;
pub mod path;
pub mod result;

pub use hash::ContentHash;
pub use path::{canonical_dir, file_stem, has_extension, lexical_normalize};
pub use result::{GuardResult, InternalError};
