//! Opaque identifier for files taking part in a translation unit.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a source file loaded into the [`SourceDb`](crate::SourceDb).
///
/// The id of a file equals its index in the translation unit's file table,
/// so spans exported by a host resolve against the matching database entry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// A dummy file ID used for locations the host could not attribute to a file.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value of this `FileId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_as_raw_roundtrip() {
        assert_eq!(FileId::from_raw(42).as_raw(), 42);
    }

    #[test]
    fn dummy_differs_from_normal() {
        assert_ne!(FileId::DUMMY, FileId::from_raw(0));
        assert_eq!(FileId::DUMMY.as_raw(), u32::MAX);
    }
}
