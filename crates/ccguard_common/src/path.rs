//! Path helpers for file classification.
//!
//! Translation units are often exported on one machine and checked on
//! another, so these helpers work lexically and never touch the filesystem.

use path_absolutize::Absolutize;
use std::path::{Component, Path, PathBuf};

/// Returns the file name without its final extension (`a/b/foo.hh` -> `foo`).
pub fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

/// Returns `true` if the path ends in one of the given extensions.
///
/// Extensions are written with a leading dot (`.hh`) and compared exactly.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|candidate| candidate.strip_prefix('.') == Some(ext))
}

/// Resolves `.` and `..` components without consulting the filesystem.
///
/// Absolute paths are normalized in place; relative paths are anchored at
/// the current directory first.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    match path.absolutize() {
        Ok(abs) => abs.into_owned(),
        Err(_) => fallback_normalize(path),
    }
}

/// Returns the normalized directory containing `path`.
pub fn canonical_dir(path: &Path) -> PathBuf {
    let normalized = lexical_normalize(path);
    normalized
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(normalized)
}

fn fallback_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
