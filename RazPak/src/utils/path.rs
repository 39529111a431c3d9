//! Path utilities

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Normalize path separators to forward slashes (for archive paths)
pub fn normalize_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Resolve a logical archive directory under `root`.
///
/// Both separators are accepted; empty segments are ignored.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] if a segment is `.` or `..`, which would
/// place files outside `root`.
pub fn archive_dir_path(root: &Path, logical: &str) -> Result<PathBuf> {
    let mut full = root.to_path_buf();
    for segment in normalize_path(logical).split('/') {
        match segment {
            "" => {}
            "." | ".." => return Err(Error::InvalidPath(logical.to_string())),
            s if s.contains(':') => return Err(Error::InvalidPath(logical.to_string())),
            s => full.push(s),
        }
    }
    Ok(full)
}

/// Resolve an archive file name inside an already-resolved directory.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] unless `file_name` is a single plain path
/// component: no separators, no drive or stream marker, not `.` or `..`.
pub fn archive_file_path(dir: &Path, file_name: &str) -> Result<PathBuf> {
    if matches!(file_name, "" | "." | "..") || file_name.contains(['/', '\\', ':']) {
        return Err(Error::InvalidPath(file_name.to_string()));
    }
    Ok(dir.join(file_name))
}
