//! Archive discovery under a game data root

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Find all `.pkg` and `.ppf` archives under `dir`, recursively.
///
/// # Returns
/// A sorted list of archive paths. Unreadable entries are skipped.
pub fn find_archives<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut archives: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.file_type().is_file()
                && e.path().extension().is_some_and(|ext| {
                    ext.eq_ignore_ascii_case("pkg") || ext.eq_ignore_ascii_case("ppf")
                })
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    archives.sort();
    tracing::debug!("Found {} archives", archives.len());
    archives
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_archives() {
        let dir = tempfile::tempdir().unwrap();
        let levels = dir.path().join("WorkResource").join("PCLevelPackFiles");
        fs::create_dir_all(&levels).unwrap();
        fs::write(dir.path().join("Psychonautsdata2.PKG"), b"").unwrap();
        fs::write(levels.join("ASCO.ppf"), b"").unwrap();
        fs::write(levels.join("notes.txt"), b"").unwrap();

        let found = find_archives(dir.path());
        assert_eq!(
            found,
            vec![
                dir.path().join("Psychonautsdata2.PKG"),
                levels.join("ASCO.ppf"),
            ]
        );
    }
}
