//! ZPKG serialization
//!
//! SPDX-FileCopyrightText: 2025 RazPak contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! The header block (prologue, descriptors, directory records and string
//! tables) is always exactly [`FILE_DATA_OFFSET`] bytes; file data follows in
//! offset order, each entry followed by its padding.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use super::archive::PkgArchive;
use super::options::RepackOptions;
use super::types::{PkgPhase, PkgProgress, ProgressCallback};
use super::{FILE_DATA_OFFSET, FILE_DESCRIPTIONS_OFFSET};
use crate::error::{Error, Result};

/// Serialize everything before the file data region.
pub(super) fn header_block(pkg: &PkgArchive) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(FILE_DATA_OFFSET);

    pkg.prologue.write_to(&mut out)?;
    out.resize(FILE_DESCRIPTIONS_OFFSET, 0);

    for entry in &pkg.entries {
        entry.write_descriptor(&mut out)?;
    }
    for record in &pkg.records {
        record.write_to(&mut out)?;
    }
    out.extend_from_slice(&pkg.filenames.to_bytes());
    out.extend_from_slice(&pkg.extensions.to_bytes());

    if out.len() > FILE_DATA_OFFSET {
        return Err(Error::HeaderBlockOverflow {
            size: out.len(),
            limit: FILE_DATA_OFFSET,
        });
    }
    out.resize(FILE_DATA_OFFSET, 0);
    Ok(out)
}

/// Write the header block and then file data in `order` (final offset order).
pub(super) fn write_pkg<W: Write>(
    pkg: &PkgArchive,
    order: &[usize],
    writer: &mut W,
    progress: ProgressCallback,
) -> Result<()> {
    progress(&PkgProgress::new(PkgPhase::WritingHeader, 0, 1));
    writer.write_all(&header_block(pkg)?)?;

    let total = order.len();
    for (n, &i) in order.iter().enumerate() {
        let entry = &pkg.entries[i];
        progress(&PkgProgress::with_file(
            PkgPhase::WritingFiles,
            n + 1,
            total,
            entry.file_name(),
        ));
        writer.write_all(&entry.data)?;
        io::copy(&mut io::repeat(0).take(u64::from(entry.padding_size)), &mut *writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the archive to `save_path` through a temporary file in the same
/// directory, renamed into place once fully written and synced.
pub(super) fn write_pkg_file(
    pkg: &PkgArchive,
    order: &[usize],
    save_path: &Path,
    options: &RepackOptions,
    progress: ProgressCallback,
) -> Result<()> {
    let parent = save_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if options.create_parent_dirs {
        fs::create_dir_all(parent)?;
    }

    // Dropping the temp file on any error path removes it
    let mut temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(&mut temp);
        write_pkg(pkg, order, &mut writer, progress)?;
    }
    temp.as_file().sync_all()?;
    temp.persist(save_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::fixtures;

    #[test]
    fn test_header_block_is_fixed_size() {
        let pkg = PkgArchive::from_bytes(&fixtures::sample_pkg()).unwrap();
        let header = header_block(&pkg).unwrap();
        assert_eq!(header.len(), FILE_DATA_OFFSET);
        assert_eq!(&header[..4], b"ZPKG");
    }

    #[test]
    fn test_header_overflow() {
        let mut pkg = PkgArchive::from_bytes(&fixtures::sample_pkg()).unwrap();
        let huge = vec!["x".repeat(FILE_DATA_OFFSET)];
        pkg.filenames = crate::pkg::StringTable::from_entries(
            crate::error::StringTableKind::Filenames,
            huge,
        );
        assert!(matches!(
            header_block(&pkg),
            Err(Error::HeaderBlockOverflow { .. })
        ));
    }

    #[test]
    fn test_write_reports_progress() {
        use std::cell::RefCell;

        let mut pkg = PkgArchive::from_bytes(&fixtures::sample_pkg()).unwrap();
        let order = pkg.recalculate_file_offsets().unwrap();
        let phases = RefCell::new(Vec::new());
        let mut out = Vec::new();
        write_pkg(&pkg, &order, &mut out, &|p| phases.borrow_mut().push(p.phase)).unwrap();

        let phases = phases.into_inner();
        assert_eq!(phases[0], PkgPhase::WritingHeader);
        assert_eq!(
            phases.iter().filter(|p| **p == PkgPhase::WritingFiles).count(),
            4
        );
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut pkg = PkgArchive::from_bytes(&fixtures::sample_pkg()).unwrap();
        pkg.filenames = crate::pkg::StringTable::from_entries(
            crate::error::StringTableKind::Filenames,
            vec!["x".repeat(FILE_DATA_OFFSET)],
        );
        let target = dir.path().join("out.pkg");
        assert!(pkg.repackage(&target).is_err());
        assert!(!target.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_oversized_padding_is_written_in_full() {
        let mut pkg = PkgArchive::from_bytes(&fixtures::sample_pkg()).unwrap();
        pkg.entries[1].padding_size = 4096;
        let mut out = Vec::new();
        write_pkg(&pkg, &[0, 1, 2, 3], &mut out, &|_| {}).unwrap();

        assert_eq!(out.len(), FILE_DATA_OFFSET + 700 + 13 + 4096 + 512 + 5);
        let padding_at = FILE_DATA_OFFSET + 700 + 13;
        assert!(out[padding_at..padding_at + 4096].iter().all(|&b| b == 0));
        assert_eq!(&out[out.len() - 5..], b"hello");
    }
}
