//! ZPKG parsing
//!
//! SPDX-FileCopyrightText: 2025 RazPak contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Parsing is tolerant of structural drift between the prologue and the
//! tables (counts or region boundaries that don't line up): those are
//! recorded as [`Diagnostic`]s and parsing continues. Anything that would
//! corrupt file identity or file bytes (truncation, unknown string offsets,
//! bad links) is a hard error.

use super::archive::PkgArchive;
use super::codec::slice_at;
use super::dir_tree::DirectoryTree;
use super::string_table::StringTable;
use super::types::{
    Diagnostic, DirRecord, FileEntry, PkgPhase, PkgProgress, PkgPrologue, ProgressCallback, Region,
};
use super::{DIR_RECORD_SIZE, FILE_DESCRIPTIONS_OFFSET, FILE_DESCRIPTOR_SIZE};
use crate::error::{Result, StringTableKind};

pub(super) fn parse_pkg(raw: &[u8], progress: ProgressCallback) -> Result<PkgArchive> {
    progress(&PkgProgress::new(PkgPhase::ParsingTables, 0, 2));
    let prologue = PkgPrologue::parse(raw)?;
    let mut diagnostics = Vec::new();

    // File descriptors run from the fixed table start up to the directory
    // records. The declared counts are only compared against, never trusted.
    let mut offset = FILE_DESCRIPTIONS_OFFSET;
    let mut entries = Vec::new();
    while offset < prologue.dir_records_offset as usize {
        let bytes = slice_at(raw, offset, FILE_DESCRIPTOR_SIZE)?;
        entries.push(FileEntry::from_descriptor(bytes, entries.len())?);
        offset += FILE_DESCRIPTOR_SIZE;
    }
    if entries.len() != prologue.num_of_files as usize {
        diagnostics.push(Diagnostic::CountMismatch {
            region: Region::FileDescriptors,
            declared: prologue.num_of_files,
            parsed: entries.len(),
        });
    }
    if offset != prologue.dir_records_offset as usize {
        diagnostics.push(Diagnostic::OffsetMismatch {
            region: Region::FileDescriptors,
            expected: prologue.dir_records_offset,
            actual: offset,
        });
    }

    // Directory records continue from wherever the descriptors ended
    let mut records = Vec::new();
    while offset < prologue.filename_list_offset as usize {
        let bytes = slice_at(raw, offset, DIR_RECORD_SIZE)?;
        records.push(DirRecord::parse(bytes, offset)?);
        offset += DIR_RECORD_SIZE;
    }
    if records.len() != prologue.num_of_dir_records as usize {
        diagnostics.push(Diagnostic::CountMismatch {
            region: Region::DirectoryRecords,
            declared: prologue.num_of_dir_records,
            parsed: records.len(),
        });
    }
    if offset != prologue.filename_list_offset as usize {
        diagnostics.push(Diagnostic::OffsetMismatch {
            region: Region::DirectoryRecords,
            expected: prologue.filename_list_offset,
            actual: offset,
        });
    }

    let filenames = StringTable::from_blob(
        StringTableKind::Filenames,
        table_blob(raw, prologue.filename_list_offset, prologue.extension_list_offset)?,
    )?;
    let extensions = StringTable::from_blob(
        StringTableKind::Extensions,
        table_blob(raw, prologue.extension_list_offset, prologue.end_of_listings_offset)?,
    )?;

    for entry in &mut entries {
        entry.name = filenames.resolve(entry.file_name_offset_relative)?.to_owned();
        entry.extension = extensions
            .resolve(u32::from(entry.file_extension_offset_relative))?
            .to_owned();
        entry.data = slice_at(raw, entry.file_offset as usize, entry.file_length as usize)?.to_vec();
    }

    progress(&PkgProgress::new(PkgPhase::BuildingDirectories, 1, 2));
    let tree = DirectoryTree::build(&mut records)?;
    for (path, dir) in tree.iter() {
        if dir.end_index < dir.start_index || usize::from(dir.end_index) > entries.len() {
            diagnostics.push(Diagnostic::DirectoryRangeOutOfBounds {
                path: path.to_string(),
                start: dir.start_index,
                end: dir.end_index,
                files: entries.len(),
            });
        }
    }

    for diagnostic in &diagnostics {
        tracing::warn!("Inconsistent PKG structure: {}", diagnostic);
    }
    tracing::info!(
        "Parsed PKG v{}: {} files, {} directory records, {} directories",
        prologue.version,
        entries.len(),
        records.len(),
        tree.len()
    );

    Ok(PkgArchive {
        prologue,
        entries,
        records,
        filenames,
        extensions,
        tree,
        diagnostics,
    })
}

/// The bytes of a string table between `start` and `end`, without the
/// leading and trailing NUL markers.
fn table_blob(raw: &[u8], start: u32, end: u32) -> Result<&[u8]> {
    let from = start as usize + 1;
    let to = (end as usize).saturating_sub(1);
    if to <= from {
        return Ok(&[]);
    }
    slice_at(raw, from, to - from)
}
