//! Types for ZPKG archive handling
//!
//! SPDX-FileCopyrightText: 2025 RazPak contributors
//!
//! SPDX-License-Identifier: MIT

use std::fmt;

use byteorder::{LittleEndian, WriteBytesExt};
use serde::Serialize;

use super::codec::{read_u16_at, read_u32_at, slice_at};
use super::{DIR_RECORD_SIZE, FILE_DESCRIPTOR_SIZE, PROLOGUE_SIZE};
use crate::error::Result;

/// The fixed 32-byte prologue at the start of every archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PkgPrologue {
    /// Magic bytes (`ZPKG` or `PPAK`)
    pub magic: [u8; 4],
    pub version: u32,
    /// End of the extension table; also the end of all listings
    pub end_of_listings_offset: u32,
    pub num_of_files: u32,
    pub dir_records_offset: u32,
    pub num_of_dir_records: u32,
    pub filename_list_offset: u32,
    pub extension_list_offset: u32,
}

impl PkgPrologue {
    /// Parse the prologue from the start of an archive buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatedInput`](crate::Error::TruncatedInput) if the
    /// buffer is shorter than the prologue.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let bytes = slice_at(raw, 0, PROLOGUE_SIZE)?;
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);

        Ok(Self {
            magic,
            version: read_u32_at(bytes, 4)?,
            end_of_listings_offset: read_u32_at(bytes, 8)?,
            num_of_files: read_u32_at(bytes, 12)?,
            dir_records_offset: read_u32_at(bytes, 16)?,
            num_of_dir_records: read_u32_at(bytes, 20)?,
            filename_list_offset: read_u32_at(bytes, 24)?,
            extension_list_offset: read_u32_at(bytes, 28)?,
        })
    }

    /// Serialize the prologue (unpadded).
    pub fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.magic)?;
        for field in [
            self.version,
            self.end_of_listings_offset,
            self.num_of_files,
            self.dir_records_offset,
            self.num_of_dir_records,
            self.filename_list_offset,
            self.extension_list_offset,
        ] {
            writer.write_u32::<LittleEndian>(field)?;
        }
        Ok(())
    }
}

/// One packed file, as described by its 16-byte descriptor.
///
/// Descriptor layout: reserved byte, `u16` extension offset, reserved byte,
/// `u32` name offset, `u32` file offset, `u32` length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Position in parse order; stable across sorts
    pub file_index: usize,
    pub file_extension_offset_relative: u16,
    pub file_name_offset_relative: u32,
    /// Absolute offset of the file's bytes within the archive
    pub file_offset: u32,
    /// Offset before the last recalculation
    pub orig_file_offset: u32,
    pub file_length: u32,
    /// Zero bytes written after the data
    pub padding_size: u32,
    pub name: String,
    pub extension: String,
    pub data: Vec<u8>,
    reserved: [u8; 2],
}

impl FileEntry {
    /// Parse a descriptor. Name, extension and data are filled in later.
    pub(crate) fn from_descriptor(bytes: &[u8], file_index: usize) -> Result<Self> {
        let bytes = slice_at(bytes, 0, FILE_DESCRIPTOR_SIZE)?;
        let file_offset = read_u32_at(bytes, 8)?;
        Ok(Self {
            file_index,
            file_extension_offset_relative: read_u16_at(bytes, 1)?,
            file_name_offset_relative: read_u32_at(bytes, 4)?,
            file_offset,
            orig_file_offset: file_offset,
            file_length: read_u32_at(bytes, 12)?,
            padding_size: 0,
            name: String::new(),
            extension: String::new(),
            data: Vec::new(),
            reserved: [bytes[0], bytes[3]],
        })
    }

    /// Serialize this entry's 16-byte descriptor.
    pub fn write_descriptor<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u8(self.reserved[0])?;
        writer.write_u16::<LittleEndian>(self.file_extension_offset_relative)?;
        writer.write_u8(self.reserved[1])?;
        writer.write_u32::<LittleEndian>(self.file_name_offset_relative)?;
        writer.write_u32::<LittleEndian>(self.file_offset)?;
        writer.write_u32::<LittleEndian>(self.file_length)?;
        Ok(())
    }

    /// `name.extension`, the on-disk file name used when unpacking.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }
}

/// One directory record: a single path character plus links and an optional
/// file-index range.
///
/// Record layout: `u8` character, reserved byte, then `u16` `link_1`,
/// `link_2`, `record_id`, `start_index` and `end_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirRecord {
    pub char_dir_name: u8,
    pub link_1: u16,
    pub link_2: u16,
    pub record_id: u16,
    pub start_index: u16,
    pub end_index: u16,
    /// Absolute offset of this record in the archive it was read from
    pub offset: usize,
    /// Full path of the directory group this record belongs to, once closed
    pub of_directory: Option<String>,
    reserved: u8,
}

impl DirRecord {
    pub(crate) fn parse(bytes: &[u8], offset: usize) -> Result<Self> {
        let bytes = slice_at(bytes, 0, DIR_RECORD_SIZE)?;
        Ok(Self {
            char_dir_name: bytes[0],
            link_1: read_u16_at(bytes, 2)?,
            link_2: read_u16_at(bytes, 4)?,
            record_id: read_u16_at(bytes, 6)?,
            start_index: read_u16_at(bytes, 8)?,
            end_index: read_u16_at(bytes, 10)?,
            offset,
            of_directory: None,
            reserved: bytes[1],
        })
    }

    /// Serialize this record's 12 bytes.
    pub fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u8(self.char_dir_name)?;
        writer.write_u8(self.reserved)?;
        for field in [
            self.link_1,
            self.link_2,
            self.record_id,
            self.start_index,
            self.end_index,
        ] {
            writer.write_u16::<LittleEndian>(field)?;
        }
        Ok(())
    }

    /// True if this record closes a directory group.
    #[must_use]
    pub fn closes_group(&self) -> bool {
        self.start_index != 0 || self.end_index != 0
    }

    /// Non-zero links, `link_1` first.
    pub fn links(&self) -> impl Iterator<Item = u16> {
        [self.link_1, self.link_2].into_iter().filter(|&l| l != 0)
    }
}

/// Region of the archive a structural diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Region {
    FileDescriptors,
    DirectoryRecords,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileDescriptors => f.write_str("file descriptors"),
            Self::DirectoryRecords => f.write_str("directory records"),
        }
    }
}

/// A non-fatal inconsistency found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// The prologue's count disagrees with the number of records read.
    CountMismatch {
        region: Region,
        declared: u32,
        parsed: usize,
    },
    /// A region did not end exactly where the next one starts.
    OffsetMismatch {
        region: Region,
        expected: u32,
        actual: usize,
    },
    /// A directory claims file indices past the end of the file table.
    DirectoryRangeOutOfBounds {
        path: String,
        start: u16,
        end: u16,
        files: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountMismatch {
                region,
                declared,
                parsed,
            } => write!(
                f,
                "{region}: header declares {declared} but {parsed} were read"
            ),
            Self::OffsetMismatch {
                region,
                expected,
                actual,
            } => write!(
                f,
                "{region}: ended at offset {actual}, next region starts at {expected}"
            ),
            Self::DirectoryRangeOutOfBounds {
                path,
                start,
                end,
                files,
            } => write!(
                f,
                "directory '{path}' owns files [{start}, {end}) but archive has {files}"
            ),
        }
    }
}

/// Progress information during PKG operations
#[derive(Debug, Clone)]
pub struct PkgProgress {
    /// Current operation phase
    pub phase: PkgPhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current file being processed (if applicable)
    pub current_file: Option<String>,
}

impl PkgProgress {
    #[must_use]
    pub fn new(phase: PkgPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    #[must_use]
    pub fn with_file(
        phase: PkgPhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of a PKG operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PkgPhase {
    ReadingArchive,
    ParsingTables,
    BuildingDirectories,
    RecalculatingOffsets,
    /// Writing prologue, descriptors, records and string tables
    WritingHeader,
    /// Writing packed file data
    WritingFiles,
    CreatingDirectories,
    /// Writing unpacked files to disk
    ExtractingFiles,
    Complete,
}

impl PkgPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadingArchive => "Reading archive",
            Self::ParsingTables => "Parsing tables",
            Self::BuildingDirectories => "Building directory tree",
            Self::RecalculatingOffsets => "Recalculating offsets",
            Self::WritingHeader => "Writing header",
            Self::WritingFiles => "Writing files",
            Self::CreatingDirectories => "Creating directories",
            Self::ExtractingFiles => "Extracting files",
            Self::Complete => "Complete",
        }
    }
}

/// Progress callback type
pub type ProgressCallback<'a> = &'a dyn Fn(&PkgProgress);
