//! Error types for `RazPak`

use std::fmt;
use std::str::Utf8Error;

use thiserror::Error;

/// Which of the two string tables a lookup was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringTableKind {
    Filenames,
    Extensions,
}

impl fmt::Display for StringTableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filenames => f.write_str("filename"),
            Self::Extensions => f.write_str("extension"),
        }
    }
}

/// The error type for `RazPak` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== PKG Archive Errors ====================
    /// The buffer ends before a fixed-size region does.
    #[error("truncated input: need {needed} bytes at offset {offset}, only {available} available")]
    TruncatedInput {
        /// Start of the region that was being read.
        offset: usize,
        /// Number of bytes the region requires.
        needed: usize,
        /// Number of bytes actually present from `offset`.
        available: usize,
    },

    /// The archive does not start with a recognized 4-byte tag.
    #[error("unsupported archive magic: {0:?}")]
    UnsupportedMagic([u8; 4]),

    /// A descriptor points at an offset that no string-table entry starts at.
    #[error("no {table} table entry starts at offset {offset}")]
    UnknownOffset {
        /// The table that was searched.
        table: StringTableKind,
        /// The offset that was looked up.
        offset: u32,
    },

    /// Name bytes are not valid UTF-8.
    #[error("invalid UTF-8 in {context}: {source}")]
    InvalidEncoding {
        /// What was being decoded (a table name or a directory path).
        context: String,
        /// The underlying decode error.
        source: Utf8Error,
    },

    /// A directory record links to a record index outside the record list.
    #[error("directory record {record} links to missing record {link}")]
    InvalidDirectoryLink {
        /// Index of the record holding the link.
        record: usize,
        /// The out-of-range link value.
        link: u16,
    },

    /// A file index does not exist in the file table.
    #[error("file index {index} out of range (archive has {count} files)")]
    FileIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of file entries in the archive.
        count: usize,
    },

    /// No file with this logical path exists in the archive.
    #[error("file not found in PKG: {0}")]
    FileNotFoundInPkg(String),

    /// Header, descriptors, records and string tables no longer fit before the data region.
    #[error("header block is {size} bytes, exceeds the fixed data start at {limit}")]
    HeaderBlockOverflow {
        /// Serialized size of the header block.
        size: usize,
        /// The fixed file data offset.
        limit: usize,
    },

    /// A recomputed file offset or length no longer fits in 32 bits.
    #[error("file offset {offset} does not fit in a 32-bit field")]
    OffsetOverflow {
        /// The offending offset.
        offset: u64,
    },

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    // ==================== Serialization Errors ====================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}

/// A specialized Result type for `RazPak` operations.
pub type Result<T> = std::result::Result<T, Error>;
