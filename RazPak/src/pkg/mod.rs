//! ZPKG archive reader/writer
//!
//! A ZPKG archive is a flat container: a 32-byte prologue, a table of 16-byte
//! file descriptors, a chain of 12-byte directory records, two NUL-delimited
//! string tables (file names and extensions), and finally the packed file
//! data starting at a fixed offset.
//!
//! ```text
//! 0x000000  prologue (32 bytes, zero padded to 512)
//! 0x000200  file descriptors      16 * num_files
//!           directory records     12 * num_dir_records
//!           filename table        \0name\0name\0...
//!           extension table       \0ext\0ext\0...
//!           zero padding
//! 0x080000  file data (+ alignment padding for .jan files)
//! ```

mod archive;
mod batch;
pub mod codec;
mod dir_tree;
mod offsets;
mod operations;
mod options;
mod ppf;
mod reader;
pub mod string_table;
mod types;
mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use archive::{Archive, FileSelector, PkgArchive};
pub use batch::find_archives;
pub use dir_tree::{DirectoryEntry, DirectoryTree};
pub use operations::{PkgFileInfo, PkgManifest, PkgOperations};
pub use options::{RepackOptions, UnpackOptions};
pub use ppf::PpfArchive;
pub use string_table::StringTable;
pub use types::{
    Diagnostic, DirRecord, FileEntry, PkgPhase, PkgPrologue, PkgProgress, ProgressCallback,
    Region,
};

/// Magic tag of the fully modeled archive format.
pub const PKG_MAGIC: [u8; 4] = *b"ZPKG";

/// Magic tag of the stub container format.
pub const PPF_MAGIC: [u8; 4] = *b"PPAK";

/// Size of the prologue fields read from the start of the archive.
pub const PROLOGUE_SIZE: usize = 32;

/// Offset of the first file descriptor; the prologue is zero padded up to here.
pub const FILE_DESCRIPTIONS_OFFSET: usize = 512;

/// Offset at which packed file data begins.
pub const FILE_DATA_OFFSET: usize = 524288;

/// Size of one file descriptor record.
pub const FILE_DESCRIPTOR_SIZE: usize = 16;

/// Size of one directory record.
pub const DIR_RECORD_SIZE: usize = 12;

/// Extension whose entries are padded to a multiple of [`ALIGNMENT`].
pub const ALIGNED_EXTENSION: &str = "jan";

/// Block size for [`ALIGNED_EXTENSION`] padding.
pub const ALIGNMENT: usize = 512;
