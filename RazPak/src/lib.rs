//! # RazPak
//!
//! A pure-Rust library for the `ZPKG` game data archives used by Psychonauts.
//!
//! ## Supported Formats
//!
//! - **ZPKG archives** - Parse, unpack, replace file contents and repackage
//!   byte-exactly, keeping the archive loadable by the game
//! - **PPAK level packs** - Recognized; unpack and repackage are no-ops
//!
//! ## Quick Start
//!
//! ```no_run
//! use razpak::pkg::{Archive, PkgOperations};
//!
//! // List the logical paths inside an archive
//! let files = PkgOperations::list("Psychonautsdata2.pkg")?;
//! println!("Found {} files", files.len());
//!
//! // Unpack everything, preserving the in-game folder layout
//! PkgOperations::extract("Psychonautsdata2.pkg", "unpacked/")?;
//!
//! // Swap one texture and write a new archive
//! let mut archive = Archive::open("Psychonautsdata2.pkg")?;
//! if let Some(pkg) = archive.as_pkg_mut() {
//!     pkg.replace_file("textures/menu/ca_load.dds", std::fs::read("ca_load.dds")?)?;
//! }
//! archive.repackage("Psychonautsdata2.pkg_re")?;
//! # Ok::<(), razpak::Error>(())
//! ```
//!
//! Parsing is tolerant: structural inconsistencies between the prologue and
//! the tables are collected as [`pkg::Diagnostic`]s (and logged through
//! `tracing`) instead of failing.

pub mod error;
pub mod pkg;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result, StringTableKind};
    pub use crate::pkg::{
        Archive, Diagnostic, DirectoryTree, FileEntry, FileSelector, PkgArchive, PkgOperations,
        PkgPhase, PkgProgress, PpfArchive, RepackOptions, UnpackOptions, find_archives,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
