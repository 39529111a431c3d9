//! High-level archive operations on files on disk

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::archive::{Archive, FileSelector};
use super::dir_tree::DirectoryTree;
use super::options::{RepackOptions, UnpackOptions};
use super::types::{Diagnostic, FileEntry, ProgressCallback};
use crate::error::{Error, Result};

/// Per-file listing details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PkgFileInfo {
    pub index: usize,
    /// Logical path, if a directory owns the file
    pub path: Option<String>,
    pub name: String,
    pub extension: String,
    pub offset: u32,
    pub length: u32,
    pub padding: u32,
}

impl PkgFileInfo {
    pub(crate) fn from_entry(entry: &FileEntry, path: Option<String>) -> Self {
        Self {
            index: entry.file_index,
            path,
            name: entry.name.clone(),
            extension: entry.extension.clone(),
            offset: entry.file_offset,
            length: entry.file_length,
            padding: entry.padding_size,
        }
    }
}

/// Serializable summary of an archive: header, files and directories.
#[derive(Debug, Clone, Serialize)]
pub struct PkgManifest {
    pub magic: String,
    pub version: u32,
    pub num_of_files: usize,
    pub files: Vec<PkgFileInfo>,
    pub directories: DirectoryTree,
    pub diagnostics: Vec<Diagnostic>,
}

impl PkgManifest {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// High-level PKG archive operations.
pub struct PkgOperations;

impl PkgOperations {
    /// Read and parse an archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or any parse error
    /// from [`Archive::from_bytes`].
    pub fn read<P: AsRef<Path>>(pkg_path: P) -> Result<Archive> {
        Archive::open(pkg_path)
    }

    /// Extract an archive into a directory.
    pub fn extract<P: AsRef<Path>>(pkg_path: P, output_dir: P) -> Result<()> {
        Self::extract_with_options(pkg_path, output_dir, &UnpackOptions::default(), &|_| {})
    }

    /// Extract an archive with options and a progress callback.
    ///
    /// Stub-format archives are accepted and nothing is written.
    pub fn extract_with_options<P: AsRef<Path>>(
        pkg_path: P,
        output_dir: P,
        options: &UnpackOptions,
        progress: ProgressCallback,
    ) -> Result<()> {
        match Archive::open_with_progress(pkg_path, progress)? {
            Archive::Pkg(pkg) => pkg.unpack_with_options(output_dir, options, progress),
            Archive::Ppf(ppf) => ppf.unpack(output_dir),
        }
    }

    /// Logical paths of all files in an archive.
    pub fn list<P: AsRef<Path>>(pkg_path: P) -> Result<Vec<String>> {
        Ok(Self::read(pkg_path)?
            .as_pkg()
            .map(super::PkgArchive::list)
            .unwrap_or_default())
    }

    /// Listing with offsets and sizes, in file index order.
    pub fn list_detailed<P: AsRef<Path>>(pkg_path: P) -> Result<Vec<PkgFileInfo>> {
        Ok(Self::read(pkg_path)?
            .as_pkg()
            .map(|pkg| pkg.manifest().files)
            .unwrap_or_default())
    }

    /// The archive manifest as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMagic`] for stub-format archives.
    pub fn manifest_json<P: AsRef<Path>>(pkg_path: P) -> Result<String> {
        let archive = Self::read(pkg_path)?;
        let pkg = archive
            .as_pkg()
            .ok_or(Error::UnsupportedMagic(archive.magic()))?;
        pkg.manifest().to_json()
    }

    /// Replace files with the contents of files on disk and write the
    /// repackaged archive to `output_path`.
    ///
    /// Returns the number of files replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMagic`] for stub-format archives,
    /// [`Error::FileIndexOutOfRange`] or [`Error::FileNotFoundInPkg`] for a
    /// selector that matches nothing, and [`Error::Io`] if a replacement
    /// cannot be read or the output cannot be written.
    pub fn replace_files<P: AsRef<Path>>(
        pkg_path: P,
        replacements: &[(FileSelector, PathBuf)],
        output_path: P,
    ) -> Result<usize> {
        Self::replace_files_with_progress(
            pkg_path,
            replacements,
            output_path,
            &RepackOptions::default(),
            &|_| {},
        )
    }

    pub fn replace_files_with_progress<P: AsRef<Path>>(
        pkg_path: P,
        replacements: &[(FileSelector, PathBuf)],
        output_path: P,
        options: &RepackOptions,
        progress: ProgressCallback,
    ) -> Result<usize> {
        let mut archive = Self::read(pkg_path)?;
        let magic = archive.magic();
        let pkg = archive
            .as_pkg_mut()
            .ok_or(Error::UnsupportedMagic(magic))?;

        for (selector, source) in replacements {
            let data = fs::read(source)?;
            tracing::info!(
                "Replacing {:?} with '{}' ({} bytes)",
                selector,
                source.display(),
                data.len()
            );
            pkg.replace_file(selector.clone(), data)?;
        }

        pkg.repackage_with_progress(output_path, options, progress)?;
        Ok(replacements.len())
    }
}
