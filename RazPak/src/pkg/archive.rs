//! The archive model: parse, inspect, replace, unpack and repackage

use std::fs;
use std::path::{Path, PathBuf};

use super::codec::slice_at;
use super::dir_tree::DirectoryTree;
use super::offsets;
use super::operations::{PkgFileInfo, PkgManifest};
use super::options::{RepackOptions, UnpackOptions};
use super::ppf::PpfArchive;
use super::reader::parse_pkg;
use super::string_table::StringTable;
use super::types::{
    Diagnostic, DirRecord, FileEntry, PkgPhase, PkgProgress, PkgPrologue, ProgressCallback,
};
use super::writer;
use super::{PKG_MAGIC, PPF_MAGIC};
use crate::error::{Error, Result};
use crate::utils::path::{archive_dir_path, archive_file_path};

/// Identifies a file for content replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelector {
    /// Position in the file table
    Index(usize),
    /// Logical path, `dir/name.ext`
    Path(String),
}

impl From<usize> for FileSelector {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for FileSelector {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for FileSelector {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

/// Any archive recognized by its magic tag.
#[derive(Debug)]
pub enum Archive {
    /// `ZPKG`, fully modeled
    Pkg(PkgArchive),
    /// `PPAK`, header only
    Ppf(PpfArchive),
}

impl Archive {
    /// Read a whole archive from disk and parse it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise the same
    /// errors as [`Archive::from_bytes`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_progress(path, &|_| {})
    }

    /// [`Archive::open`], reporting the read and parse phases.
    pub fn open_with_progress<P: AsRef<Path>>(path: P, progress: ProgressCallback) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening archive: '{}'", path.display());
        progress(&PkgProgress::with_file(
            PkgPhase::ReadingArchive,
            0,
            1,
            path.display().to_string(),
        ));
        Self::from_bytes_with_progress(fs::read(path)?, progress)
    }

    /// Parse an archive from its raw bytes, dispatching on the magic tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMagic`] for an unknown tag (nothing else
    /// is parsed), [`Error::TruncatedInput`] if a fixed region is cut short,
    /// and [`Error::UnknownOffset`], [`Error::InvalidEncoding`] or
    /// [`Error::InvalidDirectoryLink`] for corrupt tables.
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_progress(raw, &|_| {})
    }

    pub fn from_bytes_with_progress(raw: Vec<u8>, progress: ProgressCallback) -> Result<Self> {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(slice_at(&raw, 0, 4)?);

        match magic {
            PKG_MAGIC => Ok(Self::Pkg(parse_pkg(&raw, progress)?)),
            PPF_MAGIC => Ok(Self::Ppf(PpfArchive::new(raw))),
            other => Err(Error::UnsupportedMagic(other)),
        }
    }

    #[must_use]
    pub fn magic(&self) -> [u8; 4] {
        match self {
            Self::Pkg(pkg) => pkg.prologue.magic,
            Self::Ppf(ppf) => ppf.magic(),
        }
    }

    #[must_use]
    pub fn as_pkg(&self) -> Option<&PkgArchive> {
        match self {
            Self::Pkg(pkg) => Some(pkg),
            Self::Ppf(_) => None,
        }
    }

    pub fn as_pkg_mut(&mut self) -> Option<&mut PkgArchive> {
        match self {
            Self::Pkg(pkg) => Some(pkg),
            Self::Ppf(_) => None,
        }
    }

    /// Non-fatal findings from parsing; always empty for the stub format.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Pkg(pkg) => pkg.diagnostics(),
            Self::Ppf(_) => &[],
        }
    }

    /// Unpack every directory into `target_path`.
    pub fn unpack<P: AsRef<Path>>(&self, target_path: P) -> Result<()> {
        match self {
            Self::Pkg(pkg) => pkg.unpack(target_path),
            Self::Ppf(ppf) => ppf.unpack(target_path),
        }
    }

    /// Recalculate offsets and write a loadable archive to `save_path`.
    pub fn repackage<P: AsRef<Path>>(&mut self, save_path: P) -> Result<()> {
        match self {
            Self::Pkg(pkg) => pkg.repackage(save_path),
            Self::Ppf(ppf) => ppf.repackage(save_path),
        }
    }
}

/// A parsed `ZPKG` archive held fully in memory.
#[derive(Debug, Clone)]
pub struct PkgArchive {
    pub(super) prologue: PkgPrologue,
    /// Always in `file_index` order
    pub(super) entries: Vec<FileEntry>,
    pub(super) records: Vec<DirRecord>,
    pub(super) filenames: StringTable,
    pub(super) extensions: StringTable,
    pub(super) tree: DirectoryTree,
    pub(super) diagnostics: Vec<Diagnostic>,
}

impl PkgArchive {
    /// Parse a `ZPKG` archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMagic`] if the data is not a `ZPKG`
    /// archive, otherwise the same errors as [`Archive::from_bytes`].
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(slice_at(raw, 0, 4)?);
        if magic != PKG_MAGIC {
            return Err(Error::UnsupportedMagic(magic));
        }
        parse_pkg(raw, &|_| {})
    }

    #[must_use]
    pub fn prologue(&self) -> &PkgPrologue {
        &self.prologue
    }

    #[must_use]
    pub fn num_of_files(&self) -> usize {
        self.entries.len()
    }

    /// File entries in index order.
    #[must_use]
    pub fn files(&self) -> &[FileEntry] {
        &self.entries
    }

    #[must_use]
    pub fn file(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn dir_records(&self) -> &[DirRecord] {
        &self.records
    }

    #[must_use]
    pub fn directories(&self) -> &DirectoryTree {
        &self.tree
    }

    #[must_use]
    pub fn filenames(&self) -> &StringTable {
        &self.filenames
    }

    #[must_use]
    pub fn extensions(&self) -> &StringTable {
        &self.extensions
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Logical path of a file, `dir/name.ext`, if a directory owns it.
    #[must_use]
    pub fn file_path(&self, index: usize) -> Option<String> {
        let entry = self.entries.get(index)?;
        let dir = self.tree.directory_of(index)?;
        Some(join_logical(dir, &entry.file_name()))
    }

    /// Index of the file at a logical path.
    #[must_use]
    pub fn find_file(&self, path: &str) -> Option<usize> {
        self.tree.iter().find_map(|(dir, entry)| {
            entry.range().find(|&i| {
                self.entries
                    .get(i)
                    .is_some_and(|e| join_logical(dir, &e.file_name()) == path)
            })
        })
    }

    /// Logical paths of every file owned by a directory, in directory order.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.tree
            .iter()
            .flat_map(|(dir, entry)| {
                entry
                    .range()
                    .filter_map(|i| self.entries.get(i))
                    .map(move |e| join_logical(dir, &e.file_name()))
            })
            .collect()
    }

    /// A serializable summary of the archive.
    #[must_use]
    pub fn manifest(&self) -> PkgManifest {
        PkgManifest {
            magic: String::from_utf8_lossy(&self.prologue.magic).into_owned(),
            version: self.prologue.version,
            num_of_files: self.entries.len(),
            files: self
                .entries
                .iter()
                .map(|e| PkgFileInfo::from_entry(e, self.file_path(e.file_index)))
                .collect(),
            directories: self.tree.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }

    /// Replace a file's content. Offsets and lengths are updated on the
    /// next recalculation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileIndexOutOfRange`] or [`Error::FileNotFoundInPkg`]
    /// if the selector matches nothing.
    pub fn replace_file(&mut self, selector: impl Into<FileSelector>, data: Vec<u8>) -> Result<()> {
        let index = match selector.into() {
            FileSelector::Index(index) => index,
            FileSelector::Path(path) => self
                .find_file(&path)
                .ok_or(Error::FileNotFoundInPkg(path))?,
        };
        let count = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(Error::FileIndexOutOfRange { index, count })?;

        tracing::debug!(
            "Replacing {} (index {}): {} -> {} bytes",
            entry.file_name(),
            index,
            entry.data.len(),
            data.len()
        );
        entry.data = data;
        Ok(())
    }

    /// Re-lay the data region; returns file indices in final offset order.
    pub fn recalculate_file_offsets(&mut self) -> Result<Vec<usize>> {
        offsets::recalculate(&mut self.entries)
    }

    /// Recalculate offsets and serialize the whole archive to `writer`.
    pub fn write_to<W: std::io::Write>(&mut self, out: &mut W) -> Result<()> {
        let order = self.recalculate_file_offsets()?;
        writer::write_pkg(self, &order, out, &|_| {})
    }

    /// Recalculate offsets and serialize the whole archive into memory.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Recalculate offsets and write the archive to `save_path`.
    ///
    /// The archive is written to a temporary file beside `save_path` and
    /// renamed into place only once complete; on failure nothing is left
    /// at `save_path`.
    pub fn repackage<P: AsRef<Path>>(&mut self, save_path: P) -> Result<()> {
        self.repackage_with_progress(save_path, &RepackOptions::default(), &|_| {})
    }

    pub fn repackage_with_progress<P: AsRef<Path>>(
        &mut self,
        save_path: P,
        options: &RepackOptions,
        progress: ProgressCallback,
    ) -> Result<()> {
        let save_path = save_path.as_ref();
        progress(&PkgProgress::new(PkgPhase::RecalculatingOffsets, 0, 1));
        let order = self.recalculate_file_offsets()?;

        writer::write_pkg_file(self, &order, save_path, options, progress)?;

        tracing::info!(
            "Repackaged {} files to '{}'",
            self.entries.len(),
            save_path.display()
        );
        progress(&PkgProgress::new(
            PkgPhase::Complete,
            self.entries.len(),
            self.entries.len(),
        ));
        Ok(())
    }

    /// Write every directory's files under `target_path`.
    pub fn unpack<P: AsRef<Path>>(&self, target_path: P) -> Result<()> {
        self.unpack_with_options(target_path, &UnpackOptions::default(), &|_| {})
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if a directory path or file name would
    /// escape the target (nothing is written in that case), [`Error::FileIndexOutOfRange`] if a directory claims files
    /// the table doesn't have, or [`Error::Io`] on write failure.
    pub fn unpack_with_options<P: AsRef<Path>>(
        &self,
        target_path: P,
        options: &UnpackOptions,
        progress: ProgressCallback,
    ) -> Result<()> {
        let mut root = target_path.as_ref().to_path_buf();
        if let Some(subfolder) = &options.subfolder {
            root.push(subfolder);
        }

        // Every output path is resolved and checked before anything is created
        let count = self.entries.len();
        let mut plan = Vec::with_capacity(self.tree.len());
        for (path, dir) in self.tree.iter() {
            let full_path = archive_dir_path(&root, path)?;
            let mut files = Vec::with_capacity(dir.range().len());
            for index in dir.range() {
                let entry = self
                    .entries
                    .get(index)
                    .ok_or(Error::FileIndexOutOfRange { index, count })?;
                let output_path = archive_file_path(&full_path, &entry.file_name())?;
                files.push((entry, output_path));
            }
            plan.push(PlannedDir {
                path,
                full_path,
                files,
            });
        }

        let total_dirs = plan.len();
        for (i, dir) in plan.iter().enumerate() {
            progress(&PkgProgress::with_file(
                PkgPhase::CreatingDirectories,
                i + 1,
                total_dirs,
                dir.path,
            ));
            if dir.full_path.is_dir() {
                tracing::debug!(
                    "Trying to create path '{}' when it already exists",
                    dir.full_path.display()
                );
            } else {
                fs::create_dir_all(&dir.full_path)?;
            }
        }

        let total_files: usize = plan.iter().map(|dir| dir.files.len()).sum();
        let mut written = 0;
        let mut current = 0;
        for (entry, output_path) in plan.iter().flat_map(|dir| &dir.files) {
            current += 1;
            progress(&PkgProgress::with_file(
                PkgPhase::ExtractingFiles,
                current,
                total_files,
                entry.file_name(),
            ));

            if !options.overwrite && output_path.exists() {
                tracing::debug!("Skipping existing file '{}'", output_path.display());
                continue;
            }
            fs::write(output_path, &entry.data)?;
            written += 1;
        }

        tracing::info!(
            "Unpacked {} files into {} directories under '{}'",
            written,
            total_dirs,
            root.display()
        );
        progress(&PkgProgress::new(PkgPhase::Complete, total_files, total_files));
        Ok(())
    }
}

/// One directory of an unpack, with every output path already checked.
struct PlannedDir<'a> {
    path: &'a str,
    full_path: PathBuf,
    files: Vec<(&'a FileEntry, PathBuf)>,
}

fn join_logical(dir: &str, file_name: &str) -> String {
    if dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{dir}/{file_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::fixtures;
    use pretty_assertions::assert_eq;

    fn sample() -> PkgArchive {
        PkgArchive::from_bytes(&fixtures::sample_pkg()).unwrap()
    }

    #[test]
    fn test_logical_paths() {
        let pkg = sample();
        assert_eq!(
            pkg.list(),
            vec!["ab/raz.jan", "ab/ca_load.dds", "ab/d/brain.jan", "ac/lili.txt"]
        );
        assert_eq!(pkg.file_path(2).as_deref(), Some("ab/d/brain.jan"));
        assert_eq!(pkg.find_file("ac/lili.txt"), Some(3));
        assert_eq!(pkg.find_file("ac/missing.txt"), None);
    }

    #[test]
    fn test_replace_by_path_and_index() {
        let mut pkg = sample();
        pkg.replace_file("ab/ca_load.dds", vec![1, 2, 3]).unwrap();
        pkg.replace_file(3usize, b"bye".to_vec()).unwrap();
        assert_eq!(pkg.file(1).unwrap().data, vec![1, 2, 3]);
        assert_eq!(pkg.file(3).unwrap().data, b"bye".to_vec());
    }

    #[test]
    fn test_replace_misses() {
        let mut pkg = sample();
        assert!(matches!(
            pkg.replace_file(4usize, Vec::new()),
            Err(Error::FileIndexOutOfRange { index: 4, count: 4 })
        ));
        assert!(matches!(
            pkg.replace_file("nope.dds", Vec::new()),
            Err(Error::FileNotFoundInPkg(_))
        ));
    }

    #[test]
    fn test_unmodified_round_trip_is_byte_exact() {
        let raw = fixtures::sample_pkg();
        let mut pkg = PkgArchive::from_bytes(&raw).unwrap();
        assert_eq!(pkg.to_bytes().unwrap(), raw);
    }

    #[test]
    fn test_unknown_magic() {
        let mut raw = fixtures::sample_pkg();
        raw[..4].copy_from_slice(b"ABCD");
        assert!(matches!(
            Archive::from_bytes(raw),
            Err(Error::UnsupportedMagic(m)) if &m == b"ABCD"
        ));
    }

    #[test]
    fn test_pkg_from_bytes_rejects_stub() {
        let mut raw = fixtures::sample_pkg();
        raw[..4].copy_from_slice(b"PPAK");
        assert!(matches!(
            PkgArchive::from_bytes(&raw),
            Err(Error::UnsupportedMagic(m)) if m == PPF_MAGIC
        ));
        assert!(matches!(Archive::from_bytes(raw), Ok(Archive::Ppf(_))));
    }

    #[test]
    fn test_manifest_json() {
        let pkg = sample();
        let manifest = pkg.manifest();
        assert_eq!(manifest.magic, "ZPKG");
        assert_eq!(manifest.num_of_files, 4);
        let json = manifest.to_json().unwrap();
        assert!(json.contains("\"ab/d/brain.jan\""));
        assert!(json.contains("\"start_index\": 2"));
    }

    #[test]
    fn test_unpack_rejects_escaping_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![fixtures::FixtureFile::new("../../escaped", "txt", b"x")];
        let records = vec![fixtures::FixtureRecord::new(b'a', 0, 0, 0, 1)];
        let pkg = PkgArchive::from_bytes(&fixtures::build_pkg(&files, &records)).unwrap();

        let target = dir.path().join("target");
        assert!(matches!(pkg.unpack(&target), Err(Error::InvalidPath(_))));
        assert!(!dir.path().join("escaped.txt").exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_open_reports_parse_phases() {
        use std::cell::RefCell;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Psychonautsdata2.pkg");
        fs::write(&path, fixtures::sample_pkg()).unwrap();

        let phases = RefCell::new(Vec::new());
        let archive =
            Archive::open_with_progress(&path, &|p| phases.borrow_mut().push(p.phase)).unwrap();
        assert!(archive.as_pkg().is_some());
        assert_eq!(
            phases.into_inner(),
            vec![
                PkgPhase::ReadingArchive,
                PkgPhase::ParsingTables,
                PkgPhase::BuildingDirectories,
            ]
        );
    }
}
