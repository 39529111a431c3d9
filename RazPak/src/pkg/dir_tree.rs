//! Directory tree reconstruction from the directory record chain
//!
//! SPDX-FileCopyrightText: 2025 RazPak contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! Directory names are stored one character per record. Walking the records
//! in order and concatenating their characters spells out a path; a record
//! with a non-zero `start_index`/`end_index` closes the path accumulated so
//! far and assigns it a range of file indices.
//!
//! Branches are encoded with back-references: when a record carries a link,
//! the linked (later) record is a sibling that shares everything accumulated
//! before the current record. That shared prefix is prepended to the linked
//! record's name, so when the walk reaches it the record already spells out
//! its full path from the root marker. Such a record starts a new group: the
//! accumulated buffer is dropped before it is visited.

use std::ops::Range;

use indexmap::IndexMap;
use serde::Serialize;

use super::types::DirRecord;
use crate::error::{Error, Result};

/// Root marker seeded into the accumulation buffer.
pub const ROOT_MARKER: &[u8] = b"//";

/// A closed directory group: the file-index range it owns and the records
/// that spelled its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub start_index: u16,
    pub end_index: u16,
    /// Indices into the record list, accumulated since the previous closure
    pub records: Vec<usize>,
}

impl DirectoryEntry {
    /// File indices owned by this directory, `[start_index, end_index)`.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        usize::from(self.start_index)..usize::from(self.end_index)
    }
}

/// Mapping from logical directory path to the files it owns, in record order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirectoryTree {
    dirs: IndexMap<String, DirectoryEntry>,
}

impl DirectoryTree {
    /// Reconstruct the tree, recording each record's owning directory in
    /// `of_directory`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirectoryLink`] if a link points outside the
    /// record list, or [`Error::InvalidEncoding`] if a path is not UTF-8.
    pub fn build(records: &mut [DirRecord]) -> Result<Self> {
        let names = collect_names(records);
        TreeWalk::new(names).run(records)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&DirectoryEntry> {
        self.dirs.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DirectoryEntry)> {
        self.dirs.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.dirs.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// The directory owning `file_index`, if any closed group covers it.
    #[must_use]
    pub fn directory_of(&self, file_index: usize) -> Option<&str> {
        self.iter()
            .find(|(_, entry)| entry.range().contains(&file_index))
            .map(|(path, _)| path)
    }
}

/// Phase one: one addressable name slot per record, seeded with its character.
fn collect_names(records: &[DirRecord]) -> Vec<Vec<u8>> {
    records.iter().map(|r| vec![r.char_dir_name]).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupState {
    /// The buffer holds everything accumulated before the current record.
    Accumulating,
    /// The buffer was just dropped; the current record's own name already
    /// carries its full prefix.
    RootBoundary,
}

/// Phase two: walk the records, patching linked names in the arena and
/// closing groups.
struct TreeWalk {
    names: Vec<Vec<u8>>,
    current: Vec<u8>,
    state: GroupState,
    group: Vec<usize>,
    tree: DirectoryTree,
}

impl TreeWalk {
    fn new(names: Vec<Vec<u8>>) -> Self {
        Self {
            names,
            current: ROOT_MARKER.to_vec(),
            state: GroupState::Accumulating,
            group: Vec::new(),
            tree: DirectoryTree::default(),
        }
    }

    fn run(mut self, records: &mut [DirRecord]) -> Result<DirectoryTree> {
        for i in 0..records.len() {
            for link in records[i].links() {
                self.patch_link(i, link)?;
            }

            self.current.extend_from_slice(&self.names[i]);
            self.state = GroupState::Accumulating;
            self.group.push(i);

            if records[i].closes_group() {
                self.close_group(records, i)?;
            }
        }
        Ok(self.tree)
    }

    /// Everything accumulated before record `i`'s own character.
    fn prefix_before(&self, i: usize) -> Vec<u8> {
        match self.state {
            GroupState::Accumulating => self.current.clone(),
            GroupState::RootBoundary => {
                let own = &self.names[i];
                own[..own.len().saturating_sub(1)].to_vec()
            }
        }
    }

    fn patch_link(&mut self, i: usize, link: u16) -> Result<()> {
        let target = usize::from(link);
        if target >= self.names.len() {
            return Err(Error::InvalidDirectoryLink { record: i, link });
        }
        let mut patched = self.prefix_before(i);
        patched.extend_from_slice(&self.names[target]);
        self.names[target] = patched;
        Ok(())
    }

    fn close_group(&mut self, records: &mut [DirRecord], i: usize) -> Result<()> {
        let path = std::str::from_utf8(trim_root(&self.current))
            .map_err(|source| Error::InvalidEncoding {
                context: format!("directory path closed by record {i}"),
                source,
            })?
            .to_owned();

        let members = std::mem::take(&mut self.group);
        for &r in &members {
            records[r].of_directory = Some(path.clone());
        }

        let record = &records[i];
        tracing::trace!(
            "directory '{}' owns files {}..{}",
            path,
            record.start_index,
            record.end_index
        );
        self.tree.dirs.insert(
            path,
            DirectoryEntry {
                start_index: record.start_index,
                end_index: record.end_index,
                records: members,
            },
        );

        if self.next_starts_root(i) {
            self.current.clear();
            self.state = GroupState::RootBoundary;
        }
        Ok(())
    }

    fn next_starts_root(&self, i: usize) -> bool {
        self.names
            .get(i + 1)
            .is_some_and(|name| name.starts_with(ROOT_MARKER))
    }
}

fn trim_root(path: &[u8]) -> &[u8] {
    let start = path.iter().position(|&b| b != b'/').unwrap_or(path.len());
    let end = path.iter().rposition(|&b| b != b'/').map_or(start, |p| p + 1);
    &path[start..end]
}
