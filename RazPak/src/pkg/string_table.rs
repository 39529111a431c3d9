//! NUL-delimited string tables
//!
//! SPDX-FileCopyrightText: 2025 RazPak contributors
//!
//! SPDX-License-Identifier: MIT
//!
//! On disk a table is `\0entry\0entry\0...entry\0`. Descriptors refer to an
//! entry by the byte offset of its first character relative to the start of
//! the table, so the first entry lives at offset 1.

use std::collections::HashMap;

use crate::error::{Error, Result, StringTableKind};

/// An offset-indexed string table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable {
    kind: StringTableKind,
    entries: Vec<String>,
    by_offset: HashMap<u32, usize>,
}

impl StringTable {
    /// Build a table from its blob, without the leading and trailing NUL markers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if an entry is not valid UTF-8.
    pub fn from_blob(kind: StringTableKind, blob: &[u8]) -> Result<Self> {
        let mut entries = Vec::new();
        for raw in blob.split(|&b| b == 0) {
            let entry = std::str::from_utf8(raw).map_err(|source| Error::InvalidEncoding {
                context: format!("{kind} table entry {}", entries.len()),
                source,
            })?;
            entries.push(entry.to_owned());
        }
        Ok(Self::from_entries(kind, entries))
    }

    /// Build a table from already-decoded entries.
    #[must_use]
    pub fn from_entries(kind: StringTableKind, entries: Vec<String>) -> Self {
        let mut by_offset = HashMap::with_capacity(entries.len());
        let mut offset = 1u32;
        for (i, entry) in entries.iter().enumerate() {
            by_offset.insert(offset, i);
            offset = offset.saturating_add(entry.len() as u32 + 1);
        }
        Self {
            kind,
            entries,
            by_offset,
        }
    }

    /// Look up the entry starting exactly at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOffset`] if no entry starts there.
    pub fn resolve(&self, offset: u32) -> Result<&str> {
        self.by_offset
            .get(&offset)
            .map(|&i| self.entries[i].as_str())
            .ok_or(Error::UnknownOffset {
                table: self.kind,
                offset,
            })
    }

    /// Offsets of every entry, in table order.
    pub fn offsets(&self) -> impl Iterator<Item = u32> + '_ {
        let mut offset = 1u32;
        self.entries.iter().map(move |entry| {
            let current = offset;
            offset = offset.saturating_add(entry.len() as u32 + 1);
            current
        })
    }

    #[must_use]
    pub fn kind(&self) -> StringTableKind {
        self.kind
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialized size, including the leading NUL and every terminator.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        1 + self.entries.iter().map(|e| e.len() + 1).sum::<usize>()
    }

    /// Serialize as `\0entry\0entry\0...`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(0);
        for entry in &self.entries {
            out.extend_from_slice(entry.as_bytes());
            out.push(0);
        }
        out
    }
}
