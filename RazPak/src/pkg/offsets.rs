//! Offset recalculation for repackaging
//!
//! SPDX-FileCopyrightText: 2025 RazPak contributors
//!
//! SPDX-License-Identifier: MIT

use super::types::FileEntry;
use super::{ALIGNED_EXTENSION, ALIGNMENT, FILE_DATA_OFFSET};
use crate::error::{Error, Result};

/// Zero padding written after a file of `length` bytes with `extension`.
///
/// Only `.jan` entries are padded, up to the next multiple of 512 bytes of
/// their own length; the loader expects that and nothing else.
#[must_use]
pub fn padding_for(extension: &str, length: usize) -> usize {
    if extension == ALIGNED_EXTENSION && length % ALIGNMENT != 0 {
        ALIGNMENT - length % ALIGNMENT
    } else {
        0
    }
}

/// Re-lay the file data region after content changes.
///
/// Entries keep their relative order by current `file_offset` (ties by
/// index) and are packed back to back from [`FILE_DATA_OFFSET`], each
/// followed by its padding. Lengths are taken from `data`.
///
/// Returns entry indices in final offset order.
pub(crate) fn recalculate(entries: &mut [FileEntry]) -> Result<Vec<usize>> {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| entries[i].file_offset);

    let mut current = FILE_DATA_OFFSET as u64;
    for &i in &order {
        let entry = &mut entries[i];
        let length = entry.data.len();
        let padding = padding_for(&entry.extension, length);

        entry.orig_file_offset = entry.file_offset;
        entry.file_offset = to_u32(current)?;
        entry.file_length = to_u32(length as u64)?;
        entry.padding_size = padding as u32;

        current += (length + padding) as u64;
    }
    // the final end offset must be addressable too
    to_u32(current)?;

    tracing::debug!(
        "Recalculated {} offsets, data ends at {}",
        entries.len(),
        current
    );
    Ok(order)
}

fn to_u32(offset: u64) -> Result<u32> {
    u32::try_from(offset).map_err(|_| Error::OffsetOverflow { offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, offset: u32, ext: &str, len: usize) -> FileEntry {
        let mut raw = [0u8; 16];
        raw[8..12].copy_from_slice(&offset.to_le_bytes());
        raw[12..16].copy_from_slice(&(len as u32).to_le_bytes());
        let mut entry = FileEntry::from_descriptor(&raw, index).unwrap();
        entry.extension = ext.to_string();
        entry.data = vec![index as u8; len];
        entry
    }

    #[test]
    fn test_padding_rule() {
        assert_eq!(padding_for("jan", 1), 511);
        assert_eq!(padding_for("jan", 512), 0);
        assert_eq!(padding_for("jan", 1000), 24);
        assert_eq!(padding_for("jan", 0), 0);
        assert_eq!(padding_for("dds", 1000), 0);
        assert_eq!(padding_for("JAN", 1000), 0);
    }

    #[test]
    fn test_packed_back_to_back_in_original_order() {
        // index order differs from offset order
        let mut entries = vec![
            entry(0, 600_000, "dds", 10),
            entry(1, 524_288, "jan", 700),
            entry(2, 700_000, "txt", 5),
        ];
        let order = recalculate(&mut entries).unwrap();
        assert_eq!(order, vec![1, 0, 2]);

        assert_eq!(entries[1].file_offset, 524_288);
        assert_eq!(entries[1].padding_size, 324);
        assert_eq!(entries[0].file_offset, 524_288 + 1024);
        assert_eq!(entries[2].file_offset, 524_288 + 1024 + 10);
        assert_eq!(entries[0].orig_file_offset, 600_000);

        for pair in order.windows(2) {
            let (a, b) = (&entries[pair[0]], &entries[pair[1]]);
            assert_eq!(a.file_offset + a.file_length + a.padding_size, b.file_offset);
        }
    }

    #[test]
    fn test_length_follows_data_and_padding_resets() {
        let mut entries = vec![entry(0, 524_288, "jan", 100)];
        recalculate(&mut entries).unwrap();
        assert_eq!(entries[0].padding_size, 412);

        entries[0].data = vec![0; 1024];
        recalculate(&mut entries).unwrap();
        assert_eq!(entries[0].file_length, 1024);
        assert_eq!(entries[0].padding_size, 0);
    }

    #[test]
    fn test_stable_for_equal_offsets() {
        let mut entries = vec![entry(0, 524_288, "dds", 0), entry(1, 524_288, "dds", 4)];
        let order = recalculate(&mut entries).unwrap();
        assert_eq!(order, vec![0, 1]);
        assert_eq!(entries[1].file_offset, 524_288);
    }
}
