//! Little-endian field helpers for fixed-width PKG records
//!
//! SPDX-FileCopyrightText: 2025 RazPak contributors
//!
//! SPDX-License-Identifier: MIT

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Borrow `len` bytes of `data` starting at `offset`.
///
/// # Errors
///
/// Returns [`Error::TruncatedInput`] if the region runs past the end of `data`.
pub fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(Error::TruncatedInput {
            offset,
            needed: len,
            available: data.len().saturating_sub(offset),
        })
}

/// Decode a little-endian `u32` from the first four bytes of `bytes`.
///
/// # Errors
///
/// Returns [`Error::TruncatedInput`] if fewer than four bytes are given.
pub fn decode_u32_le(bytes: &[u8]) -> Result<u32> {
    Ok(LittleEndian::read_u32(slice_at(bytes, 0, 4)?))
}

/// Decode a little-endian `u16` from the first two bytes of `bytes`.
///
/// # Errors
///
/// Returns [`Error::TruncatedInput`] if fewer than two bytes are given.
pub fn decode_u16_le(bytes: &[u8]) -> Result<u16> {
    Ok(LittleEndian::read_u16(slice_at(bytes, 0, 2)?))
}

#[must_use]
pub fn encode_u32_le(value: u32) -> [u8; 4] {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    buf
}

#[must_use]
pub fn encode_u16_le(value: u16) -> [u8; 2] {
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, value);
    buf
}

/// Read a `u32` field at `offset` inside `data`.
pub(crate) fn read_u32_at(data: &[u8], offset: usize) -> Result<u32> {
    decode_u32_le(slice_at(data, offset, 4)?)
}

/// Read a `u16` field at `offset` inside `data`.
pub(crate) fn read_u16_at(data: &[u8], offset: usize) -> Result<u16> {
    decode_u16_le(slice_at(data, offset, 2)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_u32() {
        assert_eq!(decode_u32_le(&[0x00, 0x00, 0x08, 0x00]).unwrap(), 524288);
        // extra trailing bytes are ignored
        assert_eq!(decode_u32_le(&[1, 0, 0, 0, 0xFF]).unwrap(), 1);
    }

    #[test]
    fn test_decode_u16() {
        assert_eq!(decode_u16_le(&[0x34, 0x12]).unwrap(), 0x1234);
    }

    #[test]
    fn test_encode_matches_le_bytes() {
        assert_eq!(encode_u32_le(0xDEAD_BEEF), 0xDEAD_BEEFu32.to_le_bytes());
        assert_eq!(encode_u16_le(513), [0x01, 0x02]);
    }

    #[test]
    fn test_truncated_input() {
        match decode_u32_le(&[1, 2, 3]) {
            Err(Error::TruncatedInput { offset, needed, available }) => {
                assert_eq!((offset, needed, available), (0, 4, 3));
            }
            other => panic!("expected TruncatedInput, got {other:?}"),
        }
        assert!(matches!(
            read_u16_at(&[0u8; 4], 3),
            Err(Error::TruncatedInput { offset: 3, needed: 2, available: 1 })
        ));
    }

    #[test]
    fn test_slice_at_overflow() {
        assert!(slice_at(&[0u8; 8], usize::MAX, 2).is_err());
        assert_eq!(slice_at(&[1, 2, 3, 4], 1, 2).unwrap(), &[2, 3]);
    }
}
