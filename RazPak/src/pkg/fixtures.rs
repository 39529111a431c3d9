//! Synthetic ZPKG archives for tests
//!
//! Std-only so integration tests can include it by path.

#![allow(dead_code)]

const DESCRIPTORS_AT: usize = 512;
const DATA_AT: usize = 524288;

pub struct FixtureFile {
    pub name: String,
    pub ext: String,
    pub data: Vec<u8>,
}

impl FixtureFile {
    pub fn new(name: &str, ext: &str, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            ext: ext.to_string(),
            data: data.to_vec(),
        }
    }
}

pub struct FixtureRecord {
    pub ch: u8,
    pub link_1: u16,
    pub link_2: u16,
    pub start: u16,
    pub end: u16,
}

impl FixtureRecord {
    pub fn new(ch: u8, link_1: u16, link_2: u16, start: u16, end: u16) -> Self {
        Self {
            ch,
            link_1,
            link_2,
            start,
            end,
        }
    }
}

pub fn jan_padding(len: usize) -> usize {
    if len % 512 == 0 { 0 } else { 512 - len % 512 }
}

/// Four files in three directories: `ab` (raz.jan, ca_load.dds),
/// `ab/d` (brain.jan) and `ac` (lili.txt).
pub fn sample_files() -> Vec<FixtureFile> {
    vec![
        FixtureFile::new("raz", "jan", &[0x11; 700]),
        FixtureFile::new("ca_load", "dds", b"texture bytes"),
        FixtureFile::new("brain", "jan", &[0x22; 512]),
        FixtureFile::new("lili", "txt", b"hello"),
    ]
}

pub fn sample_records() -> Vec<FixtureRecord> {
    vec![
        FixtureRecord::new(b'a', 0, 0, 0, 0),
        FixtureRecord::new(b'b', 4, 0, 0, 2),
        FixtureRecord::new(b'/', 0, 0, 0, 0),
        FixtureRecord::new(b'd', 0, 0, 2, 3),
        FixtureRecord::new(b'c', 0, 0, 3, 4),
    ]
}

pub fn sample_pkg() -> Vec<u8> {
    build_pkg(&sample_files(), &sample_records())
}

/// Build an archive whose data region follows index order.
pub fn build_pkg(files: &[FixtureFile], records: &[FixtureRecord]) -> Vec<u8> {
    let order: Vec<usize> = (0..files.len()).collect();
    build_pkg_with_order(files, records, &order)
}

/// Build an archive whose data region stores files in `order`.
/// `.jan` files are padded to a multiple of 512 bytes.
pub fn build_pkg_with_order(
    files: &[FixtureFile],
    records: &[FixtureRecord],
    order: &[usize],
) -> Vec<u8> {
    build(files, records, order, 0)
}

/// Build an archive with `gap` zero bytes between the directory records and
/// the file name table; the prologue points past the gap.
pub fn build_pkg_with_table_gap(
    files: &[FixtureFile],
    records: &[FixtureRecord],
    gap: usize,
) -> Vec<u8> {
    let order: Vec<usize> = (0..files.len()).collect();
    build(files, records, &order, gap)
}

fn build(files: &[FixtureFile], records: &[FixtureRecord], order: &[usize], gap: usize) -> Vec<u8> {
    let mut filenames = vec![0u8];
    let mut name_offsets = Vec::new();
    for file in files {
        name_offsets.push(filenames.len() as u32);
        filenames.extend_from_slice(file.name.as_bytes());
        filenames.push(0);
    }

    let mut extensions = vec![0u8];
    let mut known: Vec<(String, u16)> = Vec::new();
    let mut ext_offsets = Vec::new();
    for file in files {
        let offset = match known.iter().find(|(e, _)| *e == file.ext) {
            Some((_, o)) => *o,
            None => {
                let o = extensions.len() as u16;
                extensions.extend_from_slice(file.ext.as_bytes());
                extensions.push(0);
                known.push((file.ext.clone(), o));
                o
            }
        };
        ext_offsets.push(offset);
    }

    let dir_records_offset = DESCRIPTORS_AT + 16 * files.len();
    let filename_list_offset = dir_records_offset + 12 * records.len() + gap;
    let extension_list_offset = filename_list_offset + filenames.len();
    let end_of_listings = extension_list_offset + extensions.len();
    assert!(end_of_listings <= DATA_AT);

    let mut data_offsets = vec![0u32; files.len()];
    let mut data = Vec::new();
    for &i in order {
        data_offsets[i] = (DATA_AT + data.len()) as u32;
        data.extend_from_slice(&files[i].data);
        if files[i].ext == "jan" {
            data.resize(data.len() + jan_padding(files[i].data.len()), 0);
        }
    }

    let mut out = Vec::with_capacity(DATA_AT + data.len());
    out.extend_from_slice(b"ZPKG");
    for field in [
        1u32,
        end_of_listings as u32,
        files.len() as u32,
        dir_records_offset as u32,
        records.len() as u32,
        filename_list_offset as u32,
        extension_list_offset as u32,
    ] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.resize(DESCRIPTORS_AT, 0);

    for (i, file) in files.iter().enumerate() {
        out.push(0);
        out.extend_from_slice(&ext_offsets[i].to_le_bytes());
        out.push(0);
        out.extend_from_slice(&name_offsets[i].to_le_bytes());
        out.extend_from_slice(&data_offsets[i].to_le_bytes());
        out.extend_from_slice(&(file.data.len() as u32).to_le_bytes());
    }

    for (i, record) in records.iter().enumerate() {
        out.push(record.ch);
        out.push(0);
        for field in [record.link_1, record.link_2, i as u16, record.start, record.end] {
            out.extend_from_slice(&field.to_le_bytes());
        }
    }

    out.resize(out.len() + gap, 0);
    out.extend_from_slice(&filenames);
    out.extend_from_slice(&extensions);
    out.resize(DATA_AT, 0);
    out.extend_from_slice(&data);
    out
}
