//! Builds minimal compound files for unit and integration tests.
//!
//! The layout is fixed: version 3 with 512-byte sectors, sector 0 holds the
//! FAT, the directory follows, then every stream in order. The mini stream
//! cutoff is zero so all streams live in regular sectors.

use super::consts::*;

const SECTOR: usize = 512;

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn directory_entry(
    name: &str,
    entry_type: u8,
    right: u32,
    child: u32,
    start: u32,
    size: u32,
) -> Vec<u8> {
    let mut entry = Vec::with_capacity(DIRENTRY_SIZE);
    let units: Vec<u16> = name.encode_utf16().collect();
    for unit in &units {
        push_u16(&mut entry, *unit);
    }
    entry.resize(64, 0);
    push_u16(&mut entry, ((units.len() + 1) * 2) as u16);
    entry.push(entry_type);
    entry.push(1); // black
    push_u32(&mut entry, NOSTREAM);
    push_u32(&mut entry, right);
    push_u32(&mut entry, child);
    entry.resize(116, 0);
    push_u32(&mut entry, start);
    push_u32(&mut entry, size);
    entry.resize(DIRENTRY_SIZE, 0);
    entry
}

/// Build a compound file whose root storage holds `streams`.
pub fn build_compound_file(streams: &[(&str, &[u8])]) -> Vec<u8> {
    let dir_sectors = (streams.len() + 1).div_ceil(SECTOR / DIRENTRY_SIZE);
    let mut fat = vec![FATSECT];

    for i in 0..dir_sectors {
        let id = fat.len() as u32;
        fat.push(if i + 1 == dir_sectors { ENDOFCHAIN } else { id + 1 });
    }

    let mut starts = Vec::with_capacity(streams.len());
    for (_, content) in streams {
        let count = content.len().div_ceil(SECTOR);
        if count == 0 {
            starts.push(ENDOFCHAIN);
            continue;
        }
        let first = fat.len() as u32;
        starts.push(first);
        for i in 0..count {
            let id = first + i as u32;
            fat.push(if i + 1 == count { ENDOFCHAIN } else { id + 1 });
        }
    }
    assert!(fat.len() <= SECTOR / 4, "test compound file too large");
    fat.resize(SECTOR / 4, FREESECT);

    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[0u8; 16]);
    push_u16(&mut out, 0x3E);
    push_u16(&mut out, 3);
    push_u16(&mut out, BYTE_ORDER_LE);
    push_u16(&mut out, 9);
    push_u16(&mut out, 6);
    out.extend_from_slice(&[0u8; 6]);
    push_u32(&mut out, 0); // directory sectors (v3)
    push_u32(&mut out, 1); // FAT sectors
    push_u32(&mut out, 1); // first directory sector
    push_u32(&mut out, 0);
    push_u32(&mut out, 0); // mini stream cutoff
    push_u32(&mut out, ENDOFCHAIN);
    push_u32(&mut out, 0);
    push_u32(&mut out, ENDOFCHAIN);
    push_u32(&mut out, 0);
    push_u32(&mut out, 0); // FAT lives in sector 0
    for _ in 1..HEADER_DIFAT_ENTRIES {
        push_u32(&mut out, FREESECT);
    }
    assert_eq!(out.len(), HEADER_SIZE);

    for entry in &fat {
        push_u32(&mut out, *entry);
    }

    let root_child = if streams.is_empty() { NOSTREAM } else { 1 };
    let mut directory = directory_entry("Root Entry", STGTY_ROOT, NOSTREAM, root_child, ENDOFCHAIN, 0);
    for (i, (name, content)) in streams.iter().enumerate() {
        let right = if i + 1 < streams.len() { i as u32 + 2 } else { NOSTREAM };
        directory.extend(directory_entry(
            name,
            STGTY_STREAM,
            right,
            NOSTREAM,
            starts[i],
            content.len() as u32,
        ));
    }
    directory.resize(dir_sectors * SECTOR, 0);
    out.extend_from_slice(&directory);

    for (_, content) in streams {
        let padded = content.len().div_ceil(SECTOR) * SECTOR;
        let start = out.len();
        out.extend_from_slice(content);
        out.resize(start + padded, 0);
    }

    if out.len() < MINIMAL_OLEFILE_SIZE {
        out.resize(MINIMAL_OLEFILE_SIZE, 0);
    }
    out
}
