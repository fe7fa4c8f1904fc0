use super::consts::*;
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw compound file header (512 bytes)
///
/// This represents the on-disk format of the header sector.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawHeader {
    magic: [u8; 8],
    clsid: [u8; 16],
    minor_version: U16<LE>,
    dll_version: U16<LE>,
    byte_order: U16<LE>,
    sector_shift: U16<LE>,
    mini_sector_shift: U16<LE>,
    reserved: [u8; 6],
    num_dir_sectors: U32<LE>,
    num_fat_sectors: U32<LE>,
    first_dir_sector: U32<LE>,
    transaction: U32<LE>,
    mini_stream_cutoff: U32<LE>,
    first_minifat_sector: U32<LE>,
    num_minifat_sectors: U32<LE>,
    first_difat_sector: U32<LE>,
    num_difat_sectors: U32<LE>,
    /// First 109 FAT sector locations
    difat: [U32<LE>; HEADER_DIFAT_ENTRIES],
}

/// Raw OLE directory entry structure (128 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    /// Node color (0 = red, 1 = black)
    node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    creation_time: U64<LE>,
    modified_time: U64<LE>,
    start_sector: U32<LE>,
    stream_size: U64<LE>,
}

/// A decoded directory entry (stream or storage)
#[derive(Debug, Clone)]
struct DirectoryEntry {
    name: String,
    entry_type: u8,
    sid_left: u32,
    sid_right: u32,
    sid_child: u32,
    start_sector: u32,
    size: u64,
}

/// Error types for compound file parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OleError {
    NotOleFile,
    InvalidFormat(String),
    CorruptedFile(String),
    StreamNotFound(String),
    StreamTooLarge { limit: usize },
}

impl std::fmt::Display for OleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OleError::NotOleFile => write!(f, "not an OLE compound file"),
            OleError::InvalidFormat(s) => write!(f, "invalid format: {}", s),
            OleError::CorruptedFile(s) => write!(f, "corrupted file: {}", s),
            OleError::StreamNotFound(s) => write!(f, "stream not found: {}", s),
            OleError::StreamTooLarge { limit } => {
                write!(f, "stream larger than {} bytes", limit)
            },
        }
    }
}

impl std::error::Error for OleError {}

/// Read-only view of an OLE2 structured storage file held in memory.
///
/// All tables are parsed up front; streams are copied out on request. Every
/// sector chain is walked with a step bound, so a FAT that loops back on
/// itself ends in [`OleError::CorruptedFile`] instead of spinning.
#[derive(Debug)]
pub struct OleFile<'a> {
    data: &'a [u8],
    sector_size: usize,
    mini_sector_size: usize,
    mini_stream_cutoff: u32,
    max_stream_size: usize,
    fat: Vec<u32>,
    minifat: Vec<u32>,
    entries: Vec<DirectoryEntry>,
    ministream: Vec<u8>,
}

impl<'a> OleFile<'a> {
    /// Parse the header, FAT, directory and MiniFAT of `data`.
    ///
    /// No stream (the mini stream included) may exceed `max_stream_size`
    /// bytes.
    pub fn open(data: &'a [u8], max_stream_size: usize) -> Result<Self, OleError> {
        if !is_ole_file(data) {
            return Err(OleError::NotOleFile);
        }

        let header = RawHeader::read_from_bytes(&data[..HEADER_SIZE])
            .map_err(|_| OleError::InvalidFormat("unreadable header".to_string()))?;

        if header.byte_order.get() != BYTE_ORDER_LE {
            return Err(OleError::InvalidFormat("invalid byte order".to_string()));
        }

        let sector_shift = header.sector_shift.get();
        let sector_size = match (header.dll_version.get(), sector_shift) {
            (3, 9) => 512,
            (4, 12) => 4096,
            _ => {
                return Err(OleError::InvalidFormat(format!(
                    "unsupported sector shift {} for version {}",
                    sector_shift,
                    header.dll_version.get()
                )));
            },
        };

        let mini_sector_shift = header.mini_sector_shift.get();
        if mini_sector_shift >= sector_shift {
            return Err(OleError::InvalidFormat("invalid mini sector shift".to_string()));
        }

        let mut ole = OleFile {
            data,
            sector_size,
            mini_sector_size: 1usize << mini_sector_shift,
            mini_stream_cutoff: header.mini_stream_cutoff.get(),
            max_stream_size,
            fat: Vec::new(),
            minifat: Vec::new(),
            entries: Vec::new(),
            ministream: Vec::new(),
        };

        ole.load_fat(&header)?;
        ole.load_directory(header.first_dir_sector.get())?;

        let first_minifat = header.first_minifat_sector.get();
        if header.num_minifat_sectors.get() > 0 && first_minifat != ENDOFCHAIN {
            ole.load_minifat(first_minifat)?;
        }

        Ok(ole)
    }

    /// Load the File Allocation Table from the header DIFAT and any DIFAT
    /// sectors that follow it.
    ///
    /// Each FAT sector may be listed once, so the table never holds more
    /// entries than the file has sectors to describe.
    fn load_fat(&mut self, header: &RawHeader) -> Result<(), OleError> {
        let max_steps = self.sector_count();
        let mut listed = vec![false; max_steps];
        let mut fat_sectors = Vec::new();
        let mut add_fat_sector = |sector_id: u32| -> Result<(), OleError> {
            match listed.get_mut(sector_id as usize) {
                Some(seen) if !*seen => {
                    *seen = true;
                    fat_sectors.push(sector_id);
                    Ok(())
                },
                Some(_) => Err(OleError::CorruptedFile(format!(
                    "FAT sector {} listed twice",
                    sector_id
                ))),
                None => Err(OleError::CorruptedFile(format!(
                    "FAT sector {} beyond end of file",
                    sector_id
                ))),
            }
        };

        for sector_id in header.difat.iter().map(|v| v.get()).take_while(|&s| s <= MAXREGSECT) {
            add_fat_sector(sector_id)?;
        }

        let entries_per_sector = self.sector_size / 4;
        let mut difat_sector = header.first_difat_sector.get();
        let mut remaining = header.num_difat_sectors.get();
        let mut steps = 0;

        while remaining > 0 && difat_sector <= MAXREGSECT {
            steps += 1;
            if steps > max_steps {
                return Err(OleError::CorruptedFile("DIFAT chain loops".to_string()));
            }

            let sector = self.sector(difat_sector)?;
            let entries = sector_entries(sector);
            // The last slot links to the next DIFAT sector
            let split = entries.len().min(entries_per_sector.saturating_sub(1));
            let (locations, next) = entries.split_at(split);
            for &sector_id in locations.iter().take_while(|&&s| s <= MAXREGSECT) {
                add_fat_sector(sector_id)?;
            }
            difat_sector = next.first().copied().unwrap_or(ENDOFCHAIN);
            remaining -= 1;
        }

        if fat_sectors.is_empty() {
            return Err(OleError::CorruptedFile("no FAT sectors".to_string()));
        }

        self.fat.reserve(fat_sectors.len() * entries_per_sector);
        for sector_id in fat_sectors {
            let sector = self.sector(sector_id)?;
            self.fat.extend(sector_entries(sector));
        }

        Ok(())
    }

    fn load_directory(&mut self, first_dir_sector: u32) -> Result<(), OleError> {
        let dir_data = self.read_fat_chain(first_dir_sector, None)?;

        self.entries = dir_data
            .chunks_exact(DIRENTRY_SIZE)
            .map(parse_directory_entry)
            .collect::<Result<_, _>>()?;

        let root = self
            .entries
            .first()
            .ok_or_else(|| OleError::CorruptedFile("empty directory".to_string()))?;
        if root.entry_type != STGTY_ROOT {
            return Err(OleError::CorruptedFile("missing root entry".to_string()));
        }

        Ok(())
    }

    fn load_minifat(&mut self, first_minifat_sector: u32) -> Result<(), OleError> {
        let minifat_data = self.read_fat_chain(first_minifat_sector, None)?;
        self.minifat = sector_entries(&minifat_data);

        // The mini stream is the content of the root entry
        let (start, size) = (self.entries[0].start_sector, self.entries[0].size);
        self.ministream = self.read_fat_chain(start, Some(size))?;
        Ok(())
    }

    /// Number of whole or partial sectors after the header.
    #[inline]
    fn sector_count(&self) -> usize {
        (self.data.len() - HEADER_SIZE).div_ceil(self.sector_size)
    }

    /// A single sector; the last sector of the file may be short.
    fn sector(&self, sector_id: u32) -> Result<&'a [u8], OleError> {
        let start = (sector_id as usize)
            .checked_add(1)
            .and_then(|n| n.checked_mul(self.sector_size))
            .filter(|&start| start < self.data.len())
            .ok_or_else(|| {
                OleError::CorruptedFile(format!("sector {} beyond end of file", sector_id))
            })?;
        let end = (start + self.sector_size).min(self.data.len());
        Ok(&self.data[start..end])
    }

    /// Follow a chain in the FAT, stopping early once `size` bytes are read.
    fn read_fat_chain(&self, start_sector: u32, size: Option<u64>) -> Result<Vec<u8>, OleError> {
        let mut data = Vec::new();
        let mut sector = start_sector;
        let mut steps = 0;

        while sector != ENDOFCHAIN {
            if size.is_some_and(|size| data.len() as u64 >= size) {
                break;
            }
            steps += 1;
            if steps > self.fat.len() {
                return Err(OleError::CorruptedFile("sector chain loops".to_string()));
            }
            let next = *self.fat.get(sector as usize).ok_or_else(|| {
                OleError::CorruptedFile(format!("invalid sector index {} in FAT", sector))
            })?;

            data.extend_from_slice(self.sector(sector)?);
            if data.len() > self.max_stream_size.saturating_add(self.sector_size) {
                return Err(OleError::StreamTooLarge {
                    limit: self.max_stream_size,
                });
            }

            sector = next;
        }

        Ok(data)
    }

    /// Follow a chain in the MiniFAT.
    fn read_minifat_chain(&self, start_sector: u32, size: u64) -> Result<Vec<u8>, OleError> {
        let mut data = Vec::new();
        let mut sector = start_sector;
        let mut steps = 0;

        while sector != ENDOFCHAIN && (data.len() as u64) < size {
            steps += 1;
            if steps > self.minifat.len() {
                return Err(OleError::CorruptedFile("mini sector chain loops".to_string()));
            }
            let next = *self.minifat.get(sector as usize).ok_or_else(|| {
                OleError::CorruptedFile(format!("invalid sector index {} in MiniFAT", sector))
            })?;

            let position = sector as usize * self.mini_sector_size;
            let chunk = self
                .ministream
                .get(position..position + self.mini_sector_size)
                .ok_or_else(|| OleError::CorruptedFile("mini sector out of bounds".to_string()))?;
            data.extend_from_slice(chunk);

            sector = next;
        }

        Ok(data)
    }

    /// Read the stream at `path`, e.g. `&["WordDocument"]`.
    pub fn open_stream(&self, path: &[&str]) -> Result<Vec<u8>, OleError> {
        let entry = self.find_entry(path)?;

        if entry.entry_type != STGTY_STREAM {
            return Err(OleError::InvalidFormat(format!(
                "{} is not a stream",
                path.join("/")
            )));
        }
        if entry.size > self.max_stream_size as u64 {
            return Err(OleError::StreamTooLarge {
                limit: self.max_stream_size,
            });
        }

        let mut data = if entry.size < self.mini_stream_cutoff as u64 {
            self.read_minifat_chain(entry.start_sector, entry.size)?
        } else {
            self.read_fat_chain(entry.start_sector, Some(entry.size))?
        };

        if (data.len() as u64) < entry.size {
            return Err(OleError::CorruptedFile(format!(
                "stream {} is shorter than its declared size",
                path.join("/")
            )));
        }
        data.truncate(entry.size as usize);
        Ok(data)
    }

    /// Check if a stream or storage exists
    pub fn exists(&self, path: &[&str]) -> bool {
        self.find_entry(path).is_ok()
    }

    fn find_entry(&self, path: &[&str]) -> Result<&DirectoryEntry, OleError> {
        let mut current = &self.entries[0];
        for &name in path {
            if current.entry_type != STGTY_STORAGE && current.entry_type != STGTY_ROOT {
                return Err(OleError::StreamNotFound(path.join("/")));
            }
            current = self
                .find_child_by_name(current.sid_child, name)
                .ok_or_else(|| OleError::StreamNotFound(path.join("/")))?;
        }
        Ok(current)
    }

    /// Search the sibling tree rooted at `sid` for `name` (case-insensitive).
    fn find_child_by_name(&self, sid: u32, name: &str) -> Option<&DirectoryEntry> {
        let mut visited = vec![false; self.entries.len()];
        let mut pending = vec![sid];

        while let Some(sid) = pending.pop() {
            let Some(entry) = self.entries.get(sid as usize) else {
                continue;
            };
            if std::mem::replace(&mut visited[sid as usize], true) {
                continue;
            }
            if entry.name.to_lowercase() == name.to_lowercase() {
                return Some(entry);
            }
            pending.push(entry.sid_left);
            pending.push(entry.sid_right);
        }

        None
    }
}

fn parse_directory_entry(data: &[u8]) -> Result<DirectoryEntry, OleError> {
    let raw = RawDirectoryEntry::read_from_bytes(data)
        .map_err(|_| OleError::InvalidFormat("failed to parse directory entry".to_string()))?;

    let name_len = (raw.name_len.get() as usize).min(64);
    let name = decode_utf16le(&raw.name[..name_len.saturating_sub(2)]);

    Ok(DirectoryEntry {
        name,
        entry_type: raw.entry_type,
        sid_left: raw.sid_left.get(),
        sid_right: raw.sid_right.get(),
        sid_child: raw.sid_child.get(),
        start_sector: raw.start_sector.get(),
        // Version 3 files only define the low 32 bits
        size: raw.stream_size.get() & 0xFFFF_FFFF,
    })
}

/// Interpret a sector (or table stream) as little-endian u32 entries
fn sector_entries(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4)
        .filter_map(|chunk| U32::<LE>::read_from_bytes(chunk).ok())
        .map(|v| v.get())
        .collect()
}

/// Decode UTF-16LE bytes to String
fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}

/// Check if a file/data is an OLE file by checking magic bytes
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= MINIMAL_OLEFILE_SIZE && data.starts_with(MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::test_support::build_compound_file;

    #[test]
    fn test_open_streams() {
        let data = build_compound_file(&[
            ("WordDocument", b"word stream".as_slice()),
            ("1Table", &[7u8; 700]),
        ]);
        let ole = OleFile::open(&data, 1 << 20).unwrap();

        assert!(ole.exists(&["WordDocument"]));
        assert!(ole.exists(&["worddocument"]));
        assert!(!ole.exists(&["0Table"]));
        assert_eq!(ole.open_stream(&["WordDocument"]).unwrap(), b"word stream");
        assert_eq!(ole.open_stream(&["1Table"]).unwrap(), vec![7u8; 700]);
        assert!(matches!(
            ole.open_stream(&["Missing"]),
            Err(OleError::StreamNotFound(_))
        ));
    }

    #[test]
    fn test_stream_size_limit() {
        let data = build_compound_file(&[("Big", &[1u8; 2048])]);
        let ole = OleFile::open(&data, 1024).unwrap();
        assert_eq!(
            ole.open_stream(&["Big"]),
            Err(OleError::StreamTooLarge { limit: 1024 })
        );
    }

    #[test]
    fn test_rejects_short_and_foreign_input() {
        assert_eq!(
            OleFile::open(MAGIC, 1024).unwrap_err(),
            OleError::NotOleFile
        );
        assert_eq!(
            OleFile::open(&[0u8; 2048], 1024).unwrap_err(),
            OleError::NotOleFile
        );
    }

    #[test]
    fn test_truncated_file_is_corrupted() {
        let data = build_compound_file(&[("WordDocument", &[b'x'; 1500])]);
        let ole = OleFile::open(&data[..1600], 1 << 20).unwrap();
        assert!(matches!(
            ole.open_stream(&["WordDocument"]),
            Err(OleError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_fat_cycle_is_detected() {
        let mut data = build_compound_file(&[("Loop", &[0u8; 1024])]);
        // The directory lives in sector 1; point its FAT entry at itself
        let fat_entry = HEADER_SIZE + 4;
        data[fat_entry..fat_entry + 4].copy_from_slice(&1u32.to_le_bytes());
        assert!(matches!(
            OleFile::open(&data, 1 << 20),
            Err(OleError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_repeated_fat_sector_is_corrupted() {
        let mut data = build_compound_file(&[("A", b"a".as_slice())]);
        // Second header DIFAT slot repeats sector 0
        data[0x50..0x54].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            OleFile::open(&data, 1 << 20),
            Err(OleError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_difat_sector_repeating_one_fat_sector() {
        // Sectors 2 and 3 hold zeros: as a DIFAT sector, 127 references to sector 0
        let mut data = build_compound_file(&[("Zeros", &[0u8; 1024])]);
        data[0x44..0x48].copy_from_slice(&2u32.to_le_bytes());
        data[0x48..0x4C].copy_from_slice(&1u32.to_le_bytes());
        assert!(matches!(
            OleFile::open(&data, 1 << 20),
            Err(OleError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_fat_sector_beyond_end_is_corrupted() {
        let mut data = build_compound_file(&[("A", b"a".as_slice())]);
        data[0x50..0x54].copy_from_slice(&4000u32.to_le_bytes());
        assert!(matches!(
            OleFile::open(&data, 1 << 20),
            Err(OleError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_bad_byte_order() {
        let mut data = build_compound_file(&[("A", b"a".as_slice())]);
        data[0x1C] = 0;
        assert!(matches!(
            OleFile::open(&data, 1024),
            Err(OleError::InvalidFormat(_))
        ));
    }
}
