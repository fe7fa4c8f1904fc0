/// Piece Table parser for DOC files.
///
/// The piece table maps Character Positions (CP) to File Characters (FC)
/// in the WordDocument stream, handling text stored in different locations
/// and encodings.
///
/// References:
/// - [MS-DOC] 2.4.1 Clx (Complex file information)
/// - [MS-DOC] 2.9.179 Pcd (Piece Descriptor)
use crate::common::binary::{read_u16_le, read_u32_le};
use crate::common::encoding::{decode_codepage, decode_utf16};

/// Size of a piece descriptor in the PlcPcd
const PCD_SIZE: usize = 8;

/// Bit of the raw FC that marks 8-bit (cp1252) text
const FC_COMPRESSED: u32 = 0x4000_0000;

/// A text piece - maps a range of CPs to an FC in the WordDocument stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPiece {
    pub cp_start: u32,
    pub cp_end: u32,
    /// Byte offset of the first character in the WordDocument stream
    pub fc: u32,
    /// Whether the text is UTF-16LE (true) or single-byte cp1252 (false)
    pub is_unicode: bool,
}

/// Piece Table - manages the mapping between CP and FC.
#[derive(Debug, Clone)]
pub struct PieceTable {
    /// All text pieces, sorted by CP
    pieces: Vec<TextPiece>,
}

impl PieceTable {
    /// Parse a piece table from the Clx in the table stream.
    ///
    /// Returns `None` if the Clx is truncated or has no piece descriptor
    /// table.
    pub fn parse(clx_data: &[u8]) -> Option<Self> {
        let mut offset = 0;

        // Skip RgPrc entries (type 0x01), each with a 16-bit size
        while clx_data.get(offset) == Some(&0x01) {
            let size = read_u16_le(clx_data, offset + 1).ok()? as usize;
            offset = offset.checked_add(3 + size)?;
        }

        // Pcdt marker
        if clx_data.get(offset) != Some(&0x02) {
            return None;
        }
        let lcb = read_u32_le(clx_data, offset + 1).ok()? as usize;
        offset += 5;
        let plc_pcd = clx_data.get(offset..offset.checked_add(lcb)?)?;

        // PlcPcd: n+1 CPs followed by n 8-byte Pcds
        if plc_pcd.len() < 4 {
            return None;
        }
        let count = (plc_pcd.len() - 4) / (4 + PCD_SIZE);
        let descriptors_start = (count + 1) * 4;

        let mut pieces = Vec::with_capacity(count);
        for i in 0..count {
            let cp_start = read_u32_le(plc_pcd, i * 4).ok()?;
            let cp_end = read_u32_le(plc_pcd, (i + 1) * 4).ok()?;
            if cp_end < cp_start {
                return None;
            }

            // Bytes 0-1: flags, bytes 2-5: fc, bytes 6-7: prm
            let fc_raw = read_u32_le(plc_pcd, descriptors_start + i * PCD_SIZE + 2).ok()?;
            let is_unicode = fc_raw & FC_COMPRESSED == 0;
            let fc = if is_unicode {
                fc_raw & 0x3FFF_FFFF
            } else {
                (fc_raw & 0x3FFF_FFFF) / 2
            };

            pieces.push(TextPiece {
                cp_start,
                cp_end,
                fc,
                is_unicode,
            });
        }

        pieces.sort_by_key(|p| p.cp_start);
        Some(Self { pieces })
    }

    /// Get all text pieces.
    #[inline]
    pub fn pieces(&self) -> &[TextPiece] {
        &self.pieces
    }

    /// Collect the characters in `[0, cp_limit)` from `word_document`.
    ///
    /// Returns `None` if a piece points outside the stream.
    pub fn text(&self, word_document: &[u8], cp_limit: u32) -> Option<String> {
        let mut text = String::new();

        for piece in &self.pieces {
            if piece.cp_start >= cp_limit {
                break;
            }
            let chars = (piece.cp_end.min(cp_limit) - piece.cp_start) as usize;
            let start = piece.fc as usize;

            if piece.is_unicode {
                let bytes = word_document.get(start..start.checked_add(chars * 2)?)?;
                text.push_str(&decode_utf16(bytes, false, false).ok()?);
            } else {
                let bytes = word_document.get(start..start.checked_add(chars)?)?;
                text.push_str(&decode_codepage(bytes, 1252)?);
            }
        }

        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clx(pieces: &[(u32, u32, u32)]) -> Vec<u8> {
        let mut plc = Vec::new();
        for (cp, _, _) in pieces {
            plc.extend_from_slice(&cp.to_le_bytes());
        }
        let last = pieces.last().map(|p| p.1).unwrap_or(0);
        plc.extend_from_slice(&last.to_le_bytes());
        for (_, _, fc) in pieces {
            plc.extend_from_slice(&0u16.to_le_bytes());
            plc.extend_from_slice(&fc.to_le_bytes());
            plc.extend_from_slice(&0u16.to_le_bytes());
        }

        // A property modifier entry ahead of the Pcdt
        let mut data = vec![0x01, 0x02, 0x00, 0xAA, 0xBB, 0x02];
        data.extend_from_slice(&(plc.len() as u32).to_le_bytes());
        data.extend_from_slice(&plc);
        data
    }

    #[test]
    fn test_parse_mixed_pieces() {
        let data = clx(&[(0, 5, (0x10 * 2) | FC_COMPRESSED), (5, 8, 0x40)]);
        let table = PieceTable::parse(&data).unwrap();

        assert_eq!(
            table.pieces(),
            &[
                TextPiece {
                    cp_start: 0,
                    cp_end: 5,
                    fc: 0x10,
                    is_unicode: false
                },
                TextPiece {
                    cp_start: 5,
                    cp_end: 8,
                    fc: 0x40,
                    is_unicode: true
                },
            ]
        );

        let mut stream = vec![0u8; 0x50];
        stream[0x10..0x15].copy_from_slice(b"Caf\xE9 ");
        for (i, unit) in "end".encode_utf16().enumerate() {
            stream[0x40 + i * 2..0x42 + i * 2].copy_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(table.text(&stream, 8).unwrap(), "Café end");
        assert_eq!(table.text(&stream, 3).unwrap(), "Caf");
    }

    #[test]
    fn test_piece_outside_stream() {
        let data = clx(&[(0, 100, 0x1000 | FC_COMPRESSED)]);
        let table = PieceTable::parse(&data).unwrap();
        assert_eq!(table.text(&[0u8; 64], 100), None);
    }

    #[test]
    fn test_invalid_clx() {
        assert!(PieceTable::parse(&[]).is_none());
        assert!(PieceTable::parse(&[0x03, 0, 0, 0, 0]).is_none());
        assert!(PieceTable::parse(&[0x02, 0xFF, 0, 0, 0]).is_none());
        assert!(PieceTable::parse(&[0x01, 0xFF, 0xFF]).is_none());
    }
}
