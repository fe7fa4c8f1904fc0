//! Character encoding utilities.
//!
//! Codepage lookups for legacy formats (RTF `\ansicpg` and `\fcharset`,
//! compressed Word pieces, plain text fallbacks) and the Unicode decoders used
//! for byte-order-marked text.

use encoding_rs::Encoding;

/// Map Windows codepage identifier to encoding_rs Encoding.
///
/// # Arguments
/// * `codepage` - Windows codepage number (e.g., 936 for Simplified Chinese, 1252 for Western European)
///
/// # Returns
/// Returns `Some(&'static Encoding)` if the codepage is supported, `None` otherwise.
///
/// # Examples
/// ```
/// use textractor::common::encoding::codepage_to_encoding;
///
/// let encoding = codepage_to_encoding(936).unwrap();
/// assert_eq!(encoding.name(), "GBK");
/// assert!(codepage_to_encoding(12345).is_none());
/// ```
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        // DOS codepages
        866 => Some(encoding_rs::IBM866),

        // Windows codepages (Western scripts)
        874 => Some(encoding_rs::WINDOWS_874),   // Thai
        1250 => Some(encoding_rs::WINDOWS_1250), // Central European
        1251 => Some(encoding_rs::WINDOWS_1251), // Cyrillic
        1252 => Some(encoding_rs::WINDOWS_1252), // Western European (most common, default ANSI)
        1253 => Some(encoding_rs::WINDOWS_1253), // Greek
        1254 => Some(encoding_rs::WINDOWS_1254), // Turkish
        1255 => Some(encoding_rs::WINDOWS_1255), // Hebrew
        1256 => Some(encoding_rs::WINDOWS_1256), // Arabic
        1257 => Some(encoding_rs::WINDOWS_1257), // Baltic
        1258 => Some(encoding_rs::WINDOWS_1258), // Vietnamese

        // East Asian codepages
        932 => Some(encoding_rs::SHIFT_JIS), // Japanese Shift-JIS
        936 => Some(encoding_rs::GBK),       // Simplified Chinese (GB2312/GBK)
        949 => Some(encoding_rs::EUC_KR),    // Korean
        950 => Some(encoding_rs::BIG5),      // Traditional Chinese (Big5)
        20932 => Some(encoding_rs::EUC_JP),  // Japanese EUC-JP
        20936 => Some(encoding_rs::GBK),     // GB2312
        54936 => Some(encoding_rs::GB18030), // Chinese GB18030 (superset of GBK)

        // ISO 8859 series
        28591 => Some(encoding_rs::WINDOWS_1252), // ISO-8859-1 approximation
        28592 => Some(encoding_rs::ISO_8859_2),
        28595 => Some(encoding_rs::ISO_8859_5),
        28597 => Some(encoding_rs::ISO_8859_7),
        28605 => Some(encoding_rs::ISO_8859_15),

        // KOI8 series
        20866 => Some(encoding_rs::KOI8_R),
        21866 => Some(encoding_rs::KOI8_U),

        // Macintosh
        10000 => Some(encoding_rs::MACINTOSH),

        // Unicode
        1200 => Some(encoding_rs::UTF_16LE),
        1201 => Some(encoding_rs::UTF_16BE),
        65001 => Some(encoding_rs::UTF_8),

        _ => None,
    }
}

/// Upper half (0x80..=0xFF) of DOS codepage 437 (US).
static CP437_HIGH: [char; 128] = [
    '\u{00C7}', '\u{00FC}', '\u{00E9}', '\u{00E2}', '\u{00E4}', '\u{00E0}', '\u{00E5}', '\u{00E7}',
    '\u{00EA}', '\u{00EB}', '\u{00E8}', '\u{00EF}', '\u{00EE}', '\u{00EC}', '\u{00C4}', '\u{00C5}',
    '\u{00C9}', '\u{00E6}', '\u{00C6}', '\u{00F4}', '\u{00F6}', '\u{00F2}', '\u{00FB}', '\u{00F9}',
    '\u{00FF}', '\u{00D6}', '\u{00DC}', '\u{00A2}', '\u{00A3}', '\u{00A5}', '\u{20A7}', '\u{0192}',
    '\u{00E1}', '\u{00ED}', '\u{00F3}', '\u{00FA}', '\u{00F1}', '\u{00D1}', '\u{00AA}', '\u{00BA}',
    '\u{00BF}', '\u{2310}', '\u{00AC}', '\u{00BD}', '\u{00BC}', '\u{00A1}', '\u{00AB}', '\u{00BB}',
    '\u{2591}', '\u{2592}', '\u{2593}', '\u{2502}', '\u{2524}', '\u{2561}', '\u{2562}', '\u{2556}',
    '\u{2555}', '\u{2563}', '\u{2551}', '\u{2557}', '\u{255D}', '\u{255C}', '\u{255B}', '\u{2510}',
    '\u{2514}', '\u{2534}', '\u{252C}', '\u{251C}', '\u{2500}', '\u{253C}', '\u{255E}', '\u{255F}',
    '\u{255A}', '\u{2554}', '\u{2569}', '\u{2566}', '\u{2560}', '\u{2550}', '\u{256C}', '\u{2567}',
    '\u{2568}', '\u{2564}', '\u{2565}', '\u{2559}', '\u{2558}', '\u{2552}', '\u{2553}', '\u{256B}',
    '\u{256A}', '\u{2518}', '\u{250C}', '\u{2588}', '\u{2584}', '\u{258C}', '\u{2590}', '\u{2580}',
    '\u{03B1}', '\u{00DF}', '\u{0393}', '\u{03C0}', '\u{03A3}', '\u{03C3}', '\u{00B5}', '\u{03C4}',
    '\u{03A6}', '\u{0398}', '\u{03A9}', '\u{03B4}', '\u{221E}', '\u{03C6}', '\u{03B5}', '\u{2229}',
    '\u{2261}', '\u{00B1}', '\u{2265}', '\u{2264}', '\u{2320}', '\u{2321}', '\u{00F7}', '\u{2248}',
    '\u{00B0}', '\u{2219}', '\u{00B7}', '\u{221A}', '\u{207F}', '\u{00B2}', '\u{25A0}', '\u{00A0}',
];

/// Upper half (0x80..=0xFF) of DOS codepage 850 (Western European).
static CP850_HIGH: [char; 128] = [
    '\u{00C7}', '\u{00FC}', '\u{00E9}', '\u{00E2}', '\u{00E4}', '\u{00E0}', '\u{00E5}', '\u{00E7}',
    '\u{00EA}', '\u{00EB}', '\u{00E8}', '\u{00EF}', '\u{00EE}', '\u{00EC}', '\u{00C4}', '\u{00C5}',
    '\u{00C9}', '\u{00E6}', '\u{00C6}', '\u{00F4}', '\u{00F6}', '\u{00F2}', '\u{00FB}', '\u{00F9}',
    '\u{00FF}', '\u{00D6}', '\u{00DC}', '\u{00F8}', '\u{00A3}', '\u{00D8}', '\u{00D7}', '\u{0192}',
    '\u{00E1}', '\u{00ED}', '\u{00F3}', '\u{00FA}', '\u{00F1}', '\u{00D1}', '\u{00AA}', '\u{00BA}',
    '\u{00BF}', '\u{00AE}', '\u{00AC}', '\u{00BD}', '\u{00BC}', '\u{00A1}', '\u{00AB}', '\u{00BB}',
    '\u{2591}', '\u{2592}', '\u{2593}', '\u{2502}', '\u{2524}', '\u{00C1}', '\u{00C2}', '\u{00C0}',
    '\u{00A9}', '\u{2563}', '\u{2551}', '\u{2557}', '\u{255D}', '\u{00A2}', '\u{00A5}', '\u{2510}',
    '\u{2514}', '\u{2534}', '\u{252C}', '\u{251C}', '\u{2500}', '\u{253C}', '\u{00E3}', '\u{00C3}',
    '\u{255A}', '\u{2554}', '\u{2569}', '\u{2566}', '\u{2560}', '\u{2550}', '\u{256C}', '\u{00A4}',
    '\u{00F0}', '\u{00D0}', '\u{00CA}', '\u{00CB}', '\u{00C8}', '\u{0131}', '\u{00CD}', '\u{00CE}',
    '\u{00CF}', '\u{2518}', '\u{250C}', '\u{2588}', '\u{2584}', '\u{00A6}', '\u{00CC}', '\u{2580}',
    '\u{00D3}', '\u{00DF}', '\u{00D4}', '\u{00D2}', '\u{00F5}', '\u{00D5}', '\u{00B5}', '\u{00FE}',
    '\u{00DE}', '\u{00DA}', '\u{00DB}', '\u{00D9}', '\u{00FD}', '\u{00DD}', '\u{00AF}', '\u{00B4}',
    '\u{00AD}', '\u{00B1}', '\u{2017}', '\u{00BE}', '\u{00B6}', '\u{00A7}', '\u{00F7}', '\u{00B8}',
    '\u{00B0}', '\u{00A8}', '\u{00B7}', '\u{00B9}', '\u{00B3}', '\u{00B2}', '\u{25A0}', '\u{00A0}',
];

/// Lookup table for the DOS codepages encoding_rs does not provide.
#[inline]
fn oem_table(codepage: u32) -> Option<&'static [char; 128]> {
    match codepage {
        437 => Some(&CP437_HIGH),
        850 => Some(&CP850_HIGH),
        _ => None,
    }
}

/// Whether [`decode_codepage`] can decode `codepage`.
#[inline]
pub fn is_supported_codepage(codepage: u32) -> bool {
    oem_table(codepage).is_some() || codepage_to_encoding(codepage).is_some()
}

/// Map an RTF/Windows font charset (`\fcharsetN`) to a codepage.
///
/// Returns `None` for charsets that do not select a codepage of their own
/// (`DEFAULT_CHARSET`, `SYMBOL_CHARSET`), so the document codepage applies.
#[inline]
pub fn charset_to_codepage(charset: i32) -> Option<u32> {
    match charset {
        0 => Some(1252),   // ANSI
        77 => Some(10000), // Mac Roman
        128 => Some(932),  // Shift-JIS
        129 => Some(949),  // Hangul
        134 => Some(936),  // GB2312
        136 => Some(950),  // Big5
        161 => Some(1253), // Greek
        162 => Some(1254), // Turkish
        163 => Some(1258), // Vietnamese
        177 => Some(1255), // Hebrew
        178 => Some(1256), // Arabic
        186 => Some(1257), // Baltic
        204 => Some(1251), // Russian
        222 => Some(874),  // Thai
        238 => Some(1250), // Eastern European
        254 => Some(437),  // PC 437
        255 => Some(850),  // OEM
        _ => None,
    }
}

/// Decode bytes with a Windows codepage, replacing undecodable sequences.
///
/// Returns `None` if the codepage is not supported.
///
/// # Examples
///
/// ```
/// use textractor::common::encoding::decode_codepage;
///
/// assert_eq!(decode_codepage(b"caf\xE9", 1252).as_deref(), Some("café"));
/// assert_eq!(decode_codepage(b"caf\x82", 437).as_deref(), Some("café"));
/// assert_eq!(decode_codepage(b"abc", 99999), None);
/// ```
#[inline]
pub fn decode_codepage(bytes: &[u8], codepage: u32) -> Option<String> {
    if let Some(table) = oem_table(codepage) {
        let text: String = bytes
            .iter()
            .map(|&b| match b {
                0x00..=0x7F => char::from(b),
                _ => table[usize::from(b - 0x80)],
            })
            .collect();
        return Some(text);
    }

    let encoding = codepage_to_encoding(codepage)?;
    Some(encoding.decode_without_bom_handling(bytes).0.into_owned())
}

/// Decode UTF-16 bytes (without BOM).
///
/// In strict mode unpaired surrogates and a dangling odd byte are reported as
/// `Err` with a description; otherwise they become U+FFFD.
pub fn decode_utf16(bytes: &[u8], big_endian: bool, strict: bool) -> Result<String, String> {
    let encoding = if big_endian {
        encoding_rs::UTF_16BE
    } else {
        encoding_rs::UTF_16LE
    };
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if strict && had_errors {
        return Err(format!("invalid {} sequence", encoding.name()));
    }
    Ok(text.into_owned())
}

/// Decode UTF-32 bytes (without BOM).
///
/// encoding_rs has no UTF-32 decoder, so code units are converted directly.
pub fn decode_utf32(bytes: &[u8], big_endian: bool, strict: bool) -> Result<String, String> {
    let mut text = String::with_capacity(bytes.len() / 4);
    let chunks = bytes.chunks_exact(4);
    let dangling = !chunks.remainder().is_empty();

    for chunk in chunks {
        let unit = [chunk[0], chunk[1], chunk[2], chunk[3]];
        let value = if big_endian {
            u32::from_be_bytes(unit)
        } else {
            u32::from_le_bytes(unit)
        };
        match char::from_u32(value) {
            Some(ch) => text.push(ch),
            None if strict => return Err(format!("invalid UTF-32 code unit {value:#x}")),
            None => text.push(char::REPLACEMENT_CHARACTER),
        }
    }

    if dangling {
        if strict {
            return Err("truncated UTF-32 code unit".to_string());
        }
        text.push(char::REPLACEMENT_CHARACTER);
    }

    Ok(text)
}
