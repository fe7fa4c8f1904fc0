//! Signature constants and helpers for format sniffing.

/// Number of leading bytes the sniffer is allowed to look at.
pub const SNIFF_WINDOW: usize = 1024;

/// Buffers shorter than this are never classified.
pub const MIN_SNIFF_LEN: usize = 4;

// Magic number signatures
pub const OLE2_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
pub const ZIP_SIGNATURE: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
/// End-of-central-directory record, the only record in an empty archive
pub const ZIP_EMPTY_SIGNATURE: &[u8] = &[0x50, 0x4B, 0x05, 0x06];
pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// The bounded prefix of `bytes` that sniffing may inspect.
#[inline]
pub fn sniff_window(bytes: &[u8]) -> &[u8] {
    &bytes[..bytes.len().min(SNIFF_WINDOW)]
}

/// Whether `bytes` starts with `signature`.
#[inline]
pub fn has_signature(bytes: &[u8], signature: &[u8]) -> bool {
    bytes.len() >= signature.len() && &bytes[..signature.len()] == signature
}
