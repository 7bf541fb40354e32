//! Subtitle text-encoding detection.
//!
//! BOM first, then a heuristic UTF-8 validity check of the whole buffer,
//! then a legacy 8-bit code-page fallback (the `LegacyDecoder` external
//! collaborator actually performs the last step; this module only decides
//! when it's needed and provides the Windows-1252 table used by the
//! library's default decoder).

use crate::registrar::LegacyDecoder;

/// Decode `bytes` into text, trying (in order) a byte-order mark, then
/// UTF-8 validity, then `fallback`.
pub fn decode(bytes: &[u8], fallback: &dyn LegacyDecoder) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    fallback.decode(bytes)
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| if c.len() == 2 { from_bytes([c[0], c[1]]) } else { from_bytes([c[0], 0]) })
        .collect();
    String::from_utf16_lossy(&units)
}

/// Windows-1252 decode table for bytes 0x80-0x9F (the range where it
/// diverges from Latin-1); everything else maps to its own code point.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
    '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

pub fn decode_windows_1252(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
            _ => b as char,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::Latin1Decoder;

    #[test]
    fn utf8_bom_is_stripped() {
        let bytes = [0xEF, 0xBB, 0xBF, b'h', b'i'];
        assert_eq!(decode(&bytes, &Latin1Decoder), "hi");
    }

    #[test]
    fn utf16le_bom_decodes() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend("hi".encode_utf16().flat_map(|u| u.to_le_bytes()));
        assert_eq!(decode(&bytes, &Latin1Decoder), "hi");
    }

    #[test]
    fn valid_utf8_without_bom_decodes_directly() {
        assert_eq!(decode("héllo".as_bytes(), &Latin1Decoder), "héllo");
    }

    #[test]
    fn invalid_utf8_falls_back_to_legacy_decoder() {
        let bytes = [0x93, b'x', 0x94]; // CP1252 curly quotes around x
        assert_eq!(decode(&bytes, &Latin1Decoder), "\u{201C}x\u{201D}");
    }
}
