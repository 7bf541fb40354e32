//! OTF/TTC container parser (component C)
//!
//! Reads just enough of a font file's table directory and `name` table to
//! hand every interesting name record to a caller-supplied visitor. Never
//! allocates the font itself (callers pass a memory-mapped view); never
//! trusts a length or offset found inside the file without bounds-checking
//! it against the buffer first.

mod cursor;

use cursor::Cursor;

use crate::error::{Error, Result};

const TAG_TTCF: [u8; 4] = *b"ttcf";
const TAG_OTTO: [u8; 4] = *b"OTTO";
const TAG_NAME: [u8; 4] = *b"name";
const TAG_TRUE_00010000: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

const PLATFORM_WINDOWS: u16 = 3;

/// Name ID for the font's version string, always emitted first.
pub const NAME_ID_VERSION: u16 = 5;
/// Name IDs callers care about, besides the version string.
const INTERESTING_NAME_IDS: [u16; 3] = [1, 4, 16];

/// One `name` table record, header fields decoded, payload left as raw
/// UTF-16BE bytes for the caller to convert (avoids allocating a `String`
/// for records the caller may discard, e.g. non-English versions).
#[derive(Clone, Copy)]
pub struct NameRecord<'a> {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    /// Raw UTF-16BE string payload.
    pub value: &'a [u8],
}

/// Receives name records as they're found. `font_index` is 0 for a bare
/// OTF/TTF, or the sub-font index within a TTC.
pub trait NameVisitor {
    fn visit(&mut self, font_index: u32, record: &NameRecord<'_>);
}

/// Detect a font container's format from its leading bytes, without fully
/// parsing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Otf,
    Ttf,
    Ttc,
}

impl Format {
    pub fn detect(bytes: &[u8]) -> Option<Format> {
        if bytes.len() < 4 {
            return None;
        }
        match [bytes[0], bytes[1], bytes[2], bytes[3]] {
            TAG_TTCF => Some(Format::Ttc),
            TAG_OTTO => Some(Format::Otf),
            TAG_TRUE_00010000 => Some(Format::Ttf),
            _ => None,
        }
    }
}

/// Parse `bytes` as an OTF, TTF, or TTC container, invoking `visitor` for
/// every interesting name record of every sub-font. Returns
/// [`Error::Unrecognized`] if the leading bytes don't match any known
/// magic, or [`Error::Corrupted`] if a table directory entry, the `name`
/// table header, or any name record points outside the buffer.
pub fn parse(bytes: &[u8], visitor: &mut dyn NameVisitor) -> Result<()> {
    match Format::detect(bytes) {
        Some(Format::Ttc) => parse_ttc(bytes, visitor),
        Some(Format::Otf) | Some(Format::Ttf) => {
            parse_sfnt(bytes, 0, 0, visitor)?;
            Ok(())
        }
        None => Err(Error::Unrecognized("not an OTF, TTF, or TTC file".into())),
    }
}

fn parse_ttc(bytes: &[u8], visitor: &mut dyn NameVisitor) -> Result<()> {
    let mut cur = Cursor::new(bytes);
    let tag = cur.tag()?;
    if tag != TAG_TTCF {
        return Err(Error::Unrecognized("missing ttcf magic".into()));
    }
    cur.seek(8)?; // skip major/minor version
    let num_fonts = cur.u32()?;

    let mut offsets = Vec::with_capacity(num_fonts as usize);
    for _ in 0..num_fonts {
        offsets.push(cur.u32()? as usize);
    }
    for (index, offset) in offsets.into_iter().enumerate() {
        if offset >= bytes.len() {
            return Err(Error::Corrupted("TTC sub-font offset out of range".into()));
        }
        parse_sfnt(bytes, offset, index as u32, visitor)?;
    }
    Ok(())
}

/// Parse one `sfnt`-structured font (the shared OTF/TTF table-directory
/// layout) starting at `base`, reporting its records under `font_index`.
fn parse_sfnt(bytes: &[u8], base: usize, font_index: u32, visitor: &mut dyn NameVisitor) -> Result<()> {
    let mut cur = Cursor::at(bytes, base);
    let tag = cur.tag()?;
    if tag != TAG_OTTO && tag != TAG_TRUE_00010000 {
        return Err(Error::Unrecognized("unrecognized sfnt version tag".into()));
    }
    let num_tables = cur.u16()?;
    cur.seek(base + 12)?; // skip searchRange/entrySelector/rangeShift

    let mut name_table: Option<(usize, usize)> = None;
    for _ in 0..num_tables {
        let rec_tag = cur.tag()?;
        let _checksum = cur.u32()?;
        let offset = cur.u32()? as usize;
        let length = cur.u32()? as usize;
        if rec_tag == TAG_NAME {
            name_table = Some((offset, length));
        }
    }

    let (offset, length) = match name_table {
        Some(t) => t,
        None => return Ok(()), // no name table: nothing to report, not corrupted
    };
    let table = cur.slice_at(offset, length)?;
    parse_name_table(table, font_index, visitor)
}

fn parse_name_table(table: &[u8], font_index: u32, visitor: &mut dyn NameVisitor) -> Result<()> {
    let mut cur = Cursor::new(table);
    let format = cur.u16()?;
    if format != 0 {
        return Err(Error::Unrecognized(format!("unsupported name table format {format}")));
    }
    let count = cur.u16()?;
    let string_offset = cur.u16()? as usize;

    struct Raw {
        platform_id: u16,
        encoding_id: u16,
        language_id: u16,
        name_id: u16,
        offset: usize,
        length: usize,
    }

    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let platform_id = cur.u16()?;
        let encoding_id = cur.u16()?;
        let language_id = cur.u16()?;
        let name_id = cur.u16()?;
        let length = cur.u16()? as usize;
        let offset = cur.u16()? as usize;
        records.push(Raw {
            platform_id,
            encoding_id,
            language_id,
            name_id,
            offset,
            length,
        });
    }

    // Validate every record's payload range up front, so a truncated file
    // is rejected before any callback fires (matches the original parser's
    // all-or-nothing bounds check).
    for r in &records {
        cur.slice_at(string_offset + r.offset, r.length)?;
    }

    let is_windows = |r: &Raw| r.platform_id == PLATFORM_WINDOWS;

    // Pass 1: version strings first.
    for r in records.iter().filter(|r| is_windows(r) && r.name_id == NAME_ID_VERSION) {
        let value = cur.slice_at(string_offset + r.offset, r.length)?;
        visitor.visit(
            font_index,
            &NameRecord {
                platform_id: r.platform_id,
                encoding_id: r.encoding_id,
                language_id: r.language_id,
                name_id: r.name_id,
                value,
            },
        );
    }

    // Pass 2: the interesting set (family / full / typographic family).
    for r in records
        .iter()
        .filter(|r| is_windows(r) && INTERESTING_NAME_IDS.contains(&r.name_id))
    {
        let value = cur.slice_at(string_offset + r.offset, r.length)?;
        visitor.visit(
            font_index,
            &NameRecord {
                platform_id: r.platform_id,
                encoding_id: r.encoding_id,
                language_id: r.language_id,
                name_id: r.name_id,
                value,
            },
        );
    }

    Ok(())
}

/// Convert a raw UTF-16BE name-record payload to UTF-16LE code units,
/// preserving unpaired surrogates rather than lossily replacing them (font
/// name strings are treated as opaque code-unit sequences, not validated
/// text).
pub fn utf16be_to_le_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|c| {
            if c.len() == 2 {
                u16::from_be_bytes([c[0], c[1]])
            } else {
                c[0] as u16
            }
        })
        .collect()
}
