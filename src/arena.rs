//! Append-only wide-character string arena (component A)
//!
//! The arena stores null-terminated UTF-16 records back to back. Every
//! record handed out by `push` is addressable by a stable `Offset` — a count
//! of `u16` code units from the start of the buffer, matching the original
//! `StrDbTell` convention rather than a byte count. Offsets stay valid until
//! an explicit `seek` rewinds the append cursor past them; only the loader's
//! rewind protocol (catalog ingestion backtracking on duplicates/errors) is
//! expected to do that.

use crate::error::{Error, Result};

/// A stable handle into the arena. Valid until the arena is rewound past it.
pub type Offset = u32;

/// Append-only buffer of UTF-16 code units with a few string-table niceties:
/// null-terminated records, an optional pad unit for pretty-printing, and
/// case-insensitive linear lookup for small dedup windows.
#[derive(Debug)]
pub struct Arena {
    buffer: Vec<u16>,
    /// Extra code unit appended after the NUL terminator of every `push`ed
    /// record (e.g. `\n` so a dumped arena reads like one string per line).
    /// Zero means "no pad".
    pad: u16,
    read_only: bool,
}

impl Arena {
    /// Create an empty, writable arena. `pad` is the extra separator code
    /// unit appended after each record's NUL terminator (0 for none).
    pub fn new(pad: u16) -> Self {
        Arena {
            buffer: Vec::new(),
            pad,
            read_only: false,
        }
    }

    /// Current append cursor, in `u16` units from the start of the buffer.
    pub fn tell(&self) -> Offset {
        self.buffer.len() as Offset
    }

    /// Rewind the append cursor to `offset`, invalidating every offset at or
    /// beyond it. No-op (but checked) if the arena is read-only.
    pub fn seek(&mut self, offset: Offset) {
        assert!(!self.read_only, "cannot seek a read-only arena");
        self.buffer.truncate(offset as usize);
    }

    /// Append `text` plus a NUL terminator plus the configured pad unit.
    /// Returns the offset of the first code unit of `text`.
    pub fn push(&mut self, text: &str) -> Result<Offset> {
        assert!(!self.read_only, "cannot push into a read-only arena");
        let start = self.tell();
        self.buffer.try_reserve(text.len() + 2).map_err(|_| Error::OutOfMemory)?;
        self.buffer.extend(text.encode_utf16());
        self.buffer.push(0);
        if self.pad != 0 {
            self.buffer.push(self.pad);
        }
        Ok(start)
    }

    /// Append `text` as raw UTF-16 code units (already big-endian-decoded by
    /// the caller) with no terminator or pad, so a following `push` glues a
    /// fixed prefix onto its payload (used by the catalog for `\tv:`/`\tt:`
    /// sentinel tags).
    pub fn push_prefix(&mut self, text: &[u16]) {
        assert!(!self.read_only, "cannot push into a read-only arena");
        self.buffer.extend_from_slice(text);
    }

    /// Append `text` plus a NUL terminator plus pad, from raw UTF-16 code
    /// units rather than a `&str` (used when converting from UTF-16BE font
    /// name payloads, which may contain unpaired surrogates `String` can't
    /// hold safely).
    pub fn push_u16(&mut self, text: &[u16]) -> Result<Offset> {
        assert!(!self.read_only, "cannot push into a read-only arena");
        let start = self.tell();
        self.buffer.try_reserve(text.len() + 2).map_err(|_| Error::OutOfMemory)?;
        self.buffer.extend_from_slice(text);
        self.buffer.push(0);
        if self.pad != 0 {
            self.buffer.push(self.pad);
        }
        Ok(start)
    }

    /// Advance past one record (its text + NUL + pad), returning the offset
    /// just beyond it, or `None` if `offset` is already at or past the end.
    pub fn next(&self, offset: Offset) -> Option<Offset> {
        let mut i = offset as usize;
        let len = self.buffer.len();
        if i >= len {
            return None;
        }
        while i < len && self.buffer[i] != 0 {
            i += 1;
        }
        if i < len {
            i += 1; // NUL
        }
        if self.pad != 0 && i < len {
            i += 1; // pad
        }
        Some(i as Offset)
    }

    /// Resolve an offset to the `String` it names (stops at the NUL).
    pub fn get(&self, offset: Offset) -> String {
        let start = offset as usize;
        let end = self.buffer[start..]
            .iter()
            .position(|&c| c == 0)
            .map(|p| start + p)
            .unwrap_or(self.buffer.len());
        String::from_utf16_lossy(&self.buffer[start..end])
    }

    /// Resolve an offset to its raw UTF-16 code units (stops at the NUL).
    pub fn get_u16(&self, offset: Offset) -> &[u16] {
        let start = offset as usize;
        let end = self.buffer[start..]
            .iter()
            .position(|&c| c == 0)
            .map(|p| start + p)
            .unwrap_or(self.buffer.len());
        &self.buffer[start..end]
    }

    /// Linear, case-insensitive scan for a record equal to `text`, starting
    /// at `start` and walking record-by-record to `tell()`. Used for the
    /// small dedup windows inside one sub-font's worth of name records.
    pub fn lookup(&self, start: Offset, text: &str) -> Option<Offset> {
        let mut pos = start;
        let end = self.tell();
        while pos < end {
            let candidate = self.get(pos);
            if candidate.eq_ignore_ascii_case(text) || candidate == text {
                return Some(pos);
            }
            pos = match self.next(pos) {
                Some(p) if p <= end => p,
                _ => break,
            };
        }
        None
    }

    /// Same as [`lookup`](Self::lookup) but comparing raw UTF-16 code units
    /// case-insensitively on the ASCII subset (matching the original
    /// `FlStrCmpIW`/`StrDbIsDuplicate` behavior on font name strings).
    pub fn lookup_u16(&self, start: Offset, text: &[u16]) -> Option<Offset> {
        let mut pos = start;
        let end = self.tell();
        while pos < end {
            if u16_eq_ignore_ascii_case(self.get_u16(pos), text) {
                return Some(pos);
            }
            pos = match self.next(pos) {
                Some(p) if p <= end => p,
                _ => break,
            };
        }
        None
    }

    /// Adopt an externally owned byte range (e.g. a memory-mapped cache
    /// file) as the arena's content. The arena becomes immutable: `push`,
    /// `push_prefix`, and `seek` will panic if called afterward.
    pub fn load_readonly(bytes: &[u8], pad: u16) -> Self {
        assert_eq!(bytes.len() % 2, 0, "arena payload must be u16-aligned");
        let buffer: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Arena {
            buffer,
            pad,
            read_only: true,
        }
    }

    /// Raw content as little-endian bytes, suitable for writing to a cache
    /// file verbatim.
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.buffer.len() * 2);
        for &unit in &self.buffer {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out
    }

    /// Whether this arena is backed by read-only (e.g. mapped) storage.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Raw code units, for callers (like the catalog indexer) that need to
    /// walk the buffer directly.
    pub fn units(&self) -> &[u16] {
        &self.buffer
    }
}

pub(crate) fn u16_eq_ignore_ascii_case(a: &[u16], b: &[u16]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(&x, &y)| {
        if x == y {
            return true;
        }
        let (x, y) = (ascii_lower(x), ascii_lower(y));
        x == y
    })
}

fn ascii_lower(c: u16) -> u16 {
    if (0x41..=0x5A).contains(&c) {
        c + 0x20
    } else {
        c
    }
}
