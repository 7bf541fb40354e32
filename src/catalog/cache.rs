//! Binary cache file format: a small header over the catalog arena's raw
//! bytes, so a previously-scanned font root can be reloaded without
//! re-walking or re-parsing every font file.
//!
//! ```text
//! magic:   u32 little-endian, ASCII 'f','l','d','d'
//! stat:    { num_file: u32, num_face: u32 }
//! size:    u32, total on-disk length in bytes
//! payload: raw arena bytes (UTF-16LE), verbatim
//! ```

use std::fs;
use std::path::Path;

use memmap2::Mmap;

use crate::arena::Arena;
use crate::error::{Error, Result};

const MAGIC: u32 = u32::from_le_bytes(*b"fldd");
const HEADER_LEN: usize = 16;

#[derive(Debug)]
pub struct Header {
    pub num_file: u32,
    pub num_face: u32,
}

/// Write `arena`'s content plus a header to `path`.
pub fn dump(path: &Path, arena: &Arena, num_file: u32, num_face: u32) -> Result<()> {
    let payload = arena.as_bytes();
    let size = (HEADER_LEN + payload.len()) as u32;

    let mut out = Vec::with_capacity(size as usize);
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&num_file.to_le_bytes());
    out.extend_from_slice(&num_face.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&payload);

    fs::write(path, out).map_err(Error::Io)
}

/// Memory-map `path` and validate its header. Returns the mapping (kept
/// alive by the caller, typically for the lifetime of the catalog), the
/// stat header, and a read-only [`Arena`] adopting the payload.
pub fn load(path: &Path) -> Result<(Mmap, Header, Arena)> {
    let file = fs::File::open(path).map_err(Error::Io)?;
    let map = unsafe { Mmap::map(&file) }.map_err(Error::Io)?;

    if map.len() < HEADER_LEN {
        return Err(Error::Unrecognized("cache file shorter than its header".into()));
    }
    let magic = u32::from_le_bytes(map[0..4].try_into().unwrap());
    if magic != MAGIC {
        return Err(Error::Unrecognized("bad cache magic".into()));
    }
    let num_file = u32::from_le_bytes(map[4..8].try_into().unwrap());
    let num_face = u32::from_le_bytes(map[8..12].try_into().unwrap());
    let size = u32::from_le_bytes(map[12..16].try_into().unwrap());

    if size as usize != map.len() || size < 8 {
        return Err(Error::Unrecognized("cache size field does not match file length".into()));
    }

    let payload = &map[HEADER_LEN..];
    if payload.len() % 2 != 0 {
        return Err(Error::Corrupted("cache payload is not u16-aligned".into()));
    }
    if payload.is_empty() || payload[payload.len() - 2..] != [0, 0] {
        return Err(Error::Corrupted("cache payload missing trailing NUL".into()));
    }

    let arena = Arena::load_readonly(payload, 0);
    Ok((map, Header { num_file, num_face }, arena))
}
