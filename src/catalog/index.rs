//! Sorted lookup index over a catalog's arena records.

use std::cmp::Ordering;

use crate::arena::{Arena, Offset};
use crate::error::{Error, Result};
use crate::font::Format;

use super::version;

const TAG_VERSION: char = 'v';
const TAG_FORMAT: char = 't';

/// One `(file, format, version, face)` tuple reconstructed from the arena.
#[derive(Clone)]
pub struct Entry {
    pub tag_offset: Offset,
    pub face_offset: Offset,
    pub format: Format,
    pub version: Option<String>,
}

fn record_kind(record: &str) -> RecordKind {
    if record.is_empty() {
        return RecordKind::Sentinel;
    }
    let mut chars = record.chars();
    if chars.next() != Some('\t') {
        return RecordKind::Plain;
    }
    match chars.next() {
        Some(TAG_VERSION) if record.as_bytes().get(2) == Some(&b':') => RecordKind::Version,
        Some(TAG_FORMAT) if record.as_bytes().get(2) == Some(&b':') => RecordKind::FormatTag,
        Some('!') if record.as_bytes().get(2) == Some(&b'!') => RecordKind::Error,
        _ => RecordKind::Plain,
    }
}

enum RecordKind {
    Sentinel,
    Version,
    FormatTag,
    Error,
    Plain,
}

fn parse_format_tag(s: &str) -> Option<Format> {
    match &s[3..] {
        "OTF" => Some(Format::Otf),
        "TTF" => Some(Format::Ttf),
        "TTC" => Some(Format::Ttc),
        _ => None,
    }
}

/// Walk `arena` from 0, reconstructing per-file tag/format/version/face
/// tuples, per the tagged-record grammar `add_font` writes. Resets state on
/// every empty sentinel.
pub fn build(arena: &Arena, expected_faces: u32) -> Result<Vec<Entry>> {
    let mut entries = Vec::with_capacity(expected_faces as usize);
    let mut pos: Offset = 0;
    let end = arena.tell();

    let mut tag_offset: Option<Offset> = None;
    let mut format: Option<Format> = None;
    let mut version_str: Option<String> = None;

    while pos < end {
        let record = arena.get(pos);
        match record_kind(&record) {
            RecordKind::Sentinel => {
                tag_offset = None;
                format = None;
                version_str = None;
            }
            RecordKind::Version => {
                version_str = Some(record[3..].to_string());
            }
            RecordKind::FormatTag => {
                format = parse_format_tag(&record);
            }
            RecordKind::Error => {}
            RecordKind::Plain => {
                if tag_offset.is_none() {
                    tag_offset = Some(pos);
                } else {
                    let tag = tag_offset.unwrap();
                    let fmt = format.ok_or_else(|| {
                        Error::Corrupted("face record with no preceding format tag".into())
                    })?;
                    entries.push(Entry {
                        tag_offset: tag,
                        face_offset: pos,
                        format: fmt,
                        version: version_str.clone(),
                    });
                }
            }
        }
        pos = match arena.next(pos) {
            Some(p) => p,
            None => break,
        };
    }

    if entries.len() as u32 != expected_faces {
        return Err(Error::Corrupted(format!(
            "index rebuilt {} faces, catalog stat says {}",
            entries.len(),
            expected_faces
        )));
    }

    entries.sort_by(|a, b| compare_entries(arena, a, b));
    Ok(entries)
}

fn compare_entries(arena: &Arena, a: &Entry, b: &Entry) -> Ordering {
    let face_a = arena.get(a.face_offset);
    let face_b = arena.get(b.face_offset);
    face_a
        .to_ascii_lowercase()
        .cmp(&face_b.to_ascii_lowercase())
        .then_with(|| format_rank(b.format).cmp(&format_rank(a.format)))
        .then_with(|| version::compare(b.version.as_deref(), a.version.as_deref()))
}

/// Preference order among container formats when a face is tied on name and
/// version (arbitrary but stable: OTF and TTF are single-font containers,
/// preferred over extracting one face from a TTC).
fn format_rank(format: Format) -> u8 {
    match format {
        Format::Otf => 2,
        Format::Ttf => 2,
        Format::Ttc => 1,
    }
}

/// Binary search `entries` (sorted per [`build`]) for the leading run that
/// shares the highest-ranked `(face, format, version)` tuple for `face`
/// (case-insensitively, honoring a caller-supplied `@` strip). Because the
/// index sorts format/version descending within a face, this is exactly
/// the group of "same face, same variant" candidates the loader's
/// per-family iteration should walk — distinct older versions or
/// lower-preference formats of the same face are a separate run and are
/// never reached by this call: any change in face, format, or version
/// ends the iteration.
pub fn lookup_range(arena: &Arena, entries: &[Entry], face: &str) -> std::ops::Range<usize> {
    let face = face.strip_prefix('@').unwrap_or(face);
    let face_lower = face.to_ascii_lowercase();

    let mut found = None;
    let mut lo = 0usize;
    let mut hi = entries.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let candidate = arena.get(entries[mid].face_offset).to_ascii_lowercase();
        match candidate.cmp(&face_lower) {
            Ordering::Equal => {
                found = Some(mid);
                break;
            }
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
        }
    }

    let mid = match found {
        Some(m) => m,
        None => return 0..0,
    };

    let mut start = mid;
    while start > 0 && arena.get(entries[start - 1].face_offset).eq_ignore_ascii_case(face) {
        start -= 1;
    }

    let head = &entries[start];
    let mut stop = start + 1;
    while stop < entries.len() {
        let candidate = &entries[stop];
        let same_face = arena
            .get(candidate.face_offset)
            .eq_ignore_ascii_case(&arena.get(head.face_offset));
        let same_version =
            version::compare(candidate.version.as_deref(), head.version.as_deref()) == Ordering::Equal;
        if !same_face || candidate.format != head.format || !same_version {
            break;
        }
        stop += 1;
    }
    start..stop
}
