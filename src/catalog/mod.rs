//! Indexed font catalog (component D)
//!
//! Ingests parsed font files into a shared string arena using a small
//! tagged-record grammar (`\tt:<fmt>`, `\tv:<version>`, `\t!!` for a failed
//! parse, empty string as the per-file sentinel), then builds a sorted
//! index for fast per-family candidate lookup. Either built fresh from a
//! directory walk (mutable, owned arena) or mapped read-only from a
//! previously dumped cache file.

mod cache;
mod index;
mod version;

use std::path::Path;

use memmap2::Mmap;

use crate::arena::{u16_eq_ignore_ascii_case, Arena, Offset};
use crate::error::{Error, Result};
use crate::font::{self, Format, NameRecord, NameVisitor, NAME_ID_VERSION};

pub use index::Entry;

const LANG_ENGLISH_US: u16 = 0x0409;

#[derive(Debug, Clone, Copy, Default)]
pub struct Stat {
    pub num_file: u32,
    pub num_face: u32,
}

/// One candidate font file for a requested family name.
pub struct Candidate {
    pub tag: String,
    pub face: String,
    pub format: Format,
    pub version: Option<String>,
}

pub struct Catalog {
    arena: Arena,
    stat: Stat,
    index: Vec<Entry>,
    /// Kept alive only when the catalog backs onto a mapped cache file.
    _mapping: Option<Mmap>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            arena: Arena::new(0),
            stat: Stat::default(),
            index: Vec::new(),
            _mapping: None,
        }
    }

    pub fn stat(&self) -> Stat {
        self.stat
    }

    pub fn is_read_only(&self) -> bool {
        self.arena.is_read_only()
    }

    /// Ingest one font file's parsed records under `tag` (its path relative
    /// to the font root). On a recognized but corrupted file, partial
    /// results are kept (with an error sentinel) and `num_file`/`num_face`
    /// still advance; the error is still returned so the caller can log it.
    /// On an unrecognized file, nothing is written and the error is
    /// returned. `Error::OutOfMemory` aborts without being recorded at all
    /// — the caller should treat it as fatal to the whole scan.
    pub fn add_font(&mut self, tag: &str, bytes: &[u8]) -> Result<()> {
        let start_pos = self.arena.tell();
        self.arena.push(tag)?;

        let format = match Format::detect(bytes) {
            Some(f) => f,
            None => {
                self.arena.seek(start_pos);
                return Err(Error::Unrecognized("font file has no recognized container magic".into()));
            }
        };
        self.arena.push_prefix(&ascii_units("\tt:"));
        self.arena.push(format_tag(format))?;

        let mut ingestor = Ingestor::new(&mut self.arena);
        let parse_err = font::parse(bytes, &mut ingestor).err();
        let face_count = ingestor.face_count;
        let ingest_err = ingestor.result.err();

        if let Some(Error::OutOfMemory) = ingest_err {
            return Err(Error::OutOfMemory);
        }

        match parse_err.or(ingest_err) {
            None => {
                self.arena.push("")?;
                self.stat.num_file += 1;
                self.stat.num_face += face_count;
                Ok(())
            }
            Some(err) => {
                if face_count == 0 {
                    self.arena.seek(start_pos);
                    Err(err)
                } else {
                    self.arena.push("\t!!")?;
                    self.arena.push("")?;
                    self.stat.num_file += 1;
                    self.stat.num_face += face_count;
                    Err(err)
                }
            }
        }
    }

    /// Rebuild the sorted index from the arena's current content. Safe to
    /// call more than once (e.g. after more `add_font` calls), though
    /// repeated calls redo the full walk.
    pub fn build_index(&mut self) -> Result<()> {
        self.index = index::build(&self.arena, self.stat.num_face)?;
        Ok(())
    }

    /// Candidates for `face`, highest-preference format/version first, all
    /// sharing that top-ranked `(format, version)` pair. Empty if `face`
    /// isn't present in the index.
    pub fn iter(&self, face: &str) -> impl Iterator<Item = Candidate> + '_ {
        let range = index::lookup_range(&self.arena, &self.index, face);
        self.index[range].iter().map(move |e| Candidate {
            tag: self.arena.get(e.tag_offset),
            face: self.arena.get(e.face_offset),
            format: e.format,
            version: e.version.clone(),
        })
    }

    pub fn dump(&self, path: &Path) -> Result<()> {
        cache::dump(path, &self.arena, self.stat.num_file, self.stat.num_face)
    }

    /// Load a cache file, mapping it read-only and rebuilding the index
    /// over the mapped payload.
    pub fn load(path: &Path) -> Result<Catalog> {
        let (mapping, header, arena) = cache::load(path)?;
        let mut catalog = Catalog {
            arena,
            stat: Stat {
                num_file: header.num_file,
                num_face: header.num_face,
            },
            index: Vec::new(),
            _mapping: Some(mapping),
        };
        catalog.build_index()?;
        Ok(catalog)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

fn format_tag(format: Format) -> &'static str {
    match format {
        Format::Otf => "OTF",
        Format::Ttf => "TTF",
        Format::Ttc => "TTC",
    }
}

fn ascii_units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Translates OTF/TTC name records into the catalog's tagged arena records
/// for one font file, tracking per-sub-font anchors for version-upgrade
/// and face-dedup logic.
struct Ingestor<'a> {
    arena: &'a mut Arena,
    current_font_index: Option<u32>,
    face_positions: Vec<Offset>,
    version_pos: Option<Offset>,
    version_is_english: bool,
    face_count: u32,
    result: Result<()>,
}

impl<'a> Ingestor<'a> {
    fn new(arena: &'a mut Arena) -> Self {
        Ingestor {
            arena,
            current_font_index: None,
            face_positions: Vec::new(),
            version_pos: None,
            version_is_english: false,
            face_count: 0,
            result: Ok(()),
        }
    }

    fn enter_font_index(&mut self, font_index: u32) {
        if self.current_font_index != Some(font_index) {
            self.current_font_index = Some(font_index);
            self.face_positions.clear();
            self.version_pos = None;
            self.version_is_english = false;
        }
    }

    fn write_version(&mut self, units: &[u16]) -> Result<Offset> {
        let pos = self.arena.tell();
        self.arena.push_prefix(&ascii_units("\tv:"));
        self.arena.push_u16(units)?;
        Ok(pos)
    }

    fn handle_version(&mut self, record: &NameRecord<'_>) {
        if self.result.is_err() {
            return;
        }
        let units = font::utf16be_to_le_units(record.value);
        let is_english = record.language_id == LANG_ENGLISH_US;
        match self.version_pos {
            None => match self.write_version(&units) {
                Ok(pos) => {
                    self.version_pos = Some(pos);
                    self.version_is_english = is_english;
                }
                Err(e) => self.result = Err(e),
            },
            Some(prev) => {
                if is_english && !self.version_is_english {
                    self.arena.seek(prev);
                    match self.write_version(&units) {
                        Ok(pos) => {
                            self.version_pos = Some(pos);
                            self.version_is_english = true;
                        }
                        Err(e) => self.result = Err(e),
                    }
                }
            }
        }
    }

    fn handle_face(&mut self, record: &NameRecord<'_>) {
        if self.result.is_err() {
            return;
        }
        let units = font::utf16be_to_le_units(record.value);
        let is_duplicate = self
            .face_positions
            .iter()
            .any(|&pos| u16_eq_ignore_ascii_case(self.arena.get_u16(pos), &units));
        if is_duplicate {
            return;
        }
        let pos = self.arena.tell();
        if let Err(e) = self.arena.push_u16(&units) {
            self.result = Err(e);
            return;
        }
        self.face_positions.push(pos);
        self.face_count += 1;
    }
}

impl NameVisitor for Ingestor<'_> {
    fn visit(&mut self, font_index: u32, record: &NameRecord<'_>) {
        self.enter_font_index(font_index);
        if record.name_id == NAME_ID_VERSION {
            self.handle_version(record);
        } else {
            self.handle_face(record);
        }
    }
}
