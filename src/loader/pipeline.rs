//! The loader orchestrator (component E): owns the family-name set, the
//! font catalog, and the loaded-font vector, and drives the linear
//! scan-subs → scan/load-cache → load-fonts → unload pipeline described
//! by the state machine in [`super::state`].

use std::fs;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::{debug, info, warn};

use crate::blacklist::Blacklist;
use crate::catalog::Catalog;
use crate::config::LoaderConfig;
use crate::discovery;
use crate::encoding;
use crate::error::{Error, Result};
use crate::family::FamilySet;
use crate::hash;
use crate::registrar::{FontRegistrar, LegacyDecoder};

use super::cancel::CancelToken;
use super::report::{Flag, Record, Report, Summary};
use super::state::State;

pub struct Loader {
    families: FamilySet,
    font_root: Option<PathBuf>,
    catalog: Option<Catalog>,
    loaded: Vec<Record>,
    cancel: CancelToken,
    registrar: Box<dyn FontRegistrar>,
    decoder: Box<dyn LegacyDecoder>,
    blacklist: Blacklist,
    config: LoaderConfig,
    state: State,
    subs_scanned: u32,
}

impl Loader {
    pub fn new(registrar: Box<dyn FontRegistrar>, decoder: Box<dyn LegacyDecoder>) -> Self {
        Loader {
            families: FamilySet::new(),
            font_root: None,
            catalog: None,
            loaded: Vec::new(),
            cancel: CancelToken::new(),
            registrar,
            decoder,
            blacklist: Blacklist::empty(),
            config: LoaderConfig::default(),
            state: State::LoadSub,
            subs_scanned: 0,
        }
    }

    pub fn with_blacklist(mut self, blacklist: Blacklist) -> Self {
        self.blacklist = blacklist;
        self
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Scan one subtitle file, or walk one directory of subtitle files,
    /// inserting every referenced family name into the family-name set.
    pub fn add_subs(&mut self, path: &Path) -> Result<()> {
        self.state = State::LoadSub;
        info!(path = %path.display(), state = self.state.name(), "entering pipeline stage");
        for file in discovery::walk_subtitles(path, &self.config.subtitles) {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let handle = fs::File::open(&file)?;
            let mapping = unsafe { Mmap::map(&handle)? };
            let text = encoding::decode(&mapping, self.decoder.as_ref());
            let families = &mut self.families;
            crate::subtitle::scan(&text, |name| {
                if let Err(e) = families.insert(name) {
                    warn!(file = %file.display(), error = %e, "failed to record family name");
                }
            });
            self.subs_scanned += 1;
            debug!(file = %file.display(), "scanned subtitle file");
        }
        Ok(())
    }

    /// Build or load the font catalog rooted at `root`. If `cache` names
    /// an existing, valid cache file under `root`, it is adopted
    /// read-only; any failure degrades silently to a full directory walk.
    pub fn scan_fonts(&mut self, root: &Path, cache: Option<&str>) -> Result<()> {
        self.state = State::LoadCache;
        info!(root = %root.display(), state = self.state.name(), "entering pipeline stage");
        self.font_root = Some(root.to_path_buf());

        if let Some(name) = cache {
            let cache_path = root.join(name);
            match Catalog::load(&cache_path) {
                Ok(catalog) => {
                    info!(path = %cache_path.display(), "loaded font cache");
                    self.catalog = Some(catalog);
                    return Ok(());
                }
                Err(e) => {
                    warn!(path = %cache_path.display(), error = %e, "cache load failed, falling back to a full scan");
                }
            }
        }

        self.state = State::ScanFont;
        info!(root = %root.display(), state = self.state.name(), "entering pipeline stage");
        let mut catalog = Catalog::new();
        for tag in discovery::walk_fonts(root, &self.config.fonts) {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let path = root.join(&tag);
            let tag_str = tag.to_string_lossy().replace('\\', "/");
            let bytes = match fs::read(&path) {
                Ok(b) => b,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read font file");
                    continue;
                }
            };
            if let Err(e) = catalog.add_font(&tag_str, &bytes) {
                if matches!(e, Error::OutOfMemory) {
                    return Err(e);
                }
                warn!(path = %path.display(), error = %e, "font file omitted from catalog");
            }
        }
        catalog.build_index()?;
        self.catalog = Some(catalog);
        Ok(())
    }

    /// Write the current catalog to `<font_root>/<name>`.
    pub fn save_cache(&self, name: &str) -> Result<()> {
        let root = self.font_root.as_ref().ok_or_else(|| Error::Os("no font root set".into()))?;
        let catalog = self.catalog.as_ref().ok_or_else(|| Error::Os("no catalog to dump".into()))?;
        catalog.dump(&root.join(name))
    }

    /// Match every family against the catalog and register the winners.
    pub fn load_fonts(&mut self) -> Result<Report> {
        self.state = State::LoadFont;
        info!(state = self.state.name(), "entering pipeline stage");
        let root = self.font_root.clone().unwrap_or_default();
        let max_loads_per_family = self.config.matching.max_candidates_per_family as usize;
        if self.catalog.is_none() {
            return Ok(Report::default());
        }

        let family_names: Vec<String> = self.families.iter().collect();
        let mut records = Vec::new();

        for family in &family_names {
            if self.cancel.is_cancelled() {
                self.loaded.append(&mut records);
                self.unload_fonts();
                self.state = State::Cancelled;
                info!(state = self.state.name(), "pipeline cancelled");
                return Err(Error::Cancelled);
            }

            if self.registrar.is_family_installed(family) {
                records.push(Record { flag: Flag::OsLoaded, face: family.clone(), file: None, sha256: None });
                continue;
            }

            if self.blacklist.contains(family) {
                records.push(Record { flag: Flag::LoadMiss, face: family.clone(), file: None, sha256: None });
                continue;
            }

            let mut loaded_for_family = 0usize;
            let mut saw_candidate = false;

            let candidates: Vec<_> = self.catalog.as_ref().unwrap().iter(family).map(|c| c.tag).collect();
            for tag in candidates {
                if self.cancel.is_cancelled() {
                    self.loaded.append(&mut records);
                    self.unload_fonts();
                    self.state = State::Cancelled;
                    info!(state = self.state.name(), "pipeline cancelled");
                    return Err(Error::Cancelled);
                }
                if loaded_for_family >= max_loads_per_family {
                    break;
                }
                saw_candidate = true;
                match self.load_file(&root, family, &tag, &records) {
                    Outcome::Ok(record) => {
                        loaded_for_family += 1;
                        records.push(record);
                    }
                    Outcome::Dup(file) => {
                        records.push(Record { flag: Flag::LoadDup, face: family.clone(), file: Some(file), sha256: None });
                    }
                    Outcome::Err(record) => records.push(record),
                }
            }

            if !saw_candidate {
                records.push(Record { flag: Flag::LoadMiss, face: family.clone(), file: None, sha256: None });
            }
        }

        super::report::sort_for_display(&mut records);
        self.loaded = records.clone();

        let stat = self.catalog.as_ref().unwrap().stat();
        let summary = Summary {
            loaded: records.iter().filter(|r| matches!(r.flag, Flag::LoadOk | Flag::OsLoaded)).count() as u32,
            failed: records.iter().filter(|r| r.flag == Flag::LoadErr).count() as u32,
            unmatched: records.iter().filter(|r| r.flag == Flag::LoadMiss).count() as u32,
            files: stat.num_file,
            faces: stat.num_face,
            subs: self.subs_scanned,
        };

        self.state = State::Done;
        info!(state = self.state.name(), loaded = summary.loaded, failed = summary.failed, unmatched = summary.unmatched, "pipeline finished");
        Ok(Report { records, summary })
    }

    /// The heart of the matching logic: path-identity dedup, then
    /// content-hash dedup, then the external registration call.
    fn load_file(&mut self, root: &Path, face: &str, file_tag: &str, existing: &[Record]) -> Outcome {
        if let Some(dup) = existing.iter().find(|r| r.file.as_deref() == Some(file_tag)) {
            return Outcome::Dup(dup.file.clone().unwrap_or_default());
        }

        let path = root.join(file_tag);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read candidate font file");
                return Outcome::Err(Record {
                    flag: Flag::LoadErr,
                    face: face.to_string(),
                    file: Some(file_tag.to_string()),
                    sha256: None,
                });
            }
        };

        let digest = hash::hash(&bytes);
        if let Some(dup) = existing.iter().find(|r| r.flag == Flag::LoadOk && r.sha256 == Some(digest)) {
            return Outcome::Dup(dup.file.clone().unwrap_or_default());
        }

        match self.registrar.install(&path) {
            Ok(()) => {
                info!(path = %path.display(), face, "registered font");
                Outcome::Ok(Record {
                    flag: Flag::LoadOk,
                    face: face.to_string(),
                    file: Some(file_tag.to_string()),
                    sha256: Some(digest),
                })
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "font registration failed");
                Outcome::Err(Record {
                    flag: Flag::LoadErr,
                    face: face.to_string(),
                    file: Some(file_tag.to_string()),
                    sha256: Some(digest),
                })
            }
        }
    }

    /// Start the background cache-warmer over every currently `LOAD_OK`
    /// file, re-touching the set every `interval`. Only meaningful once
    /// `load_fonts` has completed (`DONE`); the returned handle detaches
    /// when the caller drops it, but `cancel()` will still stop it.
    pub fn spawn_cache_warmer(&self, interval: std::time::Duration) -> std::thread::JoinHandle<()> {
        let root = self.font_root.clone().unwrap_or_default();
        let paths: Vec<PathBuf> = self
            .loaded
            .iter()
            .filter(|r| r.flag == Flag::LoadOk)
            .filter_map(|r| r.file.as_ref())
            .map(|tag| root.join(tag))
            .collect();
        super::warmer::spawn(paths, interval, self.cancel.clone())
    }

    /// Unregister everything currently registered and clear the
    /// loaded-font vector.
    pub fn unload_fonts(&mut self) {
        self.state = State::UnloadFont;
        info!(state = self.state.name(), count = self.loaded.len(), "entering pipeline stage");
        let root = self.font_root.clone().unwrap_or_default();
        for record in &self.loaded {
            if record.flag == Flag::LoadDup {
                continue;
            }
            if let Some(tag) = &record.file {
                let path = root.join(tag);
                if let Err(e) = self.registrar.uninstall(&path) {
                    warn!(path = %path.display(), error = %e, "font unregistration failed");
                }
            }
        }
        self.loaded.clear();
    }
}

enum Outcome {
    Ok(Record),
    Dup(String),
    Err(Record),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::test_doubles::RecordingRegistrar;
    use crate::registrar::Latin1Decoder;
    use std::fs;

    fn utf16be(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
    }

    fn build_otf(face: &str) -> Vec<u8> {
        let encoded = utf16be(face);
        let mut name_table = Vec::new();
        name_table.extend_from_slice(&0u16.to_be_bytes());
        name_table.extend_from_slice(&1u16.to_be_bytes());
        name_table.extend_from_slice(&18u16.to_be_bytes());
        name_table.extend_from_slice(&3u16.to_be_bytes());
        name_table.extend_from_slice(&0u16.to_be_bytes());
        name_table.extend_from_slice(&0x0409u16.to_be_bytes());
        name_table.extend_from_slice(&1u16.to_be_bytes());
        name_table.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        name_table.extend_from_slice(&0u16.to_be_bytes());
        name_table.extend_from_slice(&encoded);

        let mut font = Vec::new();
        font.extend_from_slice(b"OTTO");
        font.extend_from_slice(&1u16.to_be_bytes());
        font.extend_from_slice(&0u16.to_be_bytes());
        font.extend_from_slice(&0u16.to_be_bytes());
        font.extend_from_slice(&0u16.to_be_bytes());
        let table_offset = 12 + 16;
        font.extend_from_slice(b"name");
        font.extend_from_slice(&0u32.to_be_bytes());
        font.extend_from_slice(&(table_offset as u32).to_be_bytes());
        font.extend_from_slice(&(name_table.len() as u32).to_be_bytes());
        font.extend_from_slice(&name_table);
        font
    }

    #[test]
    fn load_fonts_matches_family_and_registers_it() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.otf"), build_otf("MyFont")).unwrap();

        let mut loader = Loader::new(Box::new(RecordingRegistrar::default()), Box::new(Latin1Decoder));
        loader.families.insert("MyFont").unwrap();
        loader.scan_fonts(dir.path(), None).unwrap();
        let report = loader.load_fonts().unwrap();

        assert_eq!(report.summary.loaded, 1);
        assert_eq!(report.records[0].flag, Flag::LoadOk);
    }

    #[test]
    fn unmatched_family_is_reported_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = Loader::new(Box::new(RecordingRegistrar::default()), Box::new(Latin1Decoder));
        loader.families.insert("Nonexistent").unwrap();
        loader.scan_fonts(dir.path(), None).unwrap();
        let report = loader.load_fonts().unwrap();

        assert_eq!(report.records[0].flag, Flag::LoadMiss);
        assert_eq!(report.summary.unmatched, 1);
    }

    #[test]
    fn already_installed_family_skips_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let mut registrar = RecordingRegistrar::default();
        registrar.preinstalled_families.insert("Arial".to_string());

        let mut loader = Loader::new(Box::new(registrar), Box::new(Latin1Decoder));
        loader.families.insert("Arial").unwrap();
        loader.scan_fonts(dir.path(), None).unwrap();
        let report = loader.load_fonts().unwrap();

        assert_eq!(report.records[0].flag, Flag::OsLoaded);
        assert!(report.records[0].file.is_none());
    }

    #[test]
    fn duplicate_bytes_across_two_files_register_once() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = build_otf("Dup");
        fs::write(dir.path().join("a.otf"), &bytes).unwrap();
        fs::write(dir.path().join("b.otf"), &bytes).unwrap();

        let mut loader = Loader::new(Box::new(RecordingRegistrar::default()), Box::new(Latin1Decoder));
        loader.families.insert("Dup").unwrap();
        loader.scan_fonts(dir.path(), None).unwrap();
        let report = loader.load_fonts().unwrap();

        let ok_count = report.records.iter().filter(|r| r.flag == Flag::LoadOk).count();
        let dup_count = report.records.iter().filter(|r| r.flag == Flag::LoadDup).count();
        assert_eq!(ok_count, 1);
        assert_eq!(dup_count, 1);
    }

    #[test]
    fn unload_calls_uninstall_for_every_load_ok() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.otf"), build_otf("MyFont")).unwrap();

        let registrar = Box::new(RecordingRegistrar::default());
        let mut loader = Loader::new(registrar, Box::new(Latin1Decoder));
        loader.families.insert("MyFont").unwrap();
        loader.scan_fonts(dir.path(), None).unwrap();
        loader.load_fonts().unwrap();
        loader.unload_fonts();
        assert!(loader.loaded.is_empty());
    }

    #[test]
    fn blacklisted_family_is_treated_as_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.otf"), build_otf("Wingdings")).unwrap();

        let mut loader = Loader::new(Box::new(RecordingRegistrar::default()), Box::new(Latin1Decoder))
            .with_blacklist(Blacklist::parse("Wingdings"));
        loader.families.insert("Wingdings").unwrap();
        loader.scan_fonts(dir.path(), None).unwrap();
        let report = loader.load_fonts().unwrap();

        assert_eq!(report.records[0].flag, Flag::LoadMiss);
    }

    #[test]
    fn cancel_before_load_fonts_unwinds_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.otf"), build_otf("MyFont")).unwrap();

        let mut loader = Loader::new(Box::new(RecordingRegistrar::default()), Box::new(Latin1Decoder));
        loader.families.insert("MyFont").unwrap();
        loader.scan_fonts(dir.path(), None).unwrap();
        loader.cancel();
        let err = loader.load_fonts().unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
