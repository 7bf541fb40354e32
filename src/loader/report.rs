//! Per-family outcome records and the final session summary.

use std::fmt;
use std::path::Path;

/// Outcome of matching and registering one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Already available system-wide; nothing to load.
    OsLoaded,
    /// Successfully registered from the catalog.
    LoadOk,
    /// A catalog candidate existed but registration failed.
    LoadErr,
    /// No catalog candidate existed (or the family was blacklisted).
    LoadMiss,
    /// Every catalog candidate for this family was already loaded
    /// (path-identity or content-hash duplicate).
    LoadDup,
}

impl Flag {
    /// Single-character-ish tag used in the human-readable log, per the
    /// `[ok]`/`[ X]`/`[??]`/`[^ ]` convention.
    pub fn tag(self) -> &'static str {
        match self {
            Flag::OsLoaded | Flag::LoadOk => "[ok]",
            Flag::LoadErr => "[ X]",
            Flag::LoadMiss => "[??]",
            Flag::LoadDup => "[^ ]",
        }
    }
}

/// One outcome for one family.
#[derive(Debug, Clone)]
pub struct Record {
    pub flag: Flag,
    pub face: String,
    pub file: Option<String>,
    pub sha256: Option<[u8; 32]>,
}

/// Final session totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct Summary {
    pub loaded: u32,
    pub failed: u32,
    pub unmatched: u32,
    pub files: u32,
    pub faces: u32,
    pub subs: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub records: Vec<Record>,
    pub summary: Summary,
}

impl Report {
    /// Render the per-family outcome lines, already sorted by
    /// [`sort_for_display`], in the `[tag] face  file` form the CLI prints.
    pub fn render_log(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&format!(
                "{} {:<24} {}\n",
                record.flag.tag(),
                record.face,
                record.file.as_deref().unwrap_or("")
            ));
        }
        out.push_str(&format!(
            "\nloaded={} failed={} unmatched={} files={} faces={} subs={}\n",
            self.summary.loaded,
            self.summary.failed,
            self.summary.unmatched,
            self.summary.files,
            self.summary.faces,
            self.summary.subs
        ));
        out
    }

    /// Write [`render_log`](Report::render_log)'s output to `path`.
    pub fn write_to(&self, path: &Path) -> crate::error::Result<()> {
        std::fs::write(path, self.render_log()).map_err(crate::error::Error::Io)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_log())
    }
}

/// Sort records for display: `LOAD_ERR`/`LOAD_MISS` first, then by
/// filename ascending case-insensitively, `LOAD_DUP` last within that,
/// then by face ascending case-insensitively.
pub fn sort_for_display(records: &mut [Record]) {
    records.sort_by(|a, b| {
        let rank = |f: Flag| matches!(f, Flag::LoadErr | Flag::LoadMiss) as u8;
        rank(b.flag)
            .cmp(&rank(a.flag))
            .then_with(|| {
                let fa = a.file.as_deref().unwrap_or("").to_ascii_lowercase();
                let fb = b.file.as_deref().unwrap_or("").to_ascii_lowercase();
                fa.cmp(&fb)
            })
            .then_with(|| (a.flag == Flag::LoadDup).cmp(&(b.flag == Flag::LoadDup)))
            .then_with(|| a.face.to_ascii_lowercase().cmp(&b.face.to_ascii_lowercase()))
    });
}
