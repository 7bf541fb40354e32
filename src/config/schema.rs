//! Configuration schema for `subfont.toml`.
//!
//! Every section has a default, so an absent config file is equivalent to
//! `LoaderConfig::default()`; only deployments that need to shrink the
//! 64 MiB subtitle cap, change the per-family candidate limit, or rename
//! the cache-warmer interval need to carry a config file at all.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration loaded from `subfont.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub subtitles: SubtitlesSection,
    pub fonts: FontsSection,
    pub matching: MatchingSection,
    pub cache_warmer: CacheWarmerSection,
}

/// Subtitle discovery tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubtitlesSection {
    /// Case-insensitive extensions considered subtitle files.
    pub extensions: Vec<String>,
    /// Files larger than this are skipped during the directory walk.
    pub max_file_size: u64,
}

impl Default for SubtitlesSection {
    fn default() -> Self {
        Self {
            extensions: vec!["ass".to_string(), "ssa".to_string()],
            max_file_size: 64 * 1024 * 1024,
        }
    }
}

/// Font discovery tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FontsSection {
    /// Case-insensitive extensions considered font files.
    pub extensions: Vec<String>,
    /// Default cache file name looked for under the font root.
    pub cache_file: String,
}

impl Default for FontsSection {
    fn default() -> Self {
        Self {
            extensions: vec!["ttf".to_string(), "otf".to_string(), "ttc".to_string()],
            cache_file: "fonts.cache".to_string(),
        }
    }
}

/// Matching-pass tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingSection {
    /// Stop pass 2 after this many successful loads for one family.
    pub max_candidates_per_family: u32,
    /// Optional path to a family-name blacklist file.
    pub blacklist_file: Option<PathBuf>,
}

impl Default for MatchingSection {
    fn default() -> Self {
        Self { max_candidates_per_family: 16, blacklist_file: None }
    }
}

/// Background cache-warmer tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheWarmerSection {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for CacheWarmerSection {
    fn default() -> Self {
        Self { enabled: false, interval_secs: 5 * 60 }
    }
}

impl LoaderConfig {
    /// Load config from a TOML file. A missing file is not an error here;
    /// callers that want "absent file means defaults" should check
    /// existence themselves, mirroring how `Blacklist::load` treats a
    /// missing file as non-fatal.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(toml_content: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(toml_content)?)
    }
}
