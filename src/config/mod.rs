//! `subfont.toml` configuration schema (ambient to the core pipeline).

mod schema;

pub use schema::{CacheWarmerSection, FontsSection, LoaderConfig, MatchingSection, SubtitlesSection};
