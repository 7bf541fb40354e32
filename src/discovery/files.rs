//! Directory walking for subtitle and font roots.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::{FontsSection, SubtitlesSection};

fn has_extension(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| exts.iter().any(|want| e.eq_ignore_ascii_case(want)))
}

/// Resolve `path` to a flat list of subtitle files: itself if it's already
/// a file, or every matching subtitle file (case-insensitive extension, no
/// larger than `config.max_file_size`) found by walking it if it's a
/// directory.
pub fn walk_subtitles(path: &Path, config: &SubtitlesSection) -> Vec<PathBuf> {
    if path.is_file() {
        return if has_extension(path, &config.extensions) { vec![path.to_path_buf()] } else { Vec::new() };
    }
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(e.path(), &config.extensions))
        .filter(|e| e.metadata().map(|m| m.len() <= config.max_file_size).unwrap_or(false))
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Walk `root` for regular font files matching `config.extensions`
/// (case-insensitive), returning each as a path relative to `root` — the
/// catalog's `tag` for that entry.
pub fn walk_fonts(root: &Path, config: &FontsSection) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(e.path(), &config.extensions))
        .filter_map(|e| e.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect()
}
