//! Family-name blacklist (component G)
//!
//! A small text file, one family name per line, consulted by the loader
//! right after the family-name strip-and-normalize step: a blacklisted
//! family is treated as though it weren't in the catalog at all.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

pub struct Blacklist {
    names: Vec<String>,
}

impl Blacklist {
    pub fn empty() -> Self {
        Blacklist { names: Vec::new() }
    }

    /// Parse one family name per line; lines are `\r`- or `\n`-terminated,
    /// empty lines are ignored, there are no comments or escapes. A
    /// missing file is non-fatal and yields an empty blacklist.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::empty()),
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let names = text
            .split(['\r', '\n'])
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Blacklist { names }
    }

    /// Case-insensitive membership check. Callers strip a leading `@`
    /// before calling, matching the family-name normalization elsewhere.
    pub fn contains(&self, family: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(family))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_name_per_line_and_ignores_empty_lines() {
        let bl = Blacklist::parse("Comic Sans\n\nWingdings\r\n");
        assert!(bl.contains("comic sans"));
        assert!(bl.contains("WINGDINGS"));
        assert_eq!(bl.names.len(), 2);
    }

    #[test]
    fn empty_text_yields_empty_blacklist() {
        assert!(Blacklist::parse("").is_empty());
    }

    #[test]
    fn missing_file_is_non_fatal() {
        let bl = Blacklist::load(Path::new("/nonexistent/path/blacklist.txt")).unwrap();
        assert!(bl.is_empty());
    }

    #[test]
    fn non_member_is_not_contained() {
        let bl = Blacklist::parse("Arial");
        assert!(!bl.contains("Verdana"));
    }
}
