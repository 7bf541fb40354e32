//! The deduplicated, ordered family-name set referenced by a subtitle
//! corpus, backed by the string [`Arena`].

use crate::arena::{Arena, Offset};
use crate::error::Result;

/// Ordered, case-insensitively deduplicated, case-preserving set of family
/// names. Created once per session, appended to while subtitles are
/// scanned, iterated during load/unload, destroyed at shutdown.
pub struct FamilySet {
    arena: Arena,
    offsets: Vec<Offset>,
}

impl FamilySet {
    pub fn new() -> Self {
        FamilySet {
            arena: Arena::new(0),
            offsets: Vec::new(),
        }
    }

    /// Insert `name`, stripping any leading `@` first. Returns `true` if
    /// this was a new, distinct (case-insensitively) entry. A name that is
    /// empty after stripping is silently discarded.
    pub fn insert(&mut self, name: &str) -> Result<bool> {
        let name = name.strip_prefix('@').unwrap_or(name);
        if name.is_empty() {
            return Ok(false);
        }
        let pos = self.arena.tell();
        self.arena.push(name)?;
        if let Some(existing) = self.arena.lookup(0, name) {
            if existing != pos {
                self.arena.seek(pos);
                return Ok(false);
            }
        }
        self.offsets.push(pos);
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Iterate family names in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        self.offsets.iter().map(move |&off| self.arena.get(off))
    }
}

impl Default for FamilySet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_deduplicates_case_insensitively() {
        let mut set = FamilySet::new();
        assert!(set.insert("Arial").unwrap());
        assert!(!set.insert("ARIAL").unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insert_preserves_first_seen_case() {
        let mut set = FamilySet::new();
        set.insert("Comic Sans").unwrap();
        set.insert("COMIC SANS").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Comic Sans".to_string()]);
    }

    #[test]
    fn leading_at_collides_with_unprefixed() {
        let mut set = FamilySet::new();
        set.insert("Sans").unwrap();
        assert!(!set.insert("@Sans").unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_after_strip_is_discarded() {
        let mut set = FamilySet::new();
        assert!(!set.insert("@").unwrap());
        assert!(set.is_empty());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut set = FamilySet::new();
        set.insert("B").unwrap();
        set.insert("A").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["B".to_string(), "A".to_string()]);
    }
}
