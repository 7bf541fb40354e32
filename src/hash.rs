//! Content hashing for font dedup (component F)

use sha2::{Digest, Sha256};

/// SHA-256 of a whole in-memory buffer. Files are memory-mapped in full
/// before hashing; there's no streaming contract to honor.
pub fn hash(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_hash_identically() {
        assert_eq!(hash(b"hello"), hash(b"hello"));
    }

    #[test]
    fn different_bytes_hash_differently() {
        assert_ne!(hash(b"hello"), hash(b"world"));
    }

    #[test]
    fn empty_input_has_the_well_known_sha256_digest() {
        let digest = hash(b"");
        assert_eq!(
            digest,
            [
                0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f,
                0xb9, 0x24, 0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b,
                0x78, 0x52, 0xb8, 0x55,
            ]
        );
    }
}
