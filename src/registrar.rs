//! External OS collaborators (out of scope for the core per the module
//! boundary, specified only by the interfaces the loader consumes).
//!
//! Production code wires these to real OS font-registration APIs
//! (`AddFontResourceW`/`RemoveFontResourceW` and friends on Windows,
//! fontconfig elsewhere); tests and the library's default wiring use the
//! null/double implementations below.

use crate::error::Result;
use std::path::Path;

/// Installs and removes fonts from the running session, and answers
/// whether a family is already available system-wide (so the loader's
/// pass 1 can skip it).
pub trait FontRegistrar: Send {
    fn install(&mut self, path: &Path) -> Result<()>;
    fn uninstall(&mut self, path: &Path) -> Result<()>;
    fn is_family_installed(&self, family: &str) -> bool;
}

/// Decodes a byte buffer with no BOM and no valid UTF-8 structure using
/// the OS's default 8-bit code page, as a last-resort fallback for legacy
/// subtitle files.
pub trait LegacyDecoder: Send {
    fn decode(&self, bytes: &[u8]) -> String;
}

/// A registrar that always succeeds and reports nothing pre-installed.
/// Suitable for dry runs, tests, and platforms with no font-registration
/// API wired up yet.
#[derive(Default)]
pub struct NullRegistrar;

impl FontRegistrar for NullRegistrar {
    fn install(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn uninstall(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn is_family_installed(&self, _family: &str) -> bool {
        false
    }
}

/// Decodes via the Windows-1252 fallback table in [`crate::encoding`],
/// treating every undecodable byte as `U+FFFD` (not a real OS code-page
/// call, but a reasonable stand-in on platforms without one wired up).
#[derive(Default)]
pub struct Latin1Decoder;

impl LegacyDecoder for Latin1Decoder {
    fn decode(&self, bytes: &[u8]) -> String {
        crate::encoding::decode_windows_1252(bytes)
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod test_doubles {
    use super::*;
    use crate::error::Error;
    use std::collections::HashSet;
    use std::path::PathBuf;

    /// Records every install/uninstall call; optionally fails installs for
    /// specific paths, to exercise `LOAD_ERR` handling.
    #[derive(Default)]
    pub struct RecordingRegistrar {
        pub installed: Vec<PathBuf>,
        pub uninstalled: Vec<PathBuf>,
        pub preinstalled_families: HashSet<String>,
        pub fail_paths: HashSet<PathBuf>,
    }

    impl FontRegistrar for RecordingRegistrar {
        fn install(&mut self, path: &Path) -> Result<()> {
            if self.fail_paths.contains(path) {
                return Err(Error::Os(format!("simulated install failure for {}", path.display())));
            }
            self.installed.push(path.to_path_buf());
            Ok(())
        }

        fn uninstall(&mut self, path: &Path) -> Result<()> {
            self.uninstalled.push(path.to_path_buf());
            Ok(())
        }

        fn is_family_installed(&self, family: &str) -> bool {
            self.preinstalled_families.iter().any(|f| f.eq_ignore_ascii_case(family))
        }
    }
}
