//! subfont - just-in-time font provisioning for subtitle playback
//!
//! Given a set of SSA/ASS subtitle scripts and a directory tree of font
//! files, determines which font family names the scripts reference,
//! locates matching font files on disk, and drives an external
//! registration collaborator for the lifetime of a viewing session.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use subfont::loader::Loader;
//! use subfont::registrar::{NullRegistrar, Latin1Decoder};
//! use std::path::Path;
//!
//! let mut loader = Loader::new(Box::new(NullRegistrar), Box::new(Latin1Decoder));
//! loader.add_subs(Path::new("subs/movie.ass")).unwrap();
//! loader.scan_fonts(Path::new("fonts"), Some("fonts.cache")).unwrap();
//! let report = loader.load_fonts().unwrap();
//! println!("{} families loaded", report.summary.loaded);
//! loader.unload_fonts();
//! ```

pub mod arena;
pub mod blacklist;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod encoding;
pub mod error;
pub mod family;
pub mod font;
pub mod hash;
pub mod loader;
pub mod registrar;
pub mod subtitle;

#[cfg(feature = "cli")]
pub mod telemetry;

pub use error::{Error, Result};
pub use family::FamilySet;
pub use loader::{CancelToken, Loader, Report};
