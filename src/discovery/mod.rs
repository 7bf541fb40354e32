//! Directory-walk helpers for subtitle and font roots (ambient to
//! components B and D, which only consume flat byte buffers).

mod files;

pub use files::{walk_fonts, walk_subtitles};
