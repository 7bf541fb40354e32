//! Loader orchestrator (component E): ties the family-name set, the font
//! catalog, cancellation, and per-family outcome reporting into the
//! scan-subs → scan/load-cache → load-fonts → unload pipeline.

pub mod cancel;
pub mod pipeline;
pub mod report;
pub mod state;
pub mod warmer;

pub use cancel::CancelToken;
pub use pipeline::Loader;
pub use report::{Flag, Record, Report, Summary};
pub use state::State;
