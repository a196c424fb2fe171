//! Catalog module: the read-only music library the player draws tracks from.
//!
//! A `Catalog` is built once at startup, either from a TOML manifest
//! (`catalog::manifest`) or by scanning a directory of audio files
//! (`catalog::scan`), and is only ever read afterwards.

mod manifest;
mod model;
mod scan;

pub use manifest::load_manifest;
pub use model::*;
pub use scan::scan;
