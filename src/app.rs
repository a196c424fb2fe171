//! Application module: exposes the browser model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the catalog, the current
//! view, selection and search filter.

mod model;

pub use model::*;
