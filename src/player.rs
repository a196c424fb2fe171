//! Player module: the single source of truth for what is playing.
//!
//! `Player` is a plain value owned by the runtime and passed by `&mut` to the
//! transport and the input handlers. It never talks to audio itself; the
//! `transport` module reconciles it with the active engine.

mod state;

pub use state::*;
