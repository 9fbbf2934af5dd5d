//! Diff model and primitives (no TUI dependencies).

mod ai;
mod config;
mod fuzzy;
mod git;
mod inline;
mod pairing;
mod parse;

pub use ai::*;
pub use config::*;
pub use fuzzy::*;
pub use git::*;
pub use inline::*;
pub use pairing::*;
pub use parse::*;
