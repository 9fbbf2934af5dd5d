//! Common re-exports for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use critica::prelude::*;
//!
//! let files = parse_diff("").unwrap();
//! assert!(files.is_empty());
//! ```

pub use crate::core::{
    compute_pairs, diff_for_mode, parse_diff, segment, Config, DiffMode, DiffStyle, FileDiff,
    GitError, Hunk, InlineSegment, Line, LineKind, ParseError,
};
pub use crate::theme::Theme;
pub use crate::ui::{print_diff, PrintOptions, ViewLayout};
